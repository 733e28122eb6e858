//! Device session and the admin gate.
//!
//! A [`Session`] carries the two pieces of device-wide state the review store
//! needs to authorize mutations: the device token and the acting role. Both
//! are persisted in the key-value store and initialized on first run.
//!
//! # Not a security boundary
//!
//! Admin mode is unlocked by comparing a shared secret in plain text on the
//! device, and the unlocked state is a plain `"true"` string next to the data
//! it guards. Anyone with access to the device or its storage can read the
//! secret, flip the flag, or rewrite the reviews. This gates UI convenience
//! only and must not be used where real access control is required.

use std::fmt;

use crate::error::{Error, Result};
use crate::kv::{KeyValueStore, ADMIN_FLAG_KEY, DEVICE_TOKEN_KEY};
use crate::models::{DeviceToken, Role};
use crate::util::normalize_text_option;

const ADMIN_FLAG_VALUE: &str = "true";

/// Acting context passed to every store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    device_token: DeviceToken,
    role: Role,
}

impl Session {
    #[must_use]
    pub const fn new(device_token: DeviceToken, role: Role) -> Self {
        Self { device_token, role }
    }

    /// Read the device token and admin flag, generating and persisting a
    /// token on first run. An existing token is never replaced.
    pub fn load_or_init<S>(kv: &mut S, now_millis: i64) -> Result<Self>
    where
        S: KeyValueStore + ?Sized,
    {
        let device_token = match normalize_text_option(kv.get(DEVICE_TOKEN_KEY)?) {
            Some(token) => DeviceToken::from(token),
            None => {
                let token = DeviceToken::generate(now_millis);
                kv.set(DEVICE_TOKEN_KEY, token.as_str())?;
                tracing::info!("Generated device token {}", token);
                token
            }
        };

        let role = if kv.get(ADMIN_FLAG_KEY)?.as_deref() == Some(ADMIN_FLAG_VALUE) {
            Role::Privileged
        } else {
            Role::Standard
        };

        Ok(Self { device_token, role })
    }

    #[must_use]
    pub const fn device_token(&self) -> &DeviceToken {
        &self.device_token
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub const fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }
}

/// Plain-text shared-secret check that toggles admin mode.
#[derive(Clone)]
pub struct AdminGate {
    secret: String,
}

impl fmt::Debug for AdminGate {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AdminGate")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl AdminGate {
    pub fn new(secret: impl Into<String>) -> Result<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(Error::InvalidConfig(
                "admin secret must not be empty".to_string(),
            ));
        }
        Ok(Self { secret })
    }

    /// Enter admin mode when `presented` equals the shared secret.
    pub fn unlock<S>(&self, kv: &mut S, session: &mut Session, presented: &str) -> Result<()>
    where
        S: KeyValueStore + ?Sized,
    {
        if presented != self.secret {
            tracing::warn!("Rejected admin unlock attempt");
            return Err(Error::Unauthorized("Incorrect password".to_string()));
        }

        kv.set(ADMIN_FLAG_KEY, ADMIN_FLAG_VALUE)?;
        session.role = Role::Privileged;
        tracing::info!("Admin mode enabled");
        Ok(())
    }

    /// Leave admin mode. Always succeeds for a healthy backend.
    pub fn lock<S>(kv: &mut S, session: &mut Session) -> Result<()>
    where
        S: KeyValueStore + ?Sized,
    {
        kv.remove(ADMIN_FLAG_KEY)?;
        session.role = Role::Standard;
        tracing::info!("Admin mode disabled");
        Ok(())
    }
}
