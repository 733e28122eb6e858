//! Device identity and acting role

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque per-device label used to recognise a visitor's own reviews.
///
/// Anyone controlling the device controls the token, so it is an ownership
/// label for the delete button, not a credential.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceToken(String);

impl DeviceToken {
    /// Generate a fresh token of the form `user_<millis>_<9 random chars>`.
    #[must_use]
    pub fn generate(now_millis: i64) -> Self {
        let random = Uuid::now_v7().simple().to_string();
        let suffix = &random[random.len() - 9..];
        Self(format!("user_{now_millis}_{suffix}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for DeviceToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DeviceToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for DeviceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who is acting on the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Ordinary visitor: may create reviews and delete their own
    #[default]
    Standard,
    /// Admin mode unlocked with the shared secret: may edit, delete, and clear anything
    Privileged,
}

impl Role {
    #[must_use]
    pub const fn is_privileged(self) -> bool {
        matches!(self, Self::Privileged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_token_shape() {
        let token = DeviceToken::generate(1_700_000_000_000);
        let parts = token.as_str().splitn(3, '_').collect::<Vec<_>>();
        assert_eq!(parts[0], "user");
        assert_eq!(parts[1], "1700000000000");
        assert_eq!(parts[2].len(), 9);
    }

    #[test]
    fn test_generated_tokens_differ() {
        assert_ne!(DeviceToken::generate(1), DeviceToken::generate(1));
    }

    #[test]
    fn test_role_default_is_standard() {
        assert_eq!(Role::default(), Role::Standard);
        assert!(Role::Privileged.is_privileged());
    }
}
