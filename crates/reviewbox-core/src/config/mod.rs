//! Operator configuration.
//!
//! A single JSON document holding the relay endpoint, sweep tuning, the admin
//! secret, and the display date format. The CLI decides where the file lives.

use std::path::Path;
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::session::AdminGate;
use crate::store::DEFAULT_DATE_FORMAT;
use crate::sync::{HttpRelay, RelayEndpoint, DEFAULT_SWEEP_INTERVAL_SECS};
use crate::util::normalize_text_option;

const CONFIG_VERSION: u32 = 1;
const DEFAULT_MAX_RELAY_ATTEMPTS: u32 = 5;
const DEFAULT_RELAY_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub relay: Option<RelayEndpoint>,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// `0` keeps retrying forever
    #[serde(default = "default_max_relay_attempts")]
    pub max_relay_attempts: u32,
    #[serde(default = "default_relay_timeout_secs")]
    pub relay_timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_secret: Option<String>,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

const fn default_config_version() -> u32 {
    CONFIG_VERSION
}

const fn default_sweep_interval_secs() -> u64 {
    DEFAULT_SWEEP_INTERVAL_SECS
}

const fn default_max_relay_attempts() -> u32 {
    DEFAULT_MAX_RELAY_ATTEMPTS
}

const fn default_relay_timeout_secs() -> u64 {
    DEFAULT_RELAY_TIMEOUT_SECS
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            relay: None,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            max_relay_attempts: DEFAULT_MAX_RELAY_ATTEMPTS,
            relay_timeout_secs: DEFAULT_RELAY_TIMEOUT_SECS,
            admin_secret: None,
            date_format: default_date_format(),
        }
    }
}

impl AppConfig {
    /// Load and validate the config at `path`. A missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let config = serde_json::from_str::<Self>(&raw).map_err(|error| {
            Error::InvalidConfig(format!(
                "failed to parse config at {}: {error}",
                path.display()
            ))
        })?;
        config.normalized()
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let normalized = self.clone().normalized()?;
        let serialized = serde_json::to_string_pretty(&normalized)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Replace the admin secret when an override is present and non-empty.
    #[must_use]
    pub fn with_admin_secret_override(mut self, secret: Option<String>) -> Self {
        if let Some(secret) = normalize_text_option(secret) {
            self.admin_secret = Some(secret);
        }
        self
    }

    /// Trim text values and reject settings the runtime cannot honor.
    pub fn normalized(mut self) -> Result<Self> {
        if self.version != CONFIG_VERSION {
            return Err(Error::InvalidConfig(format!(
                "unsupported config version {} (expected {CONFIG_VERSION})",
                self.version
            )));
        }
        if self.sweep_interval_secs == 0 {
            return Err(Error::InvalidConfig(
                "sweep_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.relay_timeout_secs == 0 {
            return Err(Error::InvalidConfig(
                "relay_timeout_secs must be greater than zero".to_string(),
            ));
        }

        self.relay = self.relay.map(RelayEndpoint::normalized).transpose()?;
        self.admin_secret = normalize_text_option(self.admin_secret);
        self.date_format = normalize_text_option(Some(self.date_format))
            .unwrap_or_else(default_date_format);
        if !is_valid_date_format(&self.date_format) {
            return Err(Error::InvalidConfig(format!(
                "date_format {:?} is not a valid strftime pattern",
                self.date_format
            )));
        }
        Ok(self)
    }

    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    #[must_use]
    pub const fn relay_timeout(&self) -> Duration {
        Duration::from_secs(self.relay_timeout_secs)
    }

    /// Gate for admin mode, or `None` when no secret is configured.
    pub fn admin_gate(&self) -> Result<Option<AdminGate>> {
        self.admin_secret.clone().map(AdminGate::new).transpose()
    }

    /// HTTP relay for the configured endpoint, or `None` when relaying is off.
    pub fn http_relay(&self) -> Result<Option<HttpRelay>> {
        self.relay
            .clone()
            .map(|endpoint| HttpRelay::new(endpoint, self.relay_timeout()))
            .transpose()
    }
}

fn is_valid_date_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}
