//! Configuration management.
//!
//! The config file is JSON:
//!
//! ```json
//! {
//!   "username": "cat@example.com",
//!   "password": "hunter2",
//!   "max_gps_accuracy": 100000,
//!   "scan_interval": 120,
//!   "timeout": 10
//! }
//! ```
//!
//! Every field except `username` has a default. `PAWTRACK_USERNAME` and
//! `PAWTRACK_PASSWORD` override the file, and the password may also live
//! in the system keychain.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::keychain;
use crate::persistence::{default_config_path, load_json, save_json};

/// Environment variable overriding `username`.
pub const ENV_USERNAME: &str = "PAWTRACK_USERNAME";

/// Environment variable overriding `password`.
pub const ENV_PASSWORD: &str = "PAWTRACK_PASSWORD";

fn default_max_gps_accuracy() -> f64 {
    100_000.0
}

fn default_scan_interval() -> u64 {
    120
}

fn default_timeout() -> u64 {
    10
}

// ============================================================================
// Config
// ============================================================================

/// Application configuration.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Account e-mail.
    #[serde(default)]
    pub username: String,
    /// Account password; prefer the keychain or the environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Points less accurate than this (meters) are not published.
    #[serde(
        default = "default_max_gps_accuracy",
        deserialize_with = "deserialize_accuracy"
    )]
    pub max_gps_accuracy: f64,
    /// Seconds between update cycles.
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// API base URL override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: None,
            max_gps_accuracy: default_max_gps_accuracy(),
            scan_interval: default_scan_interval(),
            timeout: default_timeout(),
            api_base: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("max_gps_accuracy", &self.max_gps_accuracy)
            .field("scan_interval", &self.scan_interval)
            .field("timeout", &self.timeout)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl Config {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        default_config_path()
    }

    /// Loads configuration from a specific path, using defaults if the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let config: Config = load_json(path).await?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Saves configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        save_json(path, self).await?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Applies `PAWTRACK_USERNAME` / `PAWTRACK_PASSWORD` from the process
    /// environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(username) = lookup(ENV_USERNAME).filter(|v| !v.is_empty()) {
            debug!("Username taken from environment");
            self.username = username;
        }
        if let Some(password) = lookup(ENV_PASSWORD).filter(|v| !v.is_empty()) {
            debug!("Password taken from environment");
            self.password = Some(password);
        }
        self
    }

    /// Checks that the configuration can drive a scanner.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.username.trim().is_empty() {
            return Err(StoreError::Config(format!(
                "username is required (set it in the config file or {ENV_USERNAME})"
            )));
        }
        if !self.max_gps_accuracy.is_finite() || self.max_gps_accuracy < 0.0 {
            return Err(StoreError::Config(format!(
                "max_gps_accuracy must be a non-negative number, got {}",
                self.max_gps_accuracy
            )));
        }
        if self.scan_interval == 0 {
            return Err(StoreError::Config("scan_interval must be at least 1 second".into()));
        }
        if self.timeout == 0 {
            return Err(StoreError::Config("timeout must be at least 1 second".into()));
        }
        Ok(())
    }

    /// Returns the password from the config or environment, falling back
    /// to the keychain.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingPassword`] if none is found.
    pub fn resolve_password(&self) -> Result<String, StoreError> {
        if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
            return Ok(password.to_string());
        }
        keychain::get_password(&self.username)
            .ok_or_else(|| StoreError::MissingPassword(self.username.clone()))
    }

    /// Interval between update cycles.
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval)
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

// ============================================================================
// Coercion
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

/// Accepts `100`, `100.5` or `"100"`.
fn deserialize_accuracy<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(value) => Ok(value),
        NumberOrString::Text(text) => text.trim().parse().map_err(|_| {
            serde::de::Error::custom(format!("max_gps_accuracy is not a number: {text:?}"))
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================
