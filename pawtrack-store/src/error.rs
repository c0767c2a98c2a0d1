//! Store error types.

use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration is present but unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No password in the environment, the config file or the keychain.
    #[error("No password configured for {0}")]
    MissingPassword(String),

    /// Keychain access failed.
    #[error("Keychain error: {0}")]
    Keychain(String),
}

impl StoreError {
    /// Returns true if the user has to fix the configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            StoreError::Config(_) | StoreError::MissingPassword(_) | StoreError::Serialization(_)
        )
    }
}
