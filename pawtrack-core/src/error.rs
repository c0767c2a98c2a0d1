//! Core error types for `pawtrack`.

use thiserror::Error;

/// Core error type for `pawtrack` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid data from API response.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
