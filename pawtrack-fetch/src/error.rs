//! Fetch error types.
//!
//! Failures are split by category so callers branch on the variant rather
//! than on where the error came from:
//!
//! | Variant | Category | Effect |
//! |---------|----------|--------|
//! | [`FetchError::Transport`] | network-level | fatal during startup |
//! | [`FetchError::Timeout`] | soft | retry next cycle |
//! | [`FetchError::Protocol`] | soft (non-200) | logged, retry next cycle |
//! | [`FetchError::InvalidResponse`] | soft (bad body) | logged, retry next cycle |

use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level failure (DNS, connection refused, TLS, ...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request timed out.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The service answered with a non-200 status.
    #[error("Unexpected status {status} {reason}")]
    Protocol {
        /// HTTP status code.
        status: u16,
        /// Reason phrase for the status.
        reason: String,
    },

    /// The service answered 200 with a body we could not use.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl FetchError {
    /// Returns true for failures that must abort scanner startup.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns true for failures that are retried on the next cycle.
    pub fn is_soft(&self) -> bool {
        !self.is_fatal()
    }

    /// Returns true if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<GatewayError> for FetchError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Timeout(after) => Self::Timeout(after),
            GatewayError::Transport(msg) => Self::Transport(msg),
            GatewayError::DomainNotAllowed(host) => {
                Self::Transport(format!("domain not allowed: {host}"))
            }
            GatewayError::InvalidUrl(msg) => Self::Transport(format!("invalid URL: {msg}")),
        }
    }
}

impl From<pawtrack_core::CoreError> for FetchError {
    fn from(err: pawtrack_core::CoreError) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

// ============================================================================
// Gateway Error
// ============================================================================

/// Error type for the HTTP gateway.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// Network-level failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The request did not complete within its timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Domain not allowed.
    #[error("Domain not allowed: {0}")]
    DomainNotAllowed(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}
