//! Scanner error types.

use pawtrack_fetch::FetchError;
use thiserror::Error;

/// Startup failure of the [`Scanner`](crate::Scanner).
#[derive(Debug, Error)]
pub enum ScannerError {
    /// Login failed.
    #[error("Login failed: {0}")]
    Login(#[source] FetchError),

    /// Tracker discovery failed.
    #[error("Tracker discovery failed: {0}")]
    Directory(#[source] FetchError),
}

impl ScannerError {
    /// Underlying fetch error.
    pub fn fetch_error(&self) -> &FetchError {
        match self {
            Self::Login(e) | Self::Directory(e) => e,
        }
    }

    /// Returns true if the service could not be reached at all.
    pub fn is_fatal(&self) -> bool {
        self.fetch_error().is_fatal()
    }
}
