//! Session types: the login credential and tracker identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

// ============================================================================
// Credential
// ============================================================================

/// Bearer credential returned by the token endpoint.
///
/// A credential is only ever produced by a successful login and is replaced
/// wholesale on refresh; there is no partial update.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Account id, sent as `x-tractive-user` and used in directory URLs.
    pub user_id: String,
    /// Bearer token.
    pub access_token: String,
}

impl Credential {
    /// Creates a credential.
    pub fn new(user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            access_token: access_token.into(),
        }
    }

    /// Parses a token endpoint response body.
    ///
    /// Extra fields (expiry, scopes) are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not JSON, or if either field is
    /// missing or empty.
    pub fn from_json(body: &str) -> Result<Self, CoreError> {
        let credential: Self = serde_json::from_str(body)?;
        if credential.user_id.is_empty() || credential.access_token.is_empty() {
            return Err(CoreError::InvalidData(
                "token response has an empty user_id or access_token".to_string(),
            ));
        }
        Ok(credential)
    }

    /// Value for the `authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("user_id", &self.user_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Tracker Id
// ============================================================================

/// Opaque tracker identifier, immutable once discovered.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackerId(String);

impl TrackerId {
    /// Creates a tracker id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TrackerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for TrackerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
