//! Tractive login.
//!
//! The token endpoint takes the account e-mail and password as a
//! `tractive` grant:
//!
//! ```json
//! {"platform_email": "...", "platform_token": "...", "grant_type": "tractive"}
//! ```
//!
//! and answers with `{"user_id": "...", "access_token": "...", ...}`.

use pawtrack_core::Credential;
use pawtrack_fetch::{FetchError, GatewayRequest};
use serde::Serialize;
use std::fmt;
use tracing::{error, info, instrument, warn};

use crate::api::{TractiveApi, expect_ok};

/// Grant type for e-mail/password logins.
pub const GRANT_TYPE: &str = "tractive";

#[derive(Serialize)]
struct TokenRequest<'a> {
    platform_email: &'a str,
    platform_token: &'a str,
    grant_type: &'static str,
}

// ============================================================================
// Credential Manager
// ============================================================================

/// Owns the account secrets and performs the login flow.
#[derive(Clone)]
pub struct CredentialManager {
    username: String,
    password: String,
}

impl CredentialManager {
    /// Creates a manager for an account.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Account e-mail.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Logs in and returns a fresh credential.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Transport`] if the service is unreachable
    /// - [`FetchError::Timeout`] if the call exceeded the request timeout
    /// - [`FetchError::Protocol`] for any status other than 200
    /// - [`FetchError::InvalidResponse`] if the token body is unusable
    #[instrument(skip(self, api), fields(username = %self.username))]
    pub async fn login(&self, api: &TractiveApi) -> Result<Credential, FetchError> {
        let body = serde_json::to_string(&TokenRequest {
            platform_email: &self.username,
            platform_token: &self.password,
            grant_type: GRANT_TYPE,
        })
        .map_err(|e| FetchError::InvalidResponse(e.to_string()))?;

        let request = api.anonymous(GatewayRequest::post(api.token_url()).body(body));

        let response = api.send(request).await.inspect_err(|e| {
            if e.is_fatal() {
                error!(error = %e, "Error connecting to Tractive");
            } else {
                warn!(error = %e, "Login timed out, will try again");
            }
        })?;

        let body = expect_ok(response).inspect_err(|e| {
            error!(error = %e, "Error getting token from Tractive");
        })?;

        let credential = Credential::from_json(&body).inspect_err(|e| {
            error!(error = %e, "Token response could not be parsed");
        })?;

        info!(user_id = %credential.user_id, "Logged in to Tractive");
        Ok(credential)
    }
}

impl fmt::Debug for CredentialManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialManager")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pawtrack_fetch::host::scripted::{Reply, ScriptedGateway};
    use pawtrack_fetch::{FetchContext, Method};
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn api_with(gateway: Arc<ScriptedGateway>) -> TractiveApi {
        TractiveApi::new(FetchContext::builder().http(gateway).build())
    }

    #[tokio::test]
    async fn test_login_success() {
        let gateway = Arc::new(ScriptedGateway::new().on(
            Method::Post,
            "/auth/token",
            Reply::ok(r#"{"user_id":"u1","access_token":"tok","expires_at":1}"#),
        ));
        let manager = CredentialManager::new("cat@example.com", "hunter2");

        let credential = manager.login(&api_with(gateway.clone())).await.unwrap();
        assert_eq!(credential, Credential::new("u1", "tok"));

        let request = &gateway.requests()[0];
        let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "platform_email": "cat@example.com",
                "platform_token": "hunter2",
                "grant_type": "tractive"
            })
        );
        assert!(request.header_value("authorization").is_none());
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let gateway =
            Arc::new(ScriptedGateway::new().on(Method::Post, "/auth/token", Reply::status(401)));
        let manager = CredentialManager::new("cat@example.com", "wrong");

        let err = manager.login(&api_with(gateway)).await.unwrap_err();
        assert!(matches!(err, FetchError::Protocol { status: 401, .. }));
        assert!(err.is_soft());
    }

    #[tokio::test]
    async fn test_login_timeout_is_soft() {
        let gateway =
            Arc::new(ScriptedGateway::new().on(Method::Post, "/auth/token", Reply::Timeout));
        let err = CredentialManager::new("a", "b")
            .login(&api_with(gateway))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_login_transport_is_fatal() {
        let gateway = Arc::new(ScriptedGateway::new().on(
            Method::Post,
            "/auth/token",
            Reply::Transport("connection refused".into()),
        ));
        let err = CredentialManager::new("a", "b")
            .login(&api_with(gateway))
            .await
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_login_garbage_body() {
        let gateway = Arc::new(ScriptedGateway::new().on(
            Method::Post,
            "/auth/token",
            Reply::ok("<html>maintenance</html>"),
        ));
        let err = CredentialManager::new("a", "b")
            .login(&api_with(gateway))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidResponse(_)));
    }

    #[test]
    fn test_debug_hides_password() {
        let manager = CredentialManager::new("cat@example.com", "hunter2");
        assert!(!format!("{manager:?}").contains("hunter2"));
    }
}
