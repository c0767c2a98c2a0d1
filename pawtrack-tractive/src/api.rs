//! Tractive API endpoints and request plumbing.
//!
//! Every call goes through [`TractiveApi`], which owns the base URL, adds the
//! fixed client headers, applies the request timeout and maps gateway
//! failures onto [`FetchError`].

use pawtrack_core::{Credential, TrackerId};
use pawtrack_fetch::{FetchContext, FetchError, GatewayRequest, GatewayResponse};
use tracing::debug;

// ============================================================================
// Constants
// ============================================================================

/// Tractive API base URL.
pub const API_BASE: &str = "https://graph.tractive.com/3";

/// Client identifier sent as `x-tractive-client`.
pub const CLIENT_ID: &str = "5728aa1fc9077f7c32000186";

/// Content type sent with every request.
const CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// Accept header sent with every request.
const ACCEPT: &str = "application/json, text/plain, */*";

// ============================================================================
// API Client
// ============================================================================

/// Request builder and sender for the Tractive API.
#[derive(Debug, Clone)]
pub struct TractiveApi {
    ctx: FetchContext,
    base: String,
}

impl TractiveApi {
    /// Creates a client against the public API.
    pub fn new(ctx: FetchContext) -> Self {
        Self::with_base(ctx, API_BASE)
    }

    /// Creates a client against a custom base URL.
    pub fn with_base(ctx: FetchContext, base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self { ctx, base }
    }

    /// Returns the base URL.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Returns the fetch context.
    pub fn context(&self) -> &FetchContext {
        &self.ctx
    }

    // ========================================================================
    // URLs
    // ========================================================================

    /// Token endpoint.
    pub fn token_url(&self) -> String {
        format!("{}/auth/token", self.base)
    }

    /// Tracker list of a user.
    pub fn trackers_url(&self, user_id: &str) -> String {
        format!("{}/user/{user_id}/trackers", self.base)
    }

    /// Latest hardware report of a tracker.
    pub fn hw_report_url(&self, tracker: &TrackerId) -> String {
        format!("{}/device_hw_report/{tracker}/", self.base)
    }

    /// Position history of a tracker between two unix timestamps.
    pub fn positions_url(&self, tracker: &TrackerId, time_from: i64, time_to: i64) -> String {
        format!(
            "{}/tracker/{tracker}/positions?time_from={time_from}&time_to={time_to}&format=json_segments",
            self.base
        )
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Adds the client headers and the timeout.
    pub fn anonymous(&self, request: GatewayRequest) -> GatewayRequest {
        self.ctx.bounded(request).headers([
            ("x-tractive-client", CLIENT_ID),
            ("content-type", CONTENT_TYPE),
            ("accept", ACCEPT),
        ])
    }

    /// Adds the client headers, the user id and the bearer token.
    pub fn authorized(&self, request: GatewayRequest, credential: &Credential) -> GatewayRequest {
        self.anonymous(request)
            .header("x-tractive-user", credential.user_id.as_str())
            .header("authorization", credential.bearer())
    }

    /// Sends a request through the gateway.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] or [`FetchError::Timeout`]; HTTP
    /// statuses are not inspected here.
    pub async fn send(&self, request: GatewayRequest) -> Result<GatewayResponse, FetchError> {
        debug!(method = %request.method, url = %request.url, "Calling Tractive");
        Ok(self.ctx.http.request(request).await?)
    }
}

/// Returns the body of a 200 response, or a protocol error.
///
/// # Errors
///
/// Returns [`FetchError::Protocol`] for any status other than 200.
pub fn expect_ok(response: GatewayResponse) -> Result<String, FetchError> {
    if response.is_ok() {
        Ok(response.body)
    } else {
        Err(FetchError::Protocol {
            status: response.status,
            reason: response.reason,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
