//! HTTP gateway with tracing, timeouts, and domain allowlist.
//!
//! The scanner only talks to the network through [`HttpGateway`], so tests
//! and embedders can swap the transport. [`ReqwestGateway`] is the default
//! implementation and adds:
//! - Request/response tracing
//! - A hard per-request timeout
//! - Domain allowlist for security

use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::error::GatewayError;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// User agent string for pawtrack.
const USER_AGENT: &str = concat!("pawtrack/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Request / Response
// ============================================================================

/// HTTP method supported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// A single request handed to the gateway.
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Header name/value pairs, sent in order.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: Option<String>,
    /// Upper bound for the whole exchange, body included.
    pub timeout: Duration,
}

impl GatewayRequest {
    /// Creates a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// Creates a POST request.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds several headers.
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Sets the body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns a header value by case-insensitive name.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for GatewayRequest {
    // Headers and body carry tokens and passwords.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Response returned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse {
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase for the status.
    pub reason: String,
    /// Response body.
    pub body: String,
}

impl GatewayResponse {
    /// Creates a response, deriving the reason phrase from the status.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown")
            .to_string();
        Self {
            status,
            reason,
            body: body.into(),
        }
    }

    /// The service only treats exactly 200 as success.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

// ============================================================================
// Gateway Trait
// ============================================================================

/// Transport used for every call to the tracker service.
#[async_trait]
pub trait HttpGateway: Send + Sync {
    /// Performs a request, bounded by `request.timeout`.
    ///
    /// Any HTTP status is a successful exchange; only transport failures
    /// and timeouts are errors.
    async fn request(&self, request: GatewayRequest) -> Result<GatewayResponse, GatewayError>;
}

// ============================================================================
// Reqwest Gateway
// ============================================================================

/// Default gateway backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestGateway {
    inner: Client,
    allowed_domains: Option<Vec<String>>,
}

impl ReqwestGateway {
    /// Creates a new gateway.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built. This should only occur
    /// if the system's TLS/SSL configuration is fundamentally broken,
    /// making network operations impossible.
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|e| {
                panic!(
                    "Failed to create HTTP client: {e}. \
                    This usually indicates a broken TLS/SSL configuration."
                )
            });

        Self {
            inner: client,
            allowed_domains: None,
        }
    }

    /// Creates a gateway that only talks to the given domains (and their
    /// subdomains).
    pub fn with_allowed_domains(domains: Vec<String>) -> Self {
        let mut gateway = Self::new();
        gateway.allowed_domains = Some(domains);
        gateway
    }

    /// Checks if a URL's domain is allowed.
    fn is_domain_allowed(&self, url: &str) -> Result<(), GatewayError> {
        let Some(ref allowed) = self.allowed_domains else {
            return Ok(()); // No restrictions
        };

        let parsed = Url::parse(url).map_err(|e| GatewayError::InvalidUrl(e.to_string()))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| GatewayError::InvalidUrl("No host in URL".to_string()))?;

        let allowed = allowed
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{domain}")));

        if allowed {
            Ok(())
        } else {
            Err(GatewayError::DomainNotAllowed(host.to_string()))
        }
    }

    async fn exchange(&self, request: GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        let timeout = request.timeout;
        let mut builder = match request.method {
            Method::Get => self.inner.get(&request.url),
            Method::Post => self.inner.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;
        let status = response.status();
        debug!(status = %status, "Response received");

        let body = response.text().await.map_err(|e| classify(e, timeout))?;
        Ok(GatewayResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            body,
        })
    }
}

/// Maps a reqwest error onto the gateway taxonomy.
fn classify(err: reqwest::Error, timeout: Duration) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout(timeout)
    } else {
        err.into()
    }
}

impl Default for ReqwestGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpGateway for ReqwestGateway {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn request(&self, request: GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        self.is_domain_allowed(&request.url)?;
        debug!("Sending request");

        let timeout = request.timeout;
        match tokio::time::timeout(timeout, self.exchange(request)).await {
            Ok(result) => result,
            Err(_elapsed) => {
                debug!(?timeout, "Request timed out");
                Err(GatewayError::Timeout(timeout))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
