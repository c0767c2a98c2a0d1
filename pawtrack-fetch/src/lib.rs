// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # pawtrack Fetch
//!
//! HTTP transport and fetch error taxonomy for pawtrack.
//!
//! ## Host APIs
//!
//! The [`host`] module provides the network seam:
//!
//! - [`host::http::HttpGateway`] - Transport trait injected into the scanner
//! - [`host::http::ReqwestGateway`] - Default implementation with timeouts
//!   and a domain allowlist
//!
//! ## Errors
//!
//! [`FetchError`] tags every failure with its category (transport, timeout,
//! protocol, invalid response) so callers branch explicitly.
//!
//! ## Example
//!
//! ```ignore
//! use pawtrack_fetch::{FetchContext, GatewayRequest};
//!
//! let ctx = FetchContext::builder()
//!     .timeout(Duration::from_secs(10))
//!     .build();
//!
//! let response = ctx.http.request(ctx.bounded(GatewayRequest::get(url))).await?;
//! ```

pub mod context;
pub mod error;
pub mod host;

// Errors
pub use error::{FetchError, GatewayError};

// Host APIs
pub use host::http::{
    DEFAULT_TIMEOUT, GatewayRequest, GatewayResponse, HttpGateway, Method, ReqwestGateway,
};

// Context
pub use context::{FetchContext, FetchContextBuilder, FetchSettings};
