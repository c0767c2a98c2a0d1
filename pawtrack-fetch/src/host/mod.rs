//! Host APIs for pawtrack.
//!
//! - [`http`] - HTTP gateway trait and reqwest implementation
//! - `scripted` - In-memory gateway for tests (`test-util` feature)

pub mod http;
#[cfg(any(test, feature = "test-util"))]
pub mod scripted;

// Re-export key types
pub use http::{GatewayRequest, GatewayResponse, HttpGateway, Method, ReqwestGateway};
