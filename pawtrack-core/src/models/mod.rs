//! Domain models for pawtrack.
//!
//! ## Submodules
//!
//! - [`session`] - Login credential and tracker ids
//! - [`telemetry`] - Raw payloads returned by the tracker service
//! - [`location`] - Fused records and sink payloads

mod location;
mod session;
mod telemetry;

// Re-export everything at the models level
pub use location::{DEFAULT_ICON, FusedRecord, LocationUpdate};
pub use session::{Credential, TrackerId};
pub use telemetry::{HardwareReport, METADATA_FIELDS, PositionPoint, PositionSegments};
