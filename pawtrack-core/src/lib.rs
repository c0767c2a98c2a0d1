// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `pawtrack` Core
//!
//! Core types, models, and traits for the `pawtrack` tracker poller.
//!
//! This crate provides the foundational abstractions used across all other
//! `pawtrack` crates, including:
//!
//! - Domain models (credentials, trackers, telemetry, fused locations)
//! - Error types
//! - The [`LocationSink`] trait that receives published locations
//!
//! ## Key Types
//!
//! ### Session
//! - [`Credential`] - Bearer token and user id returned by login
//! - [`TrackerId`] - Opaque tracker identifier
//!
//! ### Telemetry
//! - [`HardwareReport`] - Best-effort hardware status (battery, charging, ...)
//! - [`PositionPoint`] - One sample from the position history
//!
//! ### Publication
//! - [`FusedRecord`] - Position merged with hardware status
//! - [`LocationUpdate`] - Payload handed to a [`LocationSink`]

pub mod error;
pub mod models;
pub mod traits;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Session types
    Credential,
    TrackerId,
    // Telemetry types
    HardwareReport,
    PositionPoint,
    PositionSegments,
    METADATA_FIELDS,
    // Publication types
    DEFAULT_ICON,
    FusedRecord,
    LocationUpdate,
};

// Re-export traits
pub use traits::LocationSink;
