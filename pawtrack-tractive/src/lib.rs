// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # pawtrack Tractive
//!
//! Client and polling loop for the Tractive pet-tracking service.
//!
//! ## Components
//!
//! | Module | Role |
//! |--------|------|
//! | [`api`] | endpoints, client headers, request timeout |
//! | [`auth`] | login, credential refresh |
//! | [`directory`] | tracker discovery |
//! | [`telemetry`] | hardware report and position history |
//! | [`fuser`] | point fusion and the accuracy gate |
//! | [`scanner`] | update cycle with one re-login retry per tracker |
//!
//! ## Usage
//!
//! ```ignore
//! use pawtrack_fetch::FetchContext;
//! use pawtrack_tractive::{CredentialManager, Scanner, ScannerOptions, TractiveApi};
//!
//! let api = TractiveApi::new(FetchContext::new());
//! let auth = CredentialManager::new("me@example.com", "secret");
//! let mut scanner = Scanner::new(api, auth, sink, ScannerOptions::default());
//!
//! scanner.start().await?;
//! let report = scanner.run_cycle().await;
//! ```

pub mod api;
pub mod auth;
pub mod directory;
pub mod error;
pub mod fuser;
pub mod scanner;
pub mod telemetry;

pub use api::{API_BASE, CLIENT_ID, TractiveApi};
pub use auth::CredentialManager;
pub use directory::list_trackers;
pub use error::ScannerError;
pub use fuser::{Rejection, fuse};
pub use scanner::{
    CycleReport, DEFAULT_MAX_GPS_ACCURACY, Scanner, ScannerOptions, ScannerState, TrackerOutcome,
};
pub use telemetry::{Telemetry, TelemetryFetcher};
