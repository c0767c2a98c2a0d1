// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # pawtrack Store
//!
//! Configuration and state for pawtrack.
//!
//! This crate provides:
//!
//! - **Config**: JSON config file with environment overrides
//! - **Keychain**: cached account password lookup
//! - **LocationStore**: latest location per tracker
//! - **Persistence**: File I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use pawtrack_store::{Config, LocationStore};
//!
//! let config = Config::load_from(&Config::default_path()).await?.with_env_overrides();
//! config.validate()?;
//! let password = config.resolve_password()?;
//!
//! let store = Arc::new(LocationStore::new());
//! // hand `store.clone()` to the scanner as its sink, then:
//! for seen in store.all().await {
//!     println!("{} at {:?}", seen.update.device_id, seen.update.gps);
//! }
//! ```

pub mod config;
pub mod error;
pub mod keychain;
pub mod location_store;
pub mod persistence;

pub use config::{Config, ENV_PASSWORD, ENV_USERNAME};
pub use error::StoreError;
pub use location_store::{LocationStore, SeenLocation};
pub use persistence::{
    default_config_dir, default_config_path, load_json, load_json_or_default, save_json,
};
