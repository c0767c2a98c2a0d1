//! CLI command implementations.

pub mod config;
pub mod once;
pub mod run;
pub mod trackers;

use anyhow::{Context, Result};
use pawtrack_core::LocationSink;
use pawtrack_fetch::{FetchContext, ReqwestGateway};
use pawtrack_store::{Config, LocationStore};
use pawtrack_tractive::{CredentialManager, CycleReport, Scanner, ScannerOptions, TractiveApi};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Domain the default gateway is restricted to.
const TRACTIVE_DOMAIN: &str = "tractive.com";

/// Config file selected by `--config` or the default location.
pub fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(Config::default_path)
}

/// Loads, overrides and validates the configuration.
pub async fn load_config(cli: &Cli) -> Result<Config> {
    let path = config_path(cli);
    let config = Config::load_from(&path)
        .await
        .with_context(|| format!("reading {}", path.display()))?
        .with_env_overrides();
    config.validate()?;
    Ok(config)
}

/// Builds an unauthenticated scanner publishing into `sink`.
pub fn build_scanner(config: &Config, sink: Arc<dyn LocationSink>) -> Result<Scanner> {
    let password = config.resolve_password()?;

    // A custom base may point anywhere, e.g. a local mock.
    let gateway = match config.api_base {
        Some(_) => ReqwestGateway::new(),
        None => ReqwestGateway::with_allowed_domains(vec![TRACTIVE_DOMAIN.to_string()]),
    };
    let ctx = FetchContext::builder()
        .http(Arc::new(gateway))
        .timeout(config.timeout())
        .build();

    let api = match &config.api_base {
        Some(base) => TractiveApi::with_base(ctx, base.as_str()),
        None => TractiveApi::new(ctx),
    };
    debug!(base = %api.base(), timeout = ?config.timeout(), "Scanner configured");

    let auth = CredentialManager::new(config.username.as_str(), password);
    let options = ScannerOptions {
        max_gps_accuracy: config.max_gps_accuracy,
    };
    Ok(Scanner::new(api, auth, sink, options))
}

/// Prints a finished cycle with the locations currently in `store`.
pub async fn print_cycle(cli: &Cli, report: &CycleReport, store: &LocationStore) -> Result<()> {
    let locations = store.all().await;
    let now = chrono::Utc::now();
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_cycle(report, &locations, now));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_cycle(report, &locations, now)?);
        }
    }
    Ok(())
}
