//! Once command - a single update cycle.

use anyhow::Result;
use pawtrack_store::LocationStore;
use std::sync::Arc;
use tracing::info;

use super::{build_scanner, load_config, print_cycle};
use crate::Cli;

/// Runs the once command.
pub async fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli).await?;
    let store = Arc::new(LocationStore::new());
    let mut scanner = build_scanner(&config, store.clone())?;

    let trackers = scanner.start().await?;
    info!(count = trackers.len(), "Trackers discovered");

    let report = scanner.run_cycle().await;
    print_cycle(cli, &report, &store).await
}
