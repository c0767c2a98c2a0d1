//! Run command - poll until interrupted.

use anyhow::Result;
use clap::Args;
use pawtrack_store::LocationStore;
use std::sync::Arc;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{info, warn};

use super::{build_scanner, load_config, print_cycle};
use crate::Cli;

/// Shortest accepted polling interval in seconds.
const MIN_INTERVAL: u64 = 10;

/// Arguments for run command.
#[derive(Args, Default)]
pub struct RunArgs {
    /// Seconds between cycles (defaults to `scan_interval` from the config).
    #[arg(long, short)]
    pub interval: Option<u64>,

    /// Stop after this many cycles.
    #[arg(long)]
    pub cycles: Option<u64>,
}

/// Runs the run command.
pub async fn run(args: &RunArgs, cli: &Cli) -> Result<()> {
    let config = load_config(cli).await?;
    let store = Arc::new(LocationStore::new());
    let mut scanner = build_scanner(&config, store.clone())?;

    let count = scanner.start().await?.len();

    let period = polling_interval(args.interval.unwrap_or(config.scan_interval));
    info!(trackers = count, interval = period, "Starting update loop");

    // The first tick completes immediately, so the first cycle runs at once.
    let mut ticker = interval(Duration::from_secs(period));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut completed: u64 = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = scanner.run_cycle().await;
                print_cycle(cli, &report, &store).await?;

                completed += 1;
                if args.cycles.is_some_and(|max| completed >= max) {
                    info!(cycles = completed, "Cycle limit reached");
                    break;
                }
            }
            signal = &mut shutdown => {
                signal?;
                info!(cycles = completed, "Interrupted, stopping");
                break;
            }
        }
    }

    Ok(())
}

/// Raises `requested` to [`MIN_INTERVAL`], warning when it does.
fn polling_interval(requested: u64) -> u64 {
    if requested < MIN_INTERVAL {
        warn!(
            requested,
            minimum = MIN_INTERVAL,
            "Scan interval too short, using the minimum"
        );
        MIN_INTERVAL
    } else {
        requested
    }
}
