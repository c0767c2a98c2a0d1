//! Trackers command - list the trackers on the account.

use anyhow::Result;
use pawtrack_store::LocationStore;
use std::sync::Arc;

use super::{build_scanner, load_config};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the trackers command.
pub async fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli).await?;
    let mut scanner = build_scanner(&config, Arc::new(LocationStore::new()))?;
    let trackers = scanner.start().await?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_trackers(trackers));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_trackers(trackers)?);
        }
    }

    Ok(())
}
