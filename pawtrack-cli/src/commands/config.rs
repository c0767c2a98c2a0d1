//! Config command - manage configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use pawtrack_store::{Config, ENV_PASSWORD, default_config_dir, keychain};
use std::path::Path;
use tracing::info;

use super::config_path;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration (password hidden).
    Show,

    /// Show configuration paths.
    Path,

    /// Write a new config file.
    Init {
        /// Tractive account e-mail.
        #[arg(long, short)]
        username: String,

        /// Account password.
        #[arg(long, short)]
        password: Option<String>,

        /// Store the password in the system keychain instead of the file.
        #[arg(long)]
        keychain: bool,

        /// Maximum accepted GPS uncertainty in meters.
        #[arg(long)]
        max_gps_accuracy: Option<f64>,

        /// Seconds between update cycles.
        #[arg(long)]
        scan_interval: Option<u64>,

        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await,
        ConfigAction::Path => show_paths(cli),
        ConfigAction::Init {
            username,
            password,
            keychain,
            max_gps_accuracy,
            scan_interval,
            force,
        } => {
            let mut config = Config {
                username: username.clone(),
                ..Config::default()
            };
            if let Some(max) = max_gps_accuracy {
                config.max_gps_accuracy = *max;
            }
            if let Some(interval) = scan_interval {
                config.scan_interval = *interval;
            }
            init_config(config, password.as_deref(), *keychain, *force, cli).await
        }
    }
}

/// Where the password will come from, for display.
fn password_source(config: &Config) -> &'static str {
    if std::env::var(ENV_PASSWORD).is_ok_and(|v| !v.is_empty()) {
        "set (environment)"
    } else if config.password.as_deref().is_some_and(|p| !p.is_empty()) {
        "set (config file)"
    } else if !config.username.is_empty() && keychain::has_password(&config.username) {
        "set (keychain)"
    } else {
        "missing"
    }
}

async fn show_config(cli: &Cli) -> Result<()> {
    let path = config_path(cli);
    let file_config = Config::load_from(&path).await?;
    let source = password_source(&file_config);
    let config = file_config.with_env_overrides();

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_config(&config, &path, source));
        }
        OutputFormat::Json => {
            let redacted = Config {
                password: None,
                ..config
            };
            let mut value = serde_json::to_value(&redacted)?;
            value["password"] = serde_json::Value::String(source.to_string());
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&value)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let config_file = config_path(cli);

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:  {}", config_dir.display());
            println!("Config file: {}", config_file.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "config_file": config_file.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn init_config(
    mut config: Config,
    password: Option<&str>,
    use_keychain: bool,
    force: bool,
    cli: &Cli,
) -> Result<()> {
    let path = config_path(cli);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists, pass --force to overwrite",
            path.display()
        );
    }

    match (password, use_keychain) {
        (Some(password), true) => {
            keychain::store_password(&config.username, password)?;
            info!(username = %config.username, "Password stored in keychain");
        }
        (Some(password), false) => config.password = Some(password.to_string()),
        (None, _) => {}
    }
    config.validate()?;

    write_config(&config, &path).await?;
    println!("Wrote {}", path.display());
    Ok(())
}

async fn write_config(config: &Config, path: &Path) -> Result<()> {
    config.save_to(path).await?;
    info!(path = %path.display(), "Configuration written");
    Ok(())
}
