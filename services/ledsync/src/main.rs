//! Ledsync CLI
//!
//! Command-line interface for the LED control panel sync client.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use ledsync::sync::WriteOutcome;
use ledsync::view::ConsoleView;
use ledsync::{load_config, Config, LedSyncError};
use tracing::Level;

#[derive(Parser)]
#[command(name = "ledsync")]
#[command(about = "LED control panel sync client")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Panel host (overrides config file)
    #[arg(long)]
    host: Option<String>,

    /// Panel port (overrides config file)
    #[arg(long)]
    port: Option<u16>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Watch the panel, polling for status changes until interrupted
    Watch,
    /// Print the current LED status and exit
    Status,
    /// Flip the LED and exit
    Toggle,
    /// Turn the LED on and exit
    On,
    /// Turn the LED off and exit
    Off,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::debug!(
        "Panel at {}, polling every {}s",
        config.server.base_url(),
        config.poll_interval_seconds
    );

    match args.command.unwrap_or(Command::Watch) {
        Command::Watch => ledsync::run(config).await?,
        Command::Status => one_shot_status(&config).await?,
        Command::Toggle => one_shot_write(&config, None).await?,
        Command::On => one_shot_write(&config, Some(true)).await?,
        Command::Off => one_shot_write(&config, Some(false)).await?,
    }

    Ok(())
}

async fn one_shot_status(config: &Config) -> Result<(), LedSyncError> {
    let client = ledsync::build_client(config, Arc::new(ConsoleView));
    client.refresh().await;

    if !client.state().read().await.connected() {
        return Err(LedSyncError::Http("LED panel unreachable".to_string()));
    }
    Ok(())
}

async fn one_shot_write(config: &Config, desired: Option<bool>) -> Result<(), LedSyncError> {
    let client = ledsync::build_client(config, Arc::new(ConsoleView));

    // Learn the authoritative status first so a toggle negates what the
    // panel reports, not a stale default
    client.refresh().await;
    if !client.state().read().await.connected() {
        return Err(LedSyncError::Http("LED panel unreachable".to_string()));
    }

    let outcome = match desired {
        Some(status) => client.set(status).await,
        None => client.toggle().await,
    };

    match outcome {
        WriteOutcome::Applied(_) => Ok(()),
        WriteOutcome::Rejected(message) => Err(LedSyncError::Api(message)),
        WriteOutcome::Unreachable => {
            Err(LedSyncError::Http("LED panel unreachable".to_string()))
        }
        // A single caller holds the only write handle
        WriteOutcome::Busy => Ok(()),
    }
}
