//! Trendwatch CLI
//!
//! Command-line interface for the process variable trend estimation service.

use std::path::PathBuf;

use clap::Parser;
use tracing::Level;
use trendwatch::{load_config, Config};

#[derive(Parser)]
#[command(name = "trendwatch")]
#[command(about = "Process variable trend monitoring and time-to-limit estimation")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, log_level={:?}",
        args.config,
        args.log_level
    );

    let config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    tracing::info!("Starting trendwatch service");
    tracing::debug!("Records: {}", config.records.len());

    trendwatch::run(config).await?;

    Ok(())
}
