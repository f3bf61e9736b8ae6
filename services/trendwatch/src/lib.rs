//! Trendwatch - process variable trend estimation service
//!
//! Samples scalar process variables, fits a sliding-window least-squares
//! line over their recent history, and estimates the rate of change and the
//! time remaining until configured thresholds are crossed.

pub mod config;
pub mod engine;
pub mod error;
pub mod fit;
pub mod io;
pub mod ramp;
pub mod record;
pub mod replay;
pub mod state;
pub mod store;

pub use config::{load_config, Config, SourceConfig};
pub use error::{Result, TrendwatchError};
pub use record::{CycleInput, CycleOutcome, CycleOutput, SlotConfig, TrendRecord};
pub use store::SampleStore;

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::engine::{Engine, RecordTask};
use crate::io::{OutputSink, SampleSource, SinkHandle, StdoutSink};
use crate::ramp::RampSource;
use crate::replay::ReplaySource;

/// Run the trendwatch service with the given configuration
pub async fn run(config: Config) -> Result<()> {
    config.validate()?;

    if config.records.is_empty() {
        tracing::warn!("No records configured, nothing to monitor");
    }

    let cancel = CancellationToken::new();

    // Build one task per configured record
    let mut tasks = Vec::new();
    for record_config in &config.records {
        let source: Box<dyn SampleSource> = match &record_config.source {
            SourceConfig::Replay { path } => Box::new(ReplaySource::open(path).await?),
            SourceConfig::Ramp {
                start_value,
                rate_per_second,
            } => Box::new(RampSource::new(*start_value, *rate_per_second)),
        };
        tasks.push(RecordTask::from_config(record_config, source)?);
    }

    let record_names: Vec<String> = config.records.iter().map(|r| r.name.clone()).collect();
    let state = state::new_state_handle(record_names);

    let sink: SinkHandle = Arc::new(Mutex::new(Box::new(StdoutSink) as Box<dyn OutputSink>));

    // Setup shutdown handler
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for ctrl-c");
        tracing::info!("Shutdown signal received");
        cancel_for_signal.cancel();
    });

    let engine = Engine::new(tasks, sink, Arc::clone(&state), cancel);

    tracing::info!(
        "Trendwatch engine started with {} record(s)",
        config.records.len()
    );

    // Run the engine (blocks until all loops end or cancellation)
    engine.run().await;

    for status in &state.read().await.records {
        tracing::info!(
            "Record '{}': {} scans, {} skipped, {} measurements stored",
            status.name,
            status.scans,
            status.skipped,
            status.sample_count
        );
    }
    tracing::info!("Trendwatch engine stopped");

    Ok(())
}
