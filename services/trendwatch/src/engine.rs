//! Engine: drives one scan loop per record
//!
//! Each record gets its own task that polls the sample source at the
//! configured interval, runs the processing cycle, and emits computed
//! updates. Loops end when their source is exhausted or the engine is
//! cancelled.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::RecordConfig;
use crate::error::Result;
use crate::io::{SampleSource, SinkHandle, TrendUpdate};
use crate::record::{CycleInput, CycleOutcome, SlotConfig, TrendRecord, MAX_SLOTS};
use crate::state::StateHandle;

/// Consecutive rejected cycles before a warning is logged
const REJECT_WARN_THRESHOLD: u32 = 5;

/// One record plus everything its scan loop needs
pub struct RecordTask {
    pub record: TrendRecord,
    pub source: Box<dyn SampleSource>,
    pub slots: [SlotConfig; MAX_SLOTS],
    /// Number of configured slots; estimates beyond this are not emitted
    pub active_slots: usize,
    pub decimation_factor: u32,
    pub rate_scale: f64,
    pub time_scale: f64,
    pub interval: Duration,
}

impl RecordTask {
    /// Build a task from a record's configuration and an opened source
    pub fn from_config(config: &RecordConfig, source: Box<dyn SampleSource>) -> Result<Self> {
        if !(config.scan_interval_seconds > 0.0) || !config.scan_interval_seconds.is_finite() {
            return Err(crate::TrendwatchError::Config(format!(
                "Record '{}' scan interval must be a positive number of seconds",
                config.name
            )));
        }

        // Unconfigured slots keep their defaults, so all four are always fitted.
        let mut slots = [SlotConfig::default(); MAX_SLOTS];
        for (slot, configured) in slots.iter_mut().zip(config.slots.iter()) {
            *slot = *configured;
        }

        let record = TrendRecord::new(
            &config.name,
            &slots,
            config.max_samples,
            config.invalid_severity,
        );

        Ok(Self {
            record,
            source,
            slots,
            active_slots: config.slots.len().min(MAX_SLOTS),
            decimation_factor: config.decimation_factor,
            rate_scale: config.rate_scale,
            time_scale: config.time_scale,
            interval: Duration::from_secs_f64(config.scan_interval_seconds),
        })
    }
}

/// The engine owns the scan loops for all configured records
pub struct Engine {
    tasks: Vec<RecordTask>,
    sink: SinkHandle,
    state: StateHandle,
    cancel: CancellationToken,
}

impl Engine {
    pub fn new(
        tasks: Vec<RecordTask>,
        sink: SinkHandle,
        state: StateHandle,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            tasks,
            sink,
            state,
            cancel,
        }
    }

    /// Run all scan loops to completion.
    ///
    /// Returns when every loop has ended, either because its source was
    /// exhausted or because the cancellation token fired.
    pub async fn run(self) {
        let mut handles = Vec::new();
        for task in self.tasks {
            let sink = std::sync::Arc::clone(&self.sink);
            let state = std::sync::Arc::clone(&self.state);
            let cancel = self.cancel.clone();
            handles.push(tokio::spawn(async move {
                scan_loop(task, sink, state, cancel).await;
            }));
        }

        for handle in handles {
            let _ = handle.await;
        }
    }
}

async fn scan_loop(
    mut task: RecordTask,
    sink: SinkHandle,
    state: StateHandle,
    cancel: CancellationToken,
) {
    let name = task.record.name().to_string();
    tracing::debug!(
        "Scan loop for '{}' started, interval {:?}, capacity {}",
        name,
        task.interval,
        task.record.capacity()
    );

    loop {
        let sample = match task.source.next_sample().await {
            Ok(Some(sample)) => sample,
            Ok(None) => {
                tracing::info!("Sample source for '{}' exhausted", name);
                break;
            }
            Err(e) => {
                tracing::warn!("Sample source for '{}' failed: {}", name, e);
                if wait_for_next_scan(&name, task.interval, &cancel).await {
                    continue;
                }
                break;
            }
        };

        let input = CycleInput {
            timestamp: sample.timestamp,
            value: sample.value,
            severity: sample.severity,
            slots: task.slots,
            decimation_factor: task.decimation_factor,
            reset: sample.reset,
            rate_scale: task.rate_scale,
            time_scale: task.time_scale,
        };

        match task.record.process(&input) {
            Ok(CycleOutcome::Computed(output)) => {
                let update = TrendUpdate {
                    record: name.clone(),
                    timestamp: sample.timestamp,
                    sample_count: output.sample_count,
                    estimates: output.slots[..task.active_slots].to_vec(),
                };
                state.write().await.record_computed(&name, update.clone());
                if let Err(e) = sink.lock().await.emit(&update).await {
                    tracing::warn!("Failed to emit update for '{}': {}", name, e);
                }
            }
            Ok(CycleOutcome::Skipped) => {
                state.write().await.record_skipped(&name);
            }
            Err(e) => {
                let rejects = state.write().await.record_rejected(&name);
                tracing::error!("Cycle for '{}' rejected: {}", name, e);
                if rejects == REJECT_WARN_THRESHOLD {
                    tracing::warn!(
                        "Record '{}' has {} consecutive rejected cycles",
                        name,
                        rejects
                    );
                }
            }
        }

        if !wait_for_next_scan(&name, task.interval, &cancel).await {
            break;
        }
    }
}

/// Sleep until the next scan tick. Returns false when cancelled.
async fn wait_for_next_scan(name: &str, interval: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(interval) => true,
        _ = cancel.cancelled() => {
            tracing::debug!("Scan loop for '{}' cancelled", name);
            false
        }
    }
}
