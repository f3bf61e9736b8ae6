//! Per-record processing cycle
//!
//! One `TrendRecord` tracks one process variable. Each scan cycle feeds it a
//! single timestamped sample plus the cycle's settings, and gets back the
//! stored measurement count and a (rate, time-to-threshold) estimate per
//! configured slot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrendwatchError};
use crate::fit::{fit_window, time_to_threshold};
use crate::store::SampleStore;

/// Number of (window, threshold) slots evaluated per record
pub const MAX_SLOTS: usize = 4;

/// Smallest usable fit window
pub const MIN_WINDOW: usize = 2;

/// Default severity level at or above which a sample is considered invalid
pub const DEFAULT_INVALID_SEVERITY: u32 = 3;

/// One (window, threshold) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotConfig {
    /// Number of trailing measurements to fit over
    pub window: usize,
    /// Threshold value whose crossing time is estimated
    pub threshold: f64,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            window: MIN_WINDOW,
            threshold: 0.0,
        }
    }
}

/// Everything one processing cycle needs.
///
/// Settings are supplied fresh each cycle rather than owned by the record, so
/// the host can drive them from live inputs.
#[derive(Debug, Clone)]
pub struct CycleInput {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    /// Externally supplied quality code for this sample
    pub severity: u32,
    pub slots: [SlotConfig; MAX_SLOTS],
    /// Raw samples averaged per stored measurement; 0 behaves as 1
    pub decimation_factor: u32,
    /// Clear the measurement history before ingesting this sample
    pub reset: bool,
    /// Multiplier applied to rates, e.g. 60.0 for per-minute rates
    pub rate_scale: f64,
    /// Divisor applied to time estimates, e.g. 3600.0 for hours
    pub time_scale: f64,
}

/// Rate and time-to-threshold estimate for one slot.
///
/// NaN and ±infinity are meaningful here: a zero rate has no crossing time,
/// and a negative eta means the threshold is already crossed. They are never
/// replaced with error values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SlotEstimate {
    pub rate: f64,
    pub eta: f64,
}

/// Outputs of one computed cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CycleOutput {
    /// Measurements stored after this cycle's ingest
    pub sample_count: usize,
    pub slots: [SlotEstimate; MAX_SLOTS],
}

/// Result of one processing cycle.
///
/// A skipped cycle is a success: the sample was marked invalid and the
/// previous outputs stand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    Skipped,
    Computed(CycleOutput),
}

/// Trend estimator state for a single process variable.
///
/// Records are independent; the host invokes each one serially. The
/// measurement history is sized once at construction and never reallocated.
#[derive(Debug)]
pub struct TrendRecord {
    name: String,
    store: SampleStore,
    invalid_severity: u32,
}

impl TrendRecord {
    /// Build a record sized for the configured slots.
    ///
    /// Capacity is the widest configured window or the explicit
    /// `max_samples` hint, whichever is larger, clamped by the store to
    /// [10, 32768]. `max_samples` matters when window sizes are driven from
    /// live inputs and may grow after construction.
    pub fn new(
        name: impl Into<String>,
        slots: &[SlotConfig],
        max_samples: usize,
        invalid_severity: u32,
    ) -> Self {
        let widest = slots.iter().map(|s| s.window).max().unwrap_or(0);
        let name = name.into();
        let store = SampleStore::new(widest.max(max_samples));
        tracing::debug!(
            "Record '{}' initialized with capacity {}",
            name,
            store.capacity()
        );
        Self {
            name,
            store,
            invalid_severity,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Measurements currently stored
    pub fn sample_count(&self) -> usize {
        self.store.len()
    }

    /// Fixed history capacity
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Run one scan cycle.
    ///
    /// A sample whose severity is at or above the configured invalid level
    /// skips the cycle without touching the history. A non-finite value is
    /// rejected with an error before it can reach the store: once admitted
    /// it would poison every fit until it aged out of the buffer. Otherwise
    /// the sample is ingested (honoring the reset flag and decimation) and
    /// all slots are fitted and scaled.
    pub fn process(&mut self, input: &CycleInput) -> Result<CycleOutcome> {
        if input.severity >= self.invalid_severity {
            tracing::debug!(
                "Record '{}' skipping cycle, sample severity {} >= {}",
                self.name,
                input.severity,
                self.invalid_severity
            );
            return Ok(CycleOutcome::Skipped);
        }

        if !input.value.is_finite() {
            return Err(TrendwatchError::NonFiniteInput {
                record: self.name.clone(),
                value: input.value,
            });
        }

        if input.reset {
            tracing::debug!("Record '{}' history reset", self.name);
            self.store.reset();
        }

        self.store
            .ingest(input.timestamp, input.value, input.decimation_factor);

        let rate_scale = if input.rate_scale > 0.0 {
            input.rate_scale
        } else {
            1.0
        };
        let time_scale = if input.time_scale > 0.0 {
            input.time_scale
        } else {
            1.0
        };

        let capacity = self.store.capacity();
        let mut slots = [SlotEstimate::default(); MAX_SLOTS];
        for (estimate, slot) in slots.iter_mut().zip(input.slots.iter()) {
            let window = slot.window.clamp(MIN_WINDOW, capacity);
            let fit = fit_window(&self.store, window);
            estimate.rate = fit.slope * rate_scale;
            estimate.eta = time_to_threshold(&fit, slot.threshold) / time_scale;
        }

        Ok(CycleOutcome::Computed(CycleOutput {
            sample_count: self.store.len(),
            slots,
        }))
    }
}
