//! Bounded, time-ordered sample history with decimating insertion
//!
//! One `SampleStore` holds the measurement history for a single process
//! variable. Capacity is fixed at construction; the hot path never allocates.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

/// Smallest history a store will be sized for
pub const MIN_CAPACITY: usize = 10;
/// Largest history a store will be sized for
pub const MAX_CAPACITY: usize = 32768;

/// One stored measurement. Immutable once stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Signed elapsed time in seconds, sub-second resolution.
///
/// Spans too large for microsecond precision fall back to milliseconds.
pub(crate) fn seconds_between(later: DateTime<Utc>, earlier: DateTime<Utc>) -> f64 {
    let delta = later - earlier;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1e6,
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}

/// Fixed-capacity measurement history for one process variable.
///
/// Raw samples are decimated on the way in: every `decimation_factor`
/// consecutive raw values are averaged into one stored measurement,
/// timestamped with the last raw sample of the group. When the buffer is
/// full the oldest measurement is evicted, so the history is always the
/// trailing window of the signal in oldest-to-newest order.
#[derive(Debug)]
pub struct SampleStore {
    samples: VecDeque<Sample>,
    capacity: usize,
    decimate_count: u32,
    decimate_total: f64,
}

impl SampleStore {
    /// Create a store sized for `capacity_hint` measurements, clamped to
    /// [`MIN_CAPACITY`, `MAX_CAPACITY`]. The backing storage is allocated
    /// here, once, for the life of the store.
    pub fn new(capacity_hint: usize) -> Self {
        let capacity = capacity_hint.clamp(MIN_CAPACITY, MAX_CAPACITY);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            decimate_count: 0,
            decimate_total: 0.0,
        }
    }

    /// Number of measurements a store can hold
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of measurements currently stored
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The most recent measurement, if any
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Drop all measurements and pending decimation state.
    ///
    /// Capacity is unchanged and the backing storage is kept. Idempotent.
    pub fn reset(&mut self) {
        self.samples.clear();
        self.decimate_count = 0;
        self.decimate_total = 0.0;
    }

    /// Feed one raw sample into the decimation accumulator.
    ///
    /// Returns true when the accumulator completed a group and a measurement
    /// was stored, false while a group is still filling. A factor of 0 or 1
    /// stores every raw value as-is. When the store is full the oldest
    /// measurement is evicted first; length never exceeds capacity.
    pub fn ingest(&mut self, timestamp: DateTime<Utc>, value: f64, decimation_factor: u32) -> bool {
        let factor = decimation_factor.max(1);

        self.decimate_total += value;
        self.decimate_count += 1;
        if self.decimate_count < factor {
            return false;
        }

        let decimated = if factor == 1 {
            value
        } else {
            self.decimate_total / f64::from(factor)
        };
        self.decimate_count = 0;
        self.decimate_total = 0.0;

        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(Sample {
            timestamp,
            value: decimated,
        });
        true
    }

    /// The trailing `min(n, len)` measurements in time order.
    ///
    /// An `n` of 0 yields an empty window.
    pub fn window(&self, n: usize) -> impl Iterator<Item = &Sample> {
        let skip = self.samples.len().saturating_sub(n);
        self.samples.iter().skip(skip)
    }
}
