//! Synthetic linear-ramp sample source
//!
//! Generates `start_value + rate_per_second * elapsed` from the wall clock.
//! Handy for commissioning a deployment or smoke-testing threshold settings
//! without a live signal.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::io::{PvSample, SampleSource};
use crate::store::seconds_between;

/// Sample source producing a deterministic linear ramp
#[derive(Debug)]
pub struct RampSource {
    started: DateTime<Utc>,
    start_value: f64,
    rate_per_second: f64,
}

impl RampSource {
    pub fn new(start_value: f64, rate_per_second: f64) -> Self {
        Self {
            started: Utc::now(),
            start_value,
            rate_per_second,
        }
    }
}

#[async_trait]
impl SampleSource for RampSource {
    async fn next_sample(&mut self) -> Result<Option<PvSample>> {
        let now = Utc::now();
        let elapsed = seconds_between(now, self.started);
        Ok(Some(PvSample {
            timestamp: now,
            value: self.start_value + self.rate_per_second * elapsed,
            severity: 0,
            reset: false,
        }))
    }
}
