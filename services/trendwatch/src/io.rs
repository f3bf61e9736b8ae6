//! I/O trait seams between the scan engine and the outside world
//!
//! Sample acquisition and output emission are behind traits so the engine can
//! be tested without a live signal feed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::record::SlotEstimate;

/// One raw sample as delivered by a source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PvSample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    /// Quality code for this sample; 0 means good
    #[serde(default)]
    pub severity: u32,
    /// Request a history reset before this sample is ingested
    #[serde(default)]
    pub reset: bool,
}

/// One emitted set of estimates for a record.
///
/// Non-finite rates and etas serialize as JSON null at this boundary; the
/// in-process values are never altered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendUpdate {
    pub record: String,
    pub timestamp: DateTime<Utc>,
    /// Measurements stored after this cycle
    pub sample_count: usize,
    /// One estimate per configured slot
    pub estimates: Vec<SlotEstimate>,
}

/// Trait for pulling samples from a process variable
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SampleSource: Send {
    /// Fetch the next sample
    ///
    /// Returns `Ok(Some(sample))` while the source has data,
    /// `Ok(None)` once it is exhausted,
    /// or an error if acquisition failed.
    async fn next_sample(&mut self) -> Result<Option<PvSample>>;
}

/// Trait for emitting computed trend updates
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OutputSink: Send {
    /// Emit one update
    async fn emit(&mut self, update: &TrendUpdate) -> Result<()>;
}

/// Shared handle to the sink used by all scan loops
pub type SinkHandle = Arc<Mutex<Box<dyn OutputSink>>>;

/// Sink writing one JSON line per update to stdout
#[derive(Debug, Default)]
pub struct StdoutSink;

#[async_trait]
impl OutputSink for StdoutSink {
    async fn emit(&mut self, update: &TrendUpdate) -> Result<()> {
        let line = serde_json::to_string(update)?;
        println!("{}", line);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_source_returns_scripted_sample() {
        let sample = PvSample {
            timestamp: DateTime::from_timestamp(5, 0).unwrap(),
            value: 1.5,
            severity: 0,
            reset: false,
        };

        let mut source = MockSampleSource::new();
        source
            .expect_next_sample()
            .times(1)
            .returning(move || Ok(Some(sample)));

        assert_eq!(source.next_sample().await.unwrap(), Some(sample));
    }

    #[test]
    fn update_serializes_non_finite_estimates_as_null() {
        let update = TrendUpdate {
            record: "pv".to_string(),
            timestamp: DateTime::from_timestamp(0, 0).unwrap(),
            sample_count: 3,
            estimates: vec![SlotEstimate {
                rate: 0.0,
                eta: f64::INFINITY,
            }],
        };
        let line = serde_json::to_string(&update).unwrap();
        assert!(line.contains("\"eta\":null"));
        assert!(line.contains("\"sample_count\":3"));
    }

    #[test]
    fn sample_line_defaults_severity_and_reset() {
        let sample: PvSample =
            serde_json::from_str(r#"{"timestamp": "2026-01-17T00:00:00Z", "value": 4.5}"#).unwrap();
        assert_eq!(sample.value, 4.5);
        assert_eq!(sample.severity, 0);
        assert!(!sample.reset);
    }
}
