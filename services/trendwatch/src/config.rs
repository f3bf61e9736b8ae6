//! Configuration types for the trendwatch service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::record::{SlotConfig, DEFAULT_INVALID_SEVERITY, MAX_SLOTS};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub records: Vec<RecordConfig>,
}

/// Configuration for one monitored process variable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordConfig {
    pub name: String,
    pub source: SourceConfig,
    /// Up to four (window, threshold) pairs
    #[serde(default)]
    pub slots: Vec<SlotConfig>,
    /// Raw samples averaged into one stored measurement
    #[serde(default = "default_decimation_factor")]
    pub decimation_factor: u32,
    /// Explicit history size hint; 0 derives capacity from the window sizes
    #[serde(default)]
    pub max_samples: usize,
    #[serde(default = "default_scan_interval")]
    pub scan_interval_seconds: f64,
    /// Multiplier applied to rates, e.g. 60.0 for per-minute rates
    #[serde(default = "default_scale")]
    pub rate_scale: f64,
    /// Divisor applied to time estimates, e.g. 3600.0 for hours
    #[serde(default = "default_scale")]
    pub time_scale: f64,
    /// Samples with severity at or above this level skip the cycle
    #[serde(default = "default_invalid_severity")]
    pub invalid_severity: u32,
}

/// Sample source configuration with tagged enum for extensibility
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SourceConfig {
    /// Replay a recorded JSON-lines trace, keeping its timestamps
    #[serde(rename = "replay")]
    Replay { path: PathBuf },

    /// Synthesize a linear ramp from the wall clock
    #[serde(rename = "ramp")]
    Ramp {
        #[serde(default)]
        start_value: f64,
        #[serde(default = "default_ramp_rate")]
        rate_per_second: f64,
    },
}

fn default_decimation_factor() -> u32 {
    1
}

fn default_scan_interval() -> f64 {
    1.0
}

fn default_scale() -> f64 {
    1.0
}

fn default_invalid_severity() -> u32 {
    DEFAULT_INVALID_SEVERITY
}

fn default_ramp_rate() -> f64 {
    1.0
}

impl Config {
    /// Check cross-field constraints serde cannot express
    pub fn validate(&self) -> crate::Result<()> {
        let mut seen = std::collections::HashSet::new();
        for record in &self.records {
            if record.name.is_empty() {
                return Err(crate::TrendwatchError::Config(
                    "Record name must not be empty".to_string(),
                ));
            }
            if !seen.insert(record.name.as_str()) {
                return Err(crate::TrendwatchError::Config(format!(
                    "Duplicate record name '{}'",
                    record.name
                )));
            }
            if record.slots.len() > MAX_SLOTS {
                return Err(crate::TrendwatchError::Config(format!(
                    "Record '{}' has {} slots, at most {} are supported",
                    record.name,
                    record.slots.len(),
                    MAX_SLOTS
                )));
            }
            if !(record.scan_interval_seconds > 0.0) || !record.scan_interval_seconds.is_finite() {
                return Err(crate::TrendwatchError::Config(format!(
                    "Record '{}' scan interval must be a positive number of seconds",
                    record.name
                )));
            }
        }
        Ok(())
    }
}

/// Load and validate configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::TrendwatchError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}
