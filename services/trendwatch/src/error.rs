//! Error types for the trendwatch service

/// Errors that can occur in the trendwatch service
#[derive(Debug, thiserror::Error)]
pub enum TrendwatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Record '{record}' rejected non-finite sample value {value}")]
    NonFiniteInput { record: String, value: f64 },

    #[error("Sample source error: {0}")]
    Source(String),

    #[error("Output sink error: {0}")]
    Sink(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for trendwatch operations
pub type Result<T> = std::result::Result<T, TrendwatchError>;
