//! File-replay sample source
//!
//! Streams a recorded JSON-lines trace of a process variable, one object per
//! line, preserving the recorded timestamps. Useful for offline trend
//! analysis of a logged signal.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};

use crate::error::{Result, TrendwatchError};
use crate::io::{PvSample, SampleSource};

/// Sample source backed by a JSON-lines trace file.
///
/// Each line is a [`PvSample`] object:
/// `{"timestamp": "2026-01-17T10:15:00Z", "value": 42.0, "severity": 0}`.
/// Blank lines are skipped; a malformed line is an error.
pub struct ReplaySource {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
}

impl ReplaySource {
    /// Open a trace file for replay
    pub async fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).await.map_err(|e| {
            TrendwatchError::Source(format!("Failed to open trace file {:?}: {}", path, e))
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            lines: BufReader::new(file).lines(),
        })
    }
}

#[async_trait]
impl SampleSource for ReplaySource {
    async fn next_sample(&mut self) -> Result<Option<PvSample>> {
        loop {
            let Some(line) = self.lines.next_line().await? else {
                return Ok(None);
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let sample: PvSample = serde_json::from_str(trimmed).map_err(|e| {
                TrendwatchError::Source(format!(
                    "Invalid sample line in {:?}: {}",
                    self.path, e
                ))
            })?;
            return Ok(Some(sample));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    async fn source_from(content: &str) -> (tempfile::TempDir, ReplaySource) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.jsonl");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", content).unwrap();
        let source = ReplaySource::open(&path).await.unwrap();
        (dir, source)
    }

    #[tokio::test]
    async fn replays_samples_in_file_order() {
        let (_dir, mut source) = source_from(concat!(
            "{\"timestamp\": \"2026-01-17T00:00:00Z\", \"value\": 1.0}\n",
            "{\"timestamp\": \"2026-01-17T00:00:01Z\", \"value\": 2.0, \"severity\": 2}\n",
        ))
        .await;

        let first = source.next_sample().await.unwrap().unwrap();
        assert_eq!(first.value, 1.0);
        assert_eq!(first.severity, 0);

        let second = source.next_sample().await.unwrap().unwrap();
        assert_eq!(second.value, 2.0);
        assert_eq!(second.severity, 2);

        assert!(source.next_sample().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn blank_lines_are_skipped() {
        let (_dir, mut source) = source_from(concat!(
            "\n",
            "{\"timestamp\": \"2026-01-17T00:00:00Z\", \"value\": 1.0}\n",
            "\n",
        ))
        .await;

        assert!(source.next_sample().await.unwrap().is_some());
        assert!(source.next_sample().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_line_is_an_error() {
        let (_dir, mut source) = source_from("not json\n").await;
        let err = source.next_sample().await.unwrap_err();
        assert!(err.to_string().contains("Invalid sample line"));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let result = ReplaySource::open(Path::new("/nonexistent/trace.jsonl")).await;
        assert!(result.is_err());
    }
}
