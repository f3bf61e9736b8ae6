//! Shared per-record status for the scan engine

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::io::TrendUpdate;

/// Status of a single record
#[derive(Debug, Clone, Serialize)]
pub struct RecordStatus {
    pub name: String,
    /// Cycles attempted, including skipped and rejected ones
    pub scans: u64,
    /// Cycles skipped because the sample was marked invalid
    pub skipped: u64,
    /// Rejected cycles since the last successful one
    pub consecutive_rejects: u32,
    /// Measurements stored after the last computed cycle
    pub sample_count: usize,
    pub last_update: Option<TrendUpdate>,
}

/// Shared state accessible by the engine and the shutdown summary
#[derive(Debug)]
pub struct SharedState {
    pub records: Vec<RecordStatus>,
}

impl SharedState {
    pub fn new(record_names: Vec<String>) -> Self {
        let records = record_names
            .into_iter()
            .map(|name| RecordStatus {
                name,
                scans: 0,
                skipped: 0,
                consecutive_rejects: 0,
                sample_count: 0,
                last_update: None,
            })
            .collect();
        Self { records }
    }

    /// Record a computed cycle and retain its update
    pub fn record_computed(&mut self, name: &str, update: TrendUpdate) {
        if let Some(status) = self.find_mut(name) {
            status.scans += 1;
            status.consecutive_rejects = 0;
            status.sample_count = update.sample_count;
            status.last_update = Some(update);
        }
    }

    /// Record a skipped (no-op) cycle; the previous update stands
    pub fn record_skipped(&mut self, name: &str) {
        if let Some(status) = self.find_mut(name) {
            status.scans += 1;
            status.skipped += 1;
            status.consecutive_rejects = 0;
        }
    }

    /// Record a rejected cycle, returning the consecutive reject count
    pub fn record_rejected(&mut self, name: &str) -> u32 {
        if let Some(status) = self.find_mut(name) {
            status.scans += 1;
            status.consecutive_rejects += 1;
            status.consecutive_rejects
        } else {
            0
        }
    }

    pub fn status(&self, name: &str) -> Option<&RecordStatus> {
        self.records.iter().find(|r| r.name == name)
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut RecordStatus> {
        self.records.iter_mut().find(|r| r.name == name)
    }
}

/// Thread-safe shared state handle
pub type StateHandle = Arc<RwLock<SharedState>>;

pub fn new_state_handle(record_names: Vec<String>) -> StateHandle {
    Arc::new(RwLock::new(SharedState::new(record_names)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn update(count: usize) -> TrendUpdate {
        TrendUpdate {
            record: "pv".to_string(),
            timestamp: DateTime::from_timestamp(0, 0).unwrap(),
            sample_count: count,
            estimates: Vec::new(),
        }
    }

    #[test]
    fn new_state_has_empty_statuses() {
        let state = SharedState::new(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(state.records.len(), 2);
        assert_eq!(state.records[0].scans, 0);
        assert!(state.records[0].last_update.is_none());
    }

    #[test]
    fn computed_cycle_updates_counts_and_keeps_update() {
        let mut state = SharedState::new(vec!["pv".to_string()]);
        state.record_computed("pv", update(4));
        let status = state.status("pv").unwrap();
        assert_eq!(status.scans, 1);
        assert_eq!(status.sample_count, 4);
        assert!(status.last_update.is_some());
    }

    #[test]
    fn skipped_cycle_keeps_previous_update() {
        let mut state = SharedState::new(vec!["pv".to_string()]);
        state.record_computed("pv", update(4));
        state.record_skipped("pv");
        let status = state.status("pv").unwrap();
        assert_eq!(status.scans, 2);
        assert_eq!(status.skipped, 1);
        assert_eq!(status.sample_count, 4);
        assert!(status.last_update.is_some());
    }

    #[test]
    fn rejects_accumulate_until_a_computed_cycle() {
        let mut state = SharedState::new(vec!["pv".to_string()]);
        assert_eq!(state.record_rejected("pv"), 1);
        assert_eq!(state.record_rejected("pv"), 2);
        state.record_computed("pv", update(1));
        assert_eq!(state.status("pv").unwrap().consecutive_rejects, 0);
    }

    #[test]
    fn unknown_record_is_ignored() {
        let mut state = SharedState::new(vec!["pv".to_string()]);
        assert_eq!(state.record_rejected("other"), 0);
        state.record_computed("other", update(1));
        assert!(state.status("other").is_none());
    }
}
