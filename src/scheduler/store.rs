//! Versioned schedule releases.
//!
//! Each successful cycle publishes an immutable [`ScheduleRelease`].
//! Readers hold `Arc` handles, so a release they are reading is never
//! mutated or dropped by a later publish.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::SystemTime;

use crate::models::ScheduleReport;

/// One published schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRelease {
    /// Starts at 1 and increases by one per publish.
    pub version: u64,
    pub published_at: SystemTime,
    pub report: ScheduleReport,
}

/// Holds the latest release.
#[derive(Debug, Clone, Default)]
pub struct ScheduleStore {
    latest: Arc<RwLock<Option<Arc<ScheduleRelease>>>>,
}

impl ScheduleStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a report as the next version.
    pub fn publish(&self, report: ScheduleReport) -> Arc<ScheduleRelease> {
        let mut latest = self.latest.write();
        let version = latest.as_ref().map_or(1, |r| r.version + 1);
        let release = Arc::new(ScheduleRelease {
            version,
            published_at: SystemTime::now(),
            report,
        });
        *latest = Some(Arc::clone(&release));
        release
    }

    /// The latest release, if any.
    pub fn latest(&self) -> Option<Arc<ScheduleRelease>> {
        self.latest.read().clone()
    }

    /// Version of the latest release (0 when nothing is published).
    pub fn version(&self) -> u64 {
        self.latest.read().as_ref().map_or(0, |r| r.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(objective: f64) -> ScheduleReport {
        ScheduleReport {
            objective_value: Some(objective),
            ..ScheduleReport::default()
        }
    }

    #[test]
    fn test_empty_store() {
        let store = ScheduleStore::new();
        assert!(store.latest().is_none());
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn test_versions_increase() {
        let store = ScheduleStore::new();
        assert_eq!(store.publish(report(1.0)).version, 1);
        assert_eq!(store.publish(report(2.0)).version, 2);
        assert_eq!(store.version(), 2);
        assert_eq!(store.latest().unwrap().report.objective_value, Some(2.0));
    }

    #[test]
    fn test_reader_handle_survives_publish() {
        let store = ScheduleStore::new();
        store.publish(report(1.0));
        let held = store.latest().unwrap();
        store.publish(report(2.0));
        assert_eq!(held.version, 1);
        assert_eq!(held.report.objective_value, Some(1.0));
    }

    #[test]
    fn test_clones_share_releases() {
        let store = ScheduleStore::new();
        let reader = store.clone();
        let handle = std::thread::spawn(move || store.publish(report(3.0)).version);
        assert_eq!(handle.join().unwrap(), 1);
        assert_eq!(reader.version(), 1);
    }
}
