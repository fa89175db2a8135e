//! Entity repository.
//!
//! The scheduler reads one [`SnapshotRecords`] per cycle through
//! [`EntityRepository`]. Per-table accessors default to slicing the
//! snapshot, so a backend only has to provide `snapshot`.

use parking_lot::RwLock;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::TimetableResult;
use crate::models::{
    BlackoutRecord, ClassroomRecord, CourseUnitRecord, CurriculumRecord, GroupRecord,
    ParameterRecord, ProfessorEligibilityRecord, ProfessorRecord, RoomEligibilityRecord,
    SnapshotRecords,
};

/// Read access to the timetabling tables.
///
/// Empty tables yield empty lists.
pub trait EntityRepository: Send + Sync {
    /// Point-in-time copy of every table.
    fn snapshot(&self) -> TimetableResult<SnapshotRecords>;

    fn classrooms(&self) -> TimetableResult<Vec<ClassroomRecord>> {
        Ok(self.snapshot()?.classrooms)
    }

    fn groups(&self) -> TimetableResult<Vec<GroupRecord>> {
        Ok(self.snapshot()?.groups)
    }

    fn professors(&self) -> TimetableResult<Vec<ProfessorRecord>> {
        Ok(self.snapshot()?.professors)
    }

    fn course_units(&self) -> TimetableResult<Vec<CourseUnitRecord>> {
        Ok(self.snapshot()?.course_units)
    }

    fn group_blackouts(&self) -> TimetableResult<Vec<BlackoutRecord>> {
        Ok(self.snapshot()?.group_blackouts)
    }

    fn professor_blackouts(&self) -> TimetableResult<Vec<BlackoutRecord>> {
        Ok(self.snapshot()?.professor_blackouts)
    }

    fn room_eligibility(&self) -> TimetableResult<Vec<RoomEligibilityRecord>> {
        Ok(self.snapshot()?.room_eligibility)
    }

    fn curricula(&self) -> TimetableResult<Vec<CurriculumRecord>> {
        Ok(self.snapshot()?.curricula)
    }

    fn professor_eligibility(&self) -> TimetableResult<Vec<ProfessorEligibilityRecord>> {
        Ok(self.snapshot()?.professor_eligibility)
    }

    fn parameters(&self) -> TimetableResult<Vec<ParameterRecord>> {
        Ok(self.snapshot()?.parameters)
    }
}

/// In-memory repository, loadable from and savable to JSON.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    records: Arc<RwLock<SnapshotRecords>>,
}

impl MemoryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: SnapshotRecords) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Loads records from a JSON file.
    ///
    /// # Errors
    /// `Io` if the file cannot be read, `Json` if it is not valid records.
    pub fn load_json<P: AsRef<Path>>(path: P) -> TimetableResult<Self> {
        let content = fs::read_to_string(path)?;
        let records: SnapshotRecords = serde_json::from_str(&content)?;
        Ok(Self::from_records(records))
    }

    /// Writes the current records to a JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> TimetableResult<()> {
        let content = serde_json::to_string_pretty(&*self.records.read())?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Replaces all records. Snapshots taken earlier are unaffected.
    pub fn replace(&self, records: SnapshotRecords) {
        *self.records.write() = records;
    }

    /// Applies an in-place edit to the records.
    pub fn update(&self, edit: impl FnOnce(&mut SnapshotRecords)) {
        edit(&mut self.records.write());
    }
}

impl EntityRepository for MemoryRepository {
    fn snapshot(&self) -> TimetableResult<SnapshotRecords> {
        Ok(self.records.read().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> SnapshotRecords {
        SnapshotRecords::new()
            .with_classroom("R1", 30)
            .with_group("G1", 20)
            .with_curriculum("G1", "U1")
            .with_parameter("C1", 2)
    }

    #[test]
    fn test_empty_repository() {
        let repo = MemoryRepository::new();
        assert!(repo.classrooms().unwrap().is_empty());
        assert!(repo.parameters().unwrap().is_empty());
    }

    #[test]
    fn test_table_accessors() {
        let repo = MemoryRepository::from_records(records());
        assert_eq!(repo.classrooms().unwrap().len(), 1);
        assert_eq!(repo.curricula().unwrap()[0].course_units, "U1");
        assert!(repo.professor_blackouts().unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let repo = MemoryRepository::from_records(records());
        let before = repo.snapshot().unwrap();
        repo.update(|r| r.groups.clear());
        assert_eq!(before.groups.len(), 1);
        assert!(repo.groups().unwrap().is_empty());
    }

    #[test]
    fn test_json_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        MemoryRepository::from_records(records()).save_json(&path).unwrap();
        let loaded = MemoryRepository::load_json(&path).unwrap();
        assert_eq!(loaded.snapshot().unwrap(), records());
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = MemoryRepository::load_json(&path).unwrap_err();
        assert!(matches!(err, crate::error::TimetableError::Json(_)));
    }
}
