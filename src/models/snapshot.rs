//! Repository records and the parsed, read-only snapshot.
//!
//! [`SnapshotRecords`] mirrors the repository tables as stored (encoded
//! strings included). [`Snapshot`] is the validated, pre-parsed form the
//! model builder and extractor consume: every encoded set is resolved to
//! entity indices once, at load time.
//!
//! Entity order in the snapshot is the repository order and is preserved
//! through to the extracted grids.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use super::encoding::{parse_blackout, parse_id_set, parse_professor_eligibility, BlackoutSet};
use super::parameters::{ConstraintParameters, ParameterRecord};
use super::{Classroom, CourseUnit, Group, Professor};
use crate::error::{TimetableError, TimetableResult};
use crate::validation::{validate_records, ValidationError, ValidationErrorKind};

/// Classroom row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassroomRecord {
    pub id: String,
    pub capacity: i64,
}

/// Group row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: String,
    pub size: i64,
}

/// Professor row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessorRecord {
    pub id: String,
}

/// Course-unit row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseUnitRecord {
    pub id: String,
}

/// Unavailability row for a group or professor (`"Mon AM1 AM2;Fri PM2"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackoutRecord {
    pub owner: String,
    pub slots: String,
}

/// Room eligibility row for a course-unit (`"R1 R2"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomEligibilityRecord {
    pub course_unit: String,
    pub rooms: String,
}

/// Curriculum row for a group (`"U1 U2"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurriculumRecord {
    pub group: String,
    pub course_units: String,
}

/// Professor eligibility row (`"G1 U1 U2;G2 U3"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessorEligibilityRecord {
    pub professor: String,
    pub eligibility: String,
}

/// All repository tables for one cycle, as stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotRecords {
    pub classrooms: Vec<ClassroomRecord>,
    pub groups: Vec<GroupRecord>,
    pub professors: Vec<ProfessorRecord>,
    pub course_units: Vec<CourseUnitRecord>,
    pub group_blackouts: Vec<BlackoutRecord>,
    pub professor_blackouts: Vec<BlackoutRecord>,
    pub room_eligibility: Vec<RoomEligibilityRecord>,
    pub curricula: Vec<CurriculumRecord>,
    pub professor_eligibility: Vec<ProfessorEligibilityRecord>,
    pub parameters: Vec<ParameterRecord>,
}

impl SnapshotRecords {
    /// Creates an empty record set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classroom(mut self, id: impl Into<String>, capacity: i64) -> Self {
        self.classrooms.push(ClassroomRecord {
            id: id.into(),
            capacity,
        });
        self
    }

    pub fn with_group(mut self, id: impl Into<String>, size: i64) -> Self {
        self.groups.push(GroupRecord {
            id: id.into(),
            size,
        });
        self
    }

    pub fn with_professor(mut self, id: impl Into<String>) -> Self {
        self.professors.push(ProfessorRecord { id: id.into() });
        self
    }

    pub fn with_course_unit(mut self, id: impl Into<String>) -> Self {
        self.course_units.push(CourseUnitRecord { id: id.into() });
        self
    }

    /// Adds a group unavailability row.
    pub fn with_group_blackout(
        mut self,
        group: impl Into<String>,
        slots: impl Into<String>,
    ) -> Self {
        self.group_blackouts.push(BlackoutRecord {
            owner: group.into(),
            slots: slots.into(),
        });
        self
    }

    /// Adds a professor unavailability row.
    pub fn with_professor_blackout(
        mut self,
        professor: impl Into<String>,
        slots: impl Into<String>,
    ) -> Self {
        self.professor_blackouts.push(BlackoutRecord {
            owner: professor.into(),
            slots: slots.into(),
        });
        self
    }

    pub fn with_room_eligibility(
        mut self,
        course_unit: impl Into<String>,
        rooms: impl Into<String>,
    ) -> Self {
        self.room_eligibility.push(RoomEligibilityRecord {
            course_unit: course_unit.into(),
            rooms: rooms.into(),
        });
        self
    }

    pub fn with_curriculum(
        mut self,
        group: impl Into<String>,
        course_units: impl Into<String>,
    ) -> Self {
        self.curricula.push(CurriculumRecord {
            group: group.into(),
            course_units: course_units.into(),
        });
        self
    }

    pub fn with_professor_eligibility(
        mut self,
        professor: impl Into<String>,
        eligibility: impl Into<String>,
    ) -> Self {
        self.professor_eligibility.push(ProfessorEligibilityRecord {
            professor: professor.into(),
            eligibility: eligibility.into(),
        });
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: i64) -> Self {
        self.parameters.push(ParameterRecord::new(name, value));
        self
    }

    /// Replaces all parameter rows with the given resolved parameters.
    pub fn with_parameters(mut self, params: &ConstraintParameters) -> Self {
        self.parameters = params.to_records();
        self
    }
}

/// Parsed, validated, read-only snapshot of all entity data for one model.
///
/// Deserializes from [`SnapshotRecords`] through [`Snapshot::from_records`].
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "SnapshotRecords")]
pub struct Snapshot {
    classrooms: Vec<Classroom>,
    groups: Vec<Group>,
    professors: Vec<Professor>,
    course_units: Vec<CourseUnit>,
    /// Per group index.
    group_blackouts: Vec<BlackoutSet>,
    /// Per professor index.
    professor_blackouts: Vec<BlackoutSet>,
    /// Per course-unit index; `None` = no room restriction.
    room_eligibility: Vec<Option<BTreeSet<usize>>>,
    /// Per group index: course-unit indices.
    curricula: Vec<BTreeSet<usize>>,
    /// Per professor index: (group, course-unit) index pairs.
    professor_eligibility: Vec<BTreeSet<(usize, usize)>>,
    parameters: ConstraintParameters,
}

impl TryFrom<SnapshotRecords> for Snapshot {
    type Error = TimetableError;

    fn try_from(records: SnapshotRecords) -> TimetableResult<Self> {
        Self::from_records(&records)
    }
}

impl Snapshot {
    /// Validates and parses repository records.
    ///
    /// # Errors
    /// - `Validation` for structural issues (see [`validate_records`]) or
    ///   encoded references to unknown entities.
    /// - `MalformedEncoding` for the first record that fails to parse.
    /// - `MissingParameter` / `InvalidParameter` from parameter resolution.
    pub fn from_records(records: &SnapshotRecords) -> TimetableResult<Self> {
        validate_records(records).map_err(TimetableError::Validation)?;

        let classrooms: Vec<Classroom> = records
            .classrooms
            .iter()
            .map(|r| Classroom::new(&r.id, r.capacity as u32))
            .collect();
        let groups: Vec<Group> = records
            .groups
            .iter()
            .map(|r| Group::new(&r.id, r.size as u32))
            .collect();
        let professors: Vec<Professor> =
            records.professors.iter().map(|r| Professor::new(&r.id)).collect();
        let course_units: Vec<CourseUnit> =
            records.course_units.iter().map(|r| CourseUnit::new(&r.id)).collect();

        let room_index = index_by_id(classrooms.iter().map(|c| c.id.as_str()));
        let group_index = index_by_id(groups.iter().map(|g| g.id.as_str()));
        let prof_index = index_by_id(professors.iter().map(|p| p.id.as_str()));
        let unit_index = index_by_id(course_units.iter().map(|u| u.id.as_str()));

        let mut unresolved: Vec<ValidationError> = Vec::new();

        let mut group_blackouts = vec![BlackoutSet::new(); groups.len()];
        for record in &records.group_blackouts {
            let set = parse_blackout(&record.owner, &record.slots)?;
            group_blackouts[group_index[record.owner.as_str()]].union_with(&set);
        }

        let mut professor_blackouts = vec![BlackoutSet::new(); professors.len()];
        for record in &records.professor_blackouts {
            let set = parse_blackout(&record.owner, &record.slots)?;
            professor_blackouts[prof_index[record.owner.as_str()]].union_with(&set);
        }

        let mut room_eligibility: Vec<Option<BTreeSet<usize>>> = vec![None; course_units.len()];
        for record in &records.room_eligibility {
            let ids = parse_id_set(&record.course_unit, "room eligibility", &record.rooms)?;
            let rooms = room_eligibility[unit_index[record.course_unit.as_str()]]
                .get_or_insert_with(BTreeSet::new);
            for id in &ids {
                match room_index.get(id.as_str()) {
                    Some(&r) => {
                        rooms.insert(r);
                    }
                    None => unresolved.push(unknown_reference(
                        "room eligibility",
                        &record.course_unit,
                        "classroom",
                        id,
                    )),
                }
            }
        }

        let mut curricula = vec![BTreeSet::new(); groups.len()];
        for record in &records.curricula {
            let ids = parse_id_set(&record.group, "curriculum", &record.course_units)?;
            let units = &mut curricula[group_index[record.group.as_str()]];
            for id in &ids {
                match unit_index.get(id.as_str()) {
                    Some(&u) => {
                        units.insert(u);
                    }
                    None => unresolved.push(unknown_reference(
                        "curriculum",
                        &record.group,
                        "course-unit",
                        id,
                    )),
                }
            }
        }

        let mut professor_eligibility = vec![BTreeSet::new(); professors.len()];
        for record in &records.professor_eligibility {
            let pairs = parse_professor_eligibility(&record.professor, &record.eligibility)?;
            let allowed = &mut professor_eligibility[prof_index[record.professor.as_str()]];
            for (group_id, unit_id) in &pairs {
                let g = group_index.get(group_id.as_str());
                let u = unit_index.get(unit_id.as_str());
                if g.is_none() {
                    unresolved.push(unknown_reference(
                        "professor eligibility",
                        &record.professor,
                        "group",
                        group_id,
                    ));
                }
                if u.is_none() {
                    unresolved.push(unknown_reference(
                        "professor eligibility",
                        &record.professor,
                        "course-unit",
                        unit_id,
                    ));
                }
                if let (Some(&g), Some(&u)) = (g, u) {
                    allowed.insert((g, u));
                }
            }
        }

        if !unresolved.is_empty() {
            return Err(TimetableError::Validation(unresolved));
        }

        let parameters = ConstraintParameters::from_records(&records.parameters)?;

        Ok(Self {
            classrooms,
            groups,
            professors,
            course_units,
            group_blackouts,
            professor_blackouts,
            room_eligibility,
            curricula,
            professor_eligibility,
            parameters,
        })
    }

    pub fn classrooms(&self) -> &[Classroom] {
        &self.classrooms
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn professors(&self) -> &[Professor] {
        &self.professors
    }

    pub fn course_units(&self) -> &[CourseUnit] {
        &self.course_units
    }

    pub fn parameters(&self) -> &ConstraintParameters {
        &self.parameters
    }

    /// Blackout slots of the group at `group`.
    pub fn group_blackout(&self, group: usize) -> &BlackoutSet {
        &self.group_blackouts[group]
    }

    /// Blackout slots of the professor at `professor`.
    pub fn professor_blackout(&self, professor: usize) -> &BlackoutSet {
        &self.professor_blackouts[professor]
    }

    /// Eligible rooms for a course-unit, or `None` when unrestricted.
    pub fn eligible_rooms(&self, course_unit: usize) -> Option<&BTreeSet<usize>> {
        self.room_eligibility[course_unit].as_ref()
    }

    /// Whether `classroom` may host `course_unit`.
    pub fn is_room_eligible(&self, course_unit: usize, classroom: usize) -> bool {
        self.eligible_rooms(course_unit)
            .map_or(true, |rooms| rooms.contains(&classroom))
    }

    /// Course-units in the curriculum of `group`.
    pub fn curriculum(&self, group: usize) -> &BTreeSet<usize> {
        &self.curricula[group]
    }

    pub fn in_curriculum(&self, group: usize, course_unit: usize) -> bool {
        self.curricula[group].contains(&course_unit)
    }

    /// Whether `professor` may teach `course_unit` to `group`.
    pub fn is_professor_eligible(
        &self,
        professor: usize,
        group: usize,
        course_unit: usize,
    ) -> bool {
        self.professor_eligibility[professor].contains(&(group, course_unit))
    }
}

fn index_by_id<'a>(ids: impl Iterator<Item = &'a str>) -> HashMap<&'a str, usize> {
    ids.enumerate().map(|(i, id)| (id, i)).collect()
}

fn unknown_reference(
    record_kind: &str,
    owner: &str,
    target_kind: &str,
    id: &str,
) -> ValidationError {
    ValidationError::new(
        ValidationErrorKind::UnknownReference,
        format!("{record_kind} of '{owner}' references unknown {target_kind} '{id}'"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Block, Day, TimeSlot};

    fn base_records() -> SnapshotRecords {
        SnapshotRecords::new()
            .with_classroom("R1", 25)
            .with_classroom("LAB", 20)
            .with_group("G1", 20)
            .with_group("G2", 30)
            .with_professor("P1")
            .with_professor("P2")
            .with_course_unit("U1")
            .with_course_unit("U2")
            .with_parameter("C1", 2)
            .with_parameter("C2", 15)
            .with_parameter("C3", 3)
            .with_parameter("C4", 1)
            .with_parameter("C5", 1)
    }

    #[test]
    fn test_parse_full_snapshot() {
        let records = base_records()
            .with_group_blackout("G1", "Mon AM1")
            .with_group_blackout("G1", "Tue PM2")
            .with_professor_blackout("P2", "Sat AM1 AM2")
            .with_room_eligibility("U2", "LAB")
            .with_curriculum("G1", "U1 U2")
            .with_curriculum("G2", "U1")
            .with_professor_eligibility("P1", "G1 U1;G2 U1")
            .with_professor_eligibility("P2", "G1 U2");

        let snap = Snapshot::from_records(&records).unwrap();
        assert_eq!(snap.groups().len(), 2);
        assert_eq!(snap.group_blackout(0).len(), 2);
        assert!(snap.group_blackout(0).contains(TimeSlot::new(Day::Tue, Block::PM2)));
        assert!(snap.group_blackout(1).is_empty());
        assert_eq!(snap.professor_blackout(1).len(), 2);

        assert!(snap.is_room_eligible(0, 0));
        assert!(snap.is_room_eligible(0, 1));
        assert!(!snap.is_room_eligible(1, 0));
        assert!(snap.is_room_eligible(1, 1));

        assert!(snap.in_curriculum(0, 1));
        assert!(!snap.in_curriculum(1, 1));

        assert!(snap.is_professor_eligible(0, 1, 0));
        assert!(!snap.is_professor_eligible(0, 0, 1));
        assert!(snap.is_professor_eligible(1, 0, 1));
        assert!(snap.parameters().enforce_room_capacity);
    }

    #[test]
    fn test_entity_order_preserved() {
        let records = base_records().with_group("A0", 5);
        let snap = Snapshot::from_records(&records).unwrap();
        let ids: Vec<&str> = snap.groups().iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["G1", "G2", "A0"]);
    }

    #[test]
    fn test_malformed_blackout_aborts() {
        let records = base_records().with_professor_blackout("P1", "Mon AM1;Funday AM2");
        let err = Snapshot::from_records(&records).unwrap_err();
        assert!(matches!(err, TimetableError::MalformedEncoding { .. }));
    }

    #[test]
    fn test_unknown_encoded_reference() {
        let records = base_records()
            .with_curriculum("G1", "U1 U7")
            .with_professor_eligibility("P1", "G9 U1");
        let err = Snapshot::from_records(&records).unwrap_err();
        match err {
            TimetableError::Validation(errors) => {
                assert_eq!(errors.len(), 2);
                assert!(errors.iter().all(|e| e.kind == ValidationErrorKind::UnknownReference));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_parameter_is_fatal() {
        let mut records = base_records();
        records.parameters.retain(|p| p.name != "C2");
        let err = Snapshot::from_records(&records).unwrap_err();
        assert!(matches!(err, TimetableError::MissingParameter(ref n) if n == "C2"));
    }

    #[test]
    fn test_empty_room_eligibility_record_restricts_everything() {
        let records = base_records().with_room_eligibility("U1", "");
        let snap = Snapshot::from_records(&records).unwrap();
        assert!(!snap.is_room_eligible(0, 0));
        assert!(!snap.is_room_eligible(0, 1));
    }

    #[test]
    fn test_records_json_roundtrip() {
        let records = base_records().with_curriculum("G1", "U1");
        let json = serde_json::to_string(&records).unwrap();
        let back: SnapshotRecords = serde_json::from_str(&json).unwrap();
        assert_eq!(back, records);

        let partial: SnapshotRecords =
            serde_json::from_str(r#"{"groups":[{"id":"G1","size":10}]}"#).unwrap();
        assert_eq!(partial.groups.len(), 1);
        assert!(partial.classrooms.is_empty());
    }

    #[test]
    fn test_deserialize_snapshot_validates_records() {
        let json = serde_json::to_string(&base_records().with_curriculum("G1", "U1")).unwrap();
        let snap: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snap.groups().len(), 2);
        assert_eq!(snap.classrooms().len(), 2);

        let malformed = base_records().with_group_blackout("G1", "Sun AM1");
        let bad = serde_json::to_string(&malformed).unwrap();
        assert!(serde_json::from_str::<Snapshot>(&bad).is_err());

        let missing_params = r#"{"classrooms":[{"id":"R1","capacity":10}]}"#;
        assert!(serde_json::from_str::<Snapshot>(missing_params).is_err());
    }
}
