//! Input validation for timetabling snapshots.
//!
//! Checks structural integrity of repository records before any encoding
//! is parsed or any model is built. Detects:
//! - Duplicate or blank entity IDs
//! - Non-positive classroom capacities and group sizes
//! - Relation records owned by unknown entities
//!
//! All issues are collected so a single report covers the whole snapshot.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::SnapshotRecords;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Two entities of the same kind share an ID.
    DuplicateId,
    /// An entity ID is empty or whitespace.
    BlankId,
    /// A classroom capacity or group size is zero, negative, or too large.
    NonPositiveSize,
    /// A record references an entity that doesn't exist.
    UnknownReference,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Validates repository records for one snapshot.
///
/// Checks:
/// 1. Entity IDs are non-blank and unique per kind
/// 2. Classroom capacities and group sizes are positive and fit in `u32`
/// 3. Blackout, eligibility, and curriculum records are owned by known entities
///
/// References *inside* encoded strings are checked after parsing, by
/// [`Snapshot::from_records`](crate::models::Snapshot::from_records).
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_records(records: &SnapshotRecords) -> ValidationResult {
    let mut errors = Vec::new();

    collect_ids("classroom", records.classrooms.iter().map(|r| r.id.as_str()), &mut errors);
    let groups = collect_ids("group", records.groups.iter().map(|r| r.id.as_str()), &mut errors);
    let profs = collect_ids(
        "professor",
        records.professors.iter().map(|r| r.id.as_str()),
        &mut errors,
    );
    let units = collect_ids(
        "course-unit",
        records.course_units.iter().map(|r| r.id.as_str()),
        &mut errors,
    );

    for room in &records.classrooms {
        if room.capacity <= 0 || room.capacity > u32::MAX as i64 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveSize,
                format!("Classroom '{}' has capacity {}", room.id, room.capacity),
            ));
        }
    }

    for group in &records.groups {
        if group.size <= 0 || group.size > u32::MAX as i64 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveSize,
                format!("Group '{}' has size {}", group.id, group.size),
            ));
        }
    }

    for record in &records.group_blackouts {
        check_owner("group blackout", &record.owner, &groups, &mut errors);
    }
    for record in &records.professor_blackouts {
        check_owner("professor blackout", &record.owner, &profs, &mut errors);
    }
    for record in &records.room_eligibility {
        check_owner("room eligibility", &record.course_unit, &units, &mut errors);
    }
    for record in &records.curricula {
        check_owner("curriculum", &record.group, &groups, &mut errors);
    }
    for record in &records.professor_eligibility {
        check_owner("professor eligibility", &record.professor, &profs, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn collect_ids<'a>(
    kind: &str,
    ids: impl Iterator<Item = &'a str>,
    errors: &mut Vec<ValidationError>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::BlankId,
                format!("Blank {kind} ID"),
            ));
            continue;
        }
        if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {kind} ID: {id}"),
            ));
        }
    }
    seen
}

fn check_owner(
    record_kind: &str,
    owner: &str,
    known: &HashSet<&str>,
    errors: &mut Vec<ValidationError>,
) {
    if !known.contains(owner) {
        errors.push(ValidationError::new(
            ValidationErrorKind::UnknownReference,
            format!("{record_kind} record references unknown entity '{owner}'"),
        ));
    }
}
