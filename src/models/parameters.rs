//! Named constraint parameters.
//!
//! The repository stores the tunable limits as `(name, value)` rows:
//!
//! | Name | Meaning | Required |
//! |------|---------|----------|
//! | `C1` | Max lessons of one course-unit per group per week | yes |
//! | `C2` | Max weekly lessons per professor | yes |
//! | `C3` | Max daily lessons per professor | yes |
//! | `C4` | Toggle: no repeat of a course-unit on the same day | yes |
//! | `C5` | Toggle: enforce room-capacity fit | yes |
//! | `C6` | Min lessons of each curriculum course-unit per group per week | no |
//!
//! Toggles take `0` (off) or `1` (on).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{TimetableError, TimetableResult};

pub const MAX_LESSONS_PER_COURSE_UNIT: &str = "C1";
pub const MAX_WEEKLY_LESSONS_PER_PROFESSOR: &str = "C2";
pub const MAX_DAILY_LESSONS_PER_PROFESSOR: &str = "C3";
pub const NO_REPEAT_SAME_DAY: &str = "C4";
pub const ENFORCE_ROOM_CAPACITY: &str = "C5";
pub const MIN_LESSONS_PER_COURSE_UNIT: &str = "C6";

/// A raw `(name, value)` parameter row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterRecord {
    pub name: String,
    pub value: i64,
}

impl ParameterRecord {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Resolved constraint parameters for one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintParameters {
    /// `C1`: weekly cap per (group, course-unit).
    pub max_lessons_per_course_unit: u32,
    /// `C2`: weekly cap per professor.
    pub max_weekly_lessons_per_professor: u32,
    /// `C3`: daily cap per professor.
    pub max_daily_lessons_per_professor: u32,
    /// `C4`: at most one lesson of a course-unit per group per day.
    pub no_repeat_same_day: bool,
    /// `C5`: forbid rooms smaller than the group.
    pub enforce_room_capacity: bool,
    /// `C6`: weekly floor per (group, curriculum course-unit).
    pub min_lessons_per_course_unit: Option<u32>,
}

impl ConstraintParameters {
    /// Resolves parameters from repository rows.
    ///
    /// Later rows with the same name override earlier ones.
    ///
    /// # Errors
    /// - `MissingParameter` if any of `C1`..`C5` is absent.
    /// - `InvalidParameter` for negative limits or toggles outside `{0, 1}`.
    pub fn from_records(records: &[ParameterRecord]) -> TimetableResult<Self> {
        let values: HashMap<&str, i64> = records
            .iter()
            .map(|r| (r.name.trim(), r.value))
            .collect();

        let min_lessons = match values.get(MIN_LESSONS_PER_COURSE_UNIT) {
            Some(&v) => Some(limit(MIN_LESSONS_PER_COURSE_UNIT, v)?),
            None => None,
        };

        let params = Self {
            max_lessons_per_course_unit: limit(
                MAX_LESSONS_PER_COURSE_UNIT,
                required(&values, MAX_LESSONS_PER_COURSE_UNIT)?,
            )?,
            max_weekly_lessons_per_professor: limit(
                MAX_WEEKLY_LESSONS_PER_PROFESSOR,
                required(&values, MAX_WEEKLY_LESSONS_PER_PROFESSOR)?,
            )?,
            max_daily_lessons_per_professor: limit(
                MAX_DAILY_LESSONS_PER_PROFESSOR,
                required(&values, MAX_DAILY_LESSONS_PER_PROFESSOR)?,
            )?,
            no_repeat_same_day: toggle(NO_REPEAT_SAME_DAY, required(&values, NO_REPEAT_SAME_DAY)?)?,
            enforce_room_capacity: toggle(
                ENFORCE_ROOM_CAPACITY,
                required(&values, ENFORCE_ROOM_CAPACITY)?,
            )?,
            min_lessons_per_course_unit: min_lessons,
        };

        Ok(params)
    }

    /// Renders back to repository rows (`C6` only when set).
    pub fn to_records(&self) -> Vec<ParameterRecord> {
        let mut rows = vec![
            ParameterRecord::new(
                MAX_LESSONS_PER_COURSE_UNIT,
                self.max_lessons_per_course_unit as i64,
            ),
            ParameterRecord::new(
                MAX_WEEKLY_LESSONS_PER_PROFESSOR,
                self.max_weekly_lessons_per_professor as i64,
            ),
            ParameterRecord::new(
                MAX_DAILY_LESSONS_PER_PROFESSOR,
                self.max_daily_lessons_per_professor as i64,
            ),
            ParameterRecord::new(NO_REPEAT_SAME_DAY, self.no_repeat_same_day as i64),
            ParameterRecord::new(ENFORCE_ROOM_CAPACITY, self.enforce_room_capacity as i64),
        ];
        if let Some(min) = self.min_lessons_per_course_unit {
            rows.push(ParameterRecord::new(MIN_LESSONS_PER_COURSE_UNIT, min as i64));
        }
        rows
    }
}

fn required(values: &HashMap<&str, i64>, name: &str) -> TimetableResult<i64> {
    values
        .get(name)
        .copied()
        .ok_or_else(|| TimetableError::MissingParameter(name.to_string()))
}

fn limit(name: &str, value: i64) -> TimetableResult<u32> {
    u32::try_from(value).map_err(|_| TimetableError::InvalidParameter {
        name: name.to_string(),
        value,
        message: "expected a non-negative lesson count".into(),
    })
}

fn toggle(name: &str, value: i64) -> TimetableResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(TimetableError::InvalidParameter {
            name: name.to_string(),
            value,
            message: "expected 0 (off) or 1 (on)".into(),
        }),
    }
}
