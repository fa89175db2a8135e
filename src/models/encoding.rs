//! Parsers for the delimited set encodings stored in the repository.
//!
//! # Formats
//!
//! | Record | Encoding | Example |
//! |--------|----------|---------|
//! | Blackout | `<day> <block>...` groups separated by `;` | `"Mon AM1 AM2;Fri PM2"` |
//! | Id set | ids separated by whitespace and/or `;` | `"R1 R2;R3"` |
//! | Professor eligibility | `<group> <uc>...` groups separated by `;` | `"G1 U1 U2;G2 U3"` |
//!
//! Empty strings (and empty `;`-separated groups) encode nothing. Any other
//! deviation is a malformed record and aborts the cycle; records are never
//! silently dropped.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Block, Day, TimeSlot};
use crate::error::{TimetableError, TimetableResult};

const GROUP_SEPARATOR: char = ';';

/// A set of blacked-out time slots.
///
/// Stored as a 24-bit mask in day-major slot order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlackoutSet {
    mask: u32,
}

impl BlackoutSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from slots.
    pub fn from_slots(slots: impl IntoIterator<Item = TimeSlot>) -> Self {
        let mut set = Self::new();
        for slot in slots {
            set.insert(slot);
        }
        set
    }

    pub fn insert(&mut self, slot: TimeSlot) {
        self.mask |= 1 << slot.index();
    }

    #[inline]
    pub fn contains(&self, slot: TimeSlot) -> bool {
        self.mask & (1 << slot.index()) != 0
    }

    /// Merges another set into this one.
    pub fn union_with(&mut self, other: &BlackoutSet) {
        self.mask |= other.mask;
    }

    pub fn len(&self) -> usize {
        self.mask.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    /// Blacked-out slots in day-major order.
    pub fn slots(&self) -> impl Iterator<Item = TimeSlot> + '_ {
        TimeSlot::all().filter(move |s| self.contains(*s))
    }
}

impl fmt::Display for BlackoutSet {
    /// Renders in the repository encoding (`"Mon AM1 AM2;Fri PM2"`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for day in Day::ALL {
            let blocks: Vec<&str> = Block::ALL
                .iter()
                .filter(|b| self.contains(TimeSlot::new(day, **b)))
                .map(|b| b.as_str())
                .collect();
            if blocks.is_empty() {
                continue;
            }
            if !first {
                write!(f, "{GROUP_SEPARATOR}")?;
            }
            write!(f, "{} {}", day, blocks.join(" "))?;
            first = false;
        }
        Ok(())
    }
}

/// Parses a blackout encoding for `entity`.
///
/// Each `;`-group starts with a day followed by at least one block.
pub fn parse_blackout(entity: &str, encoded: &str) -> TimetableResult<BlackoutSet> {
    let mut set = BlackoutSet::new();

    for group in non_empty_groups(encoded) {
        let mut tokens = group.split_whitespace();
        let day_token = tokens.next().unwrap_or_default();
        let day: Day = day_token
            .parse()
            .map_err(|e: String| TimetableError::malformed(entity, "blackout", e))?;

        let mut any_block = false;
        for token in tokens {
            let block: Block = token
                .parse()
                .map_err(|e: String| TimetableError::malformed(entity, "blackout", e))?;
            set.insert(TimeSlot::new(day, block));
            any_block = true;
        }

        if !any_block {
            return Err(TimetableError::malformed(
                entity,
                "blackout",
                format!("day '{day}' lists no blocks"),
            ));
        }
    }

    Ok(set)
}

/// Parses an id-set encoding (whitespace and/or `;` separated).
///
/// Duplicates are removed; first-seen order is kept.
pub fn parse_id_set(
    entity: &str,
    field: &'static str,
    encoded: &str,
) -> TimetableResult<Vec<String>> {
    let mut ids: Vec<String> = Vec::new();

    for token in encoded.split(|c: char| c == GROUP_SEPARATOR || c.is_whitespace()) {
        if token.is_empty() {
            continue;
        }
        if !is_valid_id(token) {
            return Err(TimetableError::malformed(
                entity,
                field,
                format!("invalid id token '{token}'"),
            ));
        }
        if !ids.iter().any(|existing| existing == token) {
            ids.push(token.to_string());
        }
    }

    Ok(ids)
}

/// Parses a professor eligibility encoding into `(group, course-unit)` pairs.
///
/// Each `;`-group starts with a group id followed by at least one course-unit id.
pub fn parse_professor_eligibility(
    entity: &str,
    encoded: &str,
) -> TimetableResult<Vec<(String, String)>> {
    let mut pairs: Vec<(String, String)> = Vec::new();

    for group in non_empty_groups(encoded) {
        let mut tokens = group.split_whitespace();
        let group_id = tokens.next().unwrap_or_default();
        if !is_valid_id(group_id) {
            return Err(TimetableError::malformed(
                entity,
                "professor eligibility",
                format!("invalid group id '{group_id}'"),
            ));
        }

        let mut any_unit = false;
        for unit in tokens {
            if !is_valid_id(unit) {
                return Err(TimetableError::malformed(
                    entity,
                    "professor eligibility",
                    format!("invalid course-unit id '{unit}'"),
                ));
            }
            let pair = (group_id.to_string(), unit.to_string());
            if !pairs.contains(&pair) {
                pairs.push(pair);
            }
            any_unit = true;
        }

        if !any_unit {
            return Err(TimetableError::malformed(
                entity,
                "professor eligibility",
                format!("group '{group_id}' lists no course-units"),
            ));
        }
    }

    Ok(pairs)
}

/// `;`-separated groups with surrounding whitespace trimmed, empty ones skipped.
fn non_empty_groups(encoded: &str) -> impl Iterator<Item = &str> {
    encoded
        .split(GROUP_SEPARATOR)
        .map(str::trim)
        .filter(|g| !g.is_empty())
}

fn is_valid_id(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| !c.is_control())
}
