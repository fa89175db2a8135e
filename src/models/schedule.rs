//! Timetable (solution) model.
//!
//! A [`ScheduleReport`] holds one weekly grid per group and one per
//! professor. Grid rows are blocks, columns are days, and each cell lists
//! the bookings held in that slot.
//!
//! A well-formed solution has at most one booking per cell; grids never
//! assume that and keep every concurrent booking.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Block, Day, TimeSlot};

/// One lesson as seen from a group or professor.
///
/// `counterpart` is the professor in a group grid and the group in a
/// professor grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Booking {
    pub course_unit: String,
    pub classroom: String,
    pub counterpart: String,
}

impl Booking {
    pub fn new(
        course_unit: impl Into<String>,
        classroom: impl Into<String>,
        counterpart: impl Into<String>,
    ) -> Self {
        Self {
            course_unit: course_unit.into(),
            classroom: classroom.into(),
            counterpart: counterpart.into(),
        }
    }
}

impl fmt::Display for Booking {
    /// `course-unit-classroom-counterpart`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.course_unit, self.classroom, self.counterpart)
    }
}

/// A week of bookings: `cells[block][day]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyGrid {
    cells: Vec<Vec<Vec<Booking>>>,
}

impl Default for WeeklyGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl WeeklyGrid {
    /// Creates an empty grid.
    pub fn new() -> Self {
        Self {
            cells: vec![vec![Vec::new(); Day::COUNT]; Block::COUNT],
        }
    }

    /// Bookings in a slot.
    pub fn cell(&self, slot: TimeSlot) -> &[Booking] {
        &self.cells[slot.block.index()][slot.day.index()]
    }

    /// Appends a booking to a slot.
    pub fn push(&mut self, slot: TimeSlot, booking: Booking) {
        self.cells[slot.block.index()][slot.day.index()].push(booking);
    }

    /// Cell text: bookings joined with `,` (empty string for a free slot).
    pub fn cell_text(&self, slot: TimeSlot) -> String {
        self.cell(slot)
            .iter()
            .map(|b| b.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Total bookings in the week.
    pub fn booking_count(&self) -> usize {
        self.cells.iter().flatten().map(Vec::len).sum()
    }

    /// Slots holding more than one booking.
    pub fn conflicts(&self) -> Vec<TimeSlot> {
        TimeSlot::all().filter(|s| self.cell(*s).len() > 1).collect()
    }

    /// Tabular form: header `Block, Mon..Sat`, then one row per block.
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        let mut rows = Vec::with_capacity(Block::COUNT + 1);
        let mut header = vec!["Block".to_string()];
        header.extend(Day::ALL.iter().map(|d| d.to_string()));
        rows.push(header);

        for block in Block::ALL {
            let mut row = vec![block.to_string()];
            row.extend(
                Day::ALL
                    .iter()
                    .map(|&day| self.cell_text(TimeSlot::new(day, block))),
            );
            rows.push(row);
        }
        rows
    }
}

impl fmt::Display for WeeklyGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.to_rows();
        let widths: Vec<usize> = (0..rows[0].len())
            .map(|c| rows.iter().map(|r| r[c].len()).max().unwrap_or(0))
            .collect();
        for row in &rows {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, &w)| format!("{cell:<w$}"))
                .collect();
            writeln!(f, "{}", line.join(" | ").trim_end())?;
        }
        Ok(())
    }
}

/// The weekly grid of one group or professor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTimetable {
    pub entity_id: String,
    pub grid: WeeklyGrid,
}

/// Extracted timetables for both audiences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleReport {
    /// One entry per group, in snapshot order.
    pub groups: Vec<EntityTimetable>,
    /// One entry per professor, in snapshot order.
    pub professors: Vec<EntityTimetable>,
    /// Objective value reported by the solver, when known.
    pub objective_value: Option<f64>,
}

impl ScheduleReport {
    pub fn group(&self, id: &str) -> Option<&EntityTimetable> {
        self.groups.iter().find(|t| t.entity_id == id)
    }

    pub fn professor(&self, id: &str) -> Option<&EntityTimetable> {
        self.professors.iter().find(|t| t.entity_id == id)
    }

    /// Number of lessons (counted from the group side).
    pub fn lesson_count(&self) -> usize {
        self.groups.iter().map(|t| t.grid.booking_count()).sum()
    }

    /// Whether any grid cell holds concurrent bookings.
    pub fn has_conflicts(&self) -> bool {
        self.groups
            .iter()
            .chain(&self.professors)
            .any(|t| !t.grid.conflicts().is_empty())
    }
}
