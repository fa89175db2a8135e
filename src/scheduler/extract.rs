//! Schedule extraction.
//!
//! Turns a solver assignment into one weekly grid per group and one per
//! professor. Extraction is pure: the same snapshot and assignment always
//! yield the same report.

use log::warn;

use crate::error::TimetableResult;
use crate::milp::{Assignment, Dimensions};
use crate::models::{Booking, EntityTimetable, ScheduleReport, Snapshot, WeeklyGrid};

/// Builds timetables from an assignment over a snapshot's domain.
///
/// Within a cell, bookings are ordered by classroom, then counterpart,
/// then course-unit, each in snapshot order.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleExtractor<'a> {
    snapshot: &'a Snapshot,
    dims: Dimensions,
}

impl<'a> ScheduleExtractor<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            snapshot,
            dims: Dimensions::of_snapshot(snapshot),
        }
    }

    /// Extracts group and professor timetables.
    ///
    /// Concurrent bookings in one cell are kept and logged.
    ///
    /// # Errors
    /// `DomainMismatch` if the assignment does not cover the snapshot's domain.
    pub fn extract(&self, assignment: &Assignment) -> TimetableResult<ScheduleReport> {
        assignment.check_domain(&self.dims)?;

        let snap = self.snapshot;
        let mut group_grids = vec![WeeklyGrid::new(); snap.groups().len()];
        let mut professor_grids = vec![WeeklyGrid::new(); snap.professors().len()];

        // Flat index order is classroom-major within a slot, so pushing in
        // that order gives the documented cell order for both audiences.
        for key in assignment.active_keys(&self.dims) {
            let unit = &snap.course_units()[key.course_unit()].id;
            let room = &snap.classrooms()[key.classroom()].id;
            let group = &snap.groups()[key.group()].id;
            let professor = &snap.professors()[key.professor()].id;

            group_grids[key.group()].push(key.slot(), Booking::new(unit, room, professor));
            professor_grids[key.professor()].push(key.slot(), Booking::new(unit, room, group));
        }

        let groups = timetables(snap.groups().iter().map(|g| g.id.as_str()), group_grids);
        let professors = timetables(
            snap.professors().iter().map(|p| p.id.as_str()),
            professor_grids,
        );

        for table in groups.iter().chain(&professors) {
            for slot in table.grid.conflicts() {
                warn!(
                    "Concurrent bookings for '{}' at {}: {}",
                    table.entity_id,
                    slot,
                    table.grid.cell_text(slot)
                );
            }
        }

        Ok(ScheduleReport {
            groups,
            professors,
            objective_value: None,
        })
    }
}

fn timetables<'a>(
    ids: impl Iterator<Item = &'a str>,
    grids: Vec<WeeklyGrid>,
) -> Vec<EntityTimetable> {
    ids.zip(grids)
        .map(|(id, grid)| EntityTimetable {
            entity_id: id.to_string(),
            grid,
        })
        .collect()
}
