//! Timetabling domain models.
//!
//! Provides the data types for the timetabling problem and its solution:
//! the fixed weekly time grid, the entities being scheduled, the parsed
//! repository snapshot, the linear constraints over lesson variables, and
//! the extracted weekly grids.
//!
//! # Domain Mappings
//!
//! | u-timetable | University | School | Training center |
//! |-------------|------------|--------|-----------------|
//! | Group | Class/Cohort | Form | Course session |
//! | Professor | Lecturer | Teacher | Trainer |
//! | CourseUnit | Module | Subject | Course |
//! | Classroom | Lecture hall | Room | Lab |

mod constraint;
pub mod encoding;
mod entity;
mod parameters;
mod schedule;
mod snapshot;
mod time;

pub use constraint::{ConstraintFamily, LinearConstraint, Sense};
pub use encoding::BlackoutSet;
pub use entity::{Classroom, CourseUnit, Group, Professor};
pub use parameters::{ConstraintParameters, ParameterRecord};
pub use schedule::{Booking, EntityTimetable, ScheduleReport, WeeklyGrid};
pub use snapshot::{
    BlackoutRecord, ClassroomRecord, CourseUnitRecord, CurriculumRecord, GroupRecord,
    ProfessorEligibilityRecord, ProfessorRecord, RoomEligibilityRecord, Snapshot, SnapshotRecords,
};
pub use time::{Block, Day, TimeSlot};
