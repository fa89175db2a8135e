//! Weekly timetabling as a binary lesson-assignment MILP.
//!
//! Assigns lessons (group, professor, course-unit) to classrooms and
//! weekly time slots (`Mon..Sat` × `AM1, AM2, PM1, PM2`). A timetabling
//! cycle reads a repository snapshot, builds one binary variable per point
//! of the full `day × block × classroom × group × professor × course-unit`
//! product, adds the constraint library, solves once, and extracts a
//! weekly grid per group and per professor.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `TimeSlot`, `Classroom`, `Group`,
//!   `Professor`, `CourseUnit`, `Snapshot`, `LinearConstraint`, `WeeklyGrid`
//! - **`validation`**: Input integrity checks (duplicate IDs, sizes, references)
//! - **`milp`**: Variable indexing, objective weights, constraint rules,
//!   `LessonModelBuilder`
//! - **`solver`**: `MilpSolver` boundary, `good_lp` backend, time limits
//! - **`scheduler`**: Cycle driver, schedule extraction, versioned releases
//! - **`repository`**: Entity tables (`EntityRepository`, `MemoryRepository`)
//! - **`export`**: Report sinks (JSON, Excel with feature `xlsx`)
//! - **`config`**: TOML configuration
//!
//! # Example
//!
//! ```no_run
//! use u_timetable::config::TimetableConfig;
//! use u_timetable::export::sink_for;
//! use u_timetable::repository::MemoryRepository;
//! use u_timetable::scheduler::{ScheduleStore, TimetableScheduler};
//!
//! let config = TimetableConfig::from_file("timetable.toml").unwrap();
//! let repo = MemoryRepository::load_json("records.json").unwrap();
//! let store = ScheduleStore::new();
//!
//! let release = TimetableScheduler::from_config(&config)
//!     .run_and_publish(&repo, &store)
//!     .unwrap();
//! sink_for(&config.output).unwrap().write(&release.report).unwrap();
//! ```
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

pub mod config;
pub mod error;
pub mod export;
pub mod milp;
pub mod models;
pub mod repository;
pub mod scheduler;
pub mod solver;
pub mod validation;

pub use error::{TimetableError, TimetableResult};
