//! Timetabling cycle and schedule publishing.
//!
//! A cycle is synchronous: repository snapshot → parse and validate →
//! build the lesson model → one blocking solve → extract grids. Each run
//! builds an independent model; nothing is cached between runs.
//!
//! # Extraction
//!
//! [`ScheduleExtractor`] turns a solved assignment into one weekly grid per
//! group and per professor.
//!
//! # Publishing
//!
//! [`ScheduleStore`] keeps the latest [`ScheduleRelease`] under a
//! monotonically increasing version.

mod extract;
mod store;

pub use extract::ScheduleExtractor;
pub use store::{ScheduleRelease, ScheduleStore};

use std::sync::Arc;
use std::time::Instant;

use log::{info, warn};

use crate::config::TimetableConfig;
use crate::error::TimetableResult;
use crate::milp::{LessonModelBuilder, ObjectiveWeights};
use crate::models::{ScheduleReport, Snapshot};
use crate::repository::EntityRepository;
use crate::solver::{GoodLpSolver, MilpSolver, TimeLimitedSolver};

/// Runs timetabling cycles.
///
/// # Example
/// ```no_run
/// use u_timetable::repository::MemoryRepository;
/// use u_timetable::scheduler::{ScheduleStore, TimetableScheduler};
///
/// let repo = MemoryRepository::load_json("records.json").unwrap();
/// let store = ScheduleStore::new();
/// let release = TimetableScheduler::new().run_and_publish(&repo, &store).unwrap();
/// println!("published v{}", release.version);
/// ```
#[derive(Debug)]
pub struct TimetableScheduler {
    solver: Box<dyn MilpSolver>,
    weights: ObjectiveWeights,
}

impl Default for TimetableScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TimetableScheduler {
    /// Creates a scheduler with the `good_lp` backend and default weights.
    pub fn new() -> Self {
        Self {
            solver: Box::new(GoodLpSolver::new()),
            weights: ObjectiveWeights::default(),
        }
    }

    /// Creates a scheduler from configuration (weights and time limit).
    pub fn from_config(config: &TimetableConfig) -> Self {
        let scheduler = Self::new().with_weights(config.objective.clone());
        match config.solver.time_limit() {
            Some(limit) => {
                scheduler.with_solver(TimeLimitedSolver::new(GoodLpSolver::new(), limit))
            }
            None => scheduler,
        }
    }

    /// Sets the solver backend.
    pub fn with_solver<S: MilpSolver + 'static>(mut self, solver: S) -> Self {
        self.solver = Box::new(solver);
        self
    }

    /// Sets objective weights.
    pub fn with_weights(mut self, weights: ObjectiveWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Runs one cycle against a repository.
    ///
    /// # Errors
    /// Any snapshot, build, or solver error aborts the cycle, including
    /// `Infeasible` and `SolverTimeout`.
    pub fn run(&self, repo: &dyn EntityRepository) -> TimetableResult<ScheduleReport> {
        let records = repo.snapshot()?;
        let snapshot = Snapshot::from_records(&records)?;
        info!(
            "Snapshot: {} classrooms, {} groups, {} professors, {} course-units",
            snapshot.classrooms().len(),
            snapshot.groups().len(),
            snapshot.professors().len(),
            snapshot.course_units().len()
        );
        self.run_snapshot(&snapshot)
    }

    /// Runs build, solve, and extract on a parsed snapshot.
    pub fn run_snapshot(&self, snapshot: &Snapshot) -> TimetableResult<ScheduleReport> {
        let started = Instant::now();
        let model = LessonModelBuilder::new(snapshot)
            .with_weights(self.weights.clone())
            .build()?;
        info!(
            "Model: {} variables, {} constraints (built in {:.2?})",
            model.variable_count(),
            model.constraint_count(),
            started.elapsed()
        );

        let (assignment, objective_value) = self.solver.solve(&model)?.into_solution()?;

        let violated = model.violations(&assignment)?;
        if !violated.is_empty() {
            warn!("Solved assignment violates {} model rows", violated.len());
        }

        let mut report = ScheduleExtractor::new(snapshot).extract(&assignment)?;
        report.objective_value = Some(objective_value);
        info!(
            "Cycle finished in {:.2?}: {} lessons, objective {}",
            started.elapsed(),
            report.lesson_count(),
            objective_value
        );
        Ok(report)
    }

    /// Runs one cycle and publishes the result as a new release.
    ///
    /// Nothing is published when the cycle fails.
    pub fn run_and_publish(
        &self,
        repo: &dyn EntityRepository,
        store: &ScheduleStore,
    ) -> TimetableResult<Arc<ScheduleRelease>> {
        let report = self.run(repo)?;
        let release = store.publish(report);
        info!("Published schedule version {}", release.version);
        Ok(release)
    }
}
