//! Solver adapter.
//!
//! [`MilpSolver`] is the boundary between a backend-neutral
//! [`LessonModel`] and a concrete MILP backend. A solve is a single
//! blocking call: it either yields an [`Assignment`] for the whole domain
//! or proves infeasibility. Backend failures surface as
//! [`TimetableError::Solver`].
//!
//! [`TimeLimitedSolver`] adds a wall-clock limit to any solver by running
//! it on a worker thread.

mod lp;

pub use lp::GoodLpSolver;

use std::fmt::Debug;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::error::{TimetableError, TimetableResult};
use crate::milp::{Assignment, LessonModel};

/// Outcome of one solve.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// An optimal assignment for the model.
    Solved {
        assignment: Assignment,
        objective_value: f64,
    },
    /// No assignment satisfies all rows. `reason` comes from the backend.
    Infeasible { reason: Option<String> },
}

impl SolveOutcome {
    /// Converts to the assignment, mapping infeasibility to an error.
    ///
    /// # Errors
    /// `Infeasible` when the solver proved the model has no solution.
    pub fn into_solution(self) -> TimetableResult<(Assignment, f64)> {
        match self {
            SolveOutcome::Solved {
                assignment,
                objective_value,
            } => Ok((assignment, objective_value)),
            SolveOutcome::Infeasible { reason } => Err(TimetableError::Infeasible { reason }),
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self, SolveOutcome::Solved { .. })
    }
}

/// A MILP backend for lesson models.
pub trait MilpSolver: Send + Sync + Debug {
    /// Backend name (e.g., "microlp").
    fn name(&self) -> &'static str;

    /// Solves the model once.
    fn solve(&self, model: &LessonModel) -> TimetableResult<SolveOutcome>;
}

/// Solves a model with no variables.
///
/// The empty assignment is the only candidate; it is infeasible only if
/// some row fails with every variable absent.
pub(crate) fn solve_empty(model: &LessonModel) -> TimetableResult<SolveOutcome> {
    let assignment = Assignment::zeros(0);
    let violated = model.violations(&assignment)?;
    if let Some(row) = violated.first() {
        return Ok(SolveOutcome::Infeasible {
            reason: Some(format!("{} row unsatisfiable with no variables", row.family)),
        });
    }
    Ok(SolveOutcome::Solved {
        assignment,
        objective_value: 0.0,
    })
}

/// Runs a solver under a wall-clock limit.
///
/// The inner solver runs on a dedicated thread. If no outcome arrives in
/// time the call returns `SolverTimeout` and the late result is dropped.
#[derive(Debug, Clone)]
pub struct TimeLimitedSolver<S> {
    inner: Arc<S>,
    limit: Duration,
}

impl<S: MilpSolver + 'static> TimeLimitedSolver<S> {
    /// Creates a time-limited wrapper.
    pub fn new(inner: S, limit: Duration) -> Self {
        Self {
            inner: Arc::new(inner),
            limit,
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }
}

impl<S: MilpSolver + 'static> MilpSolver for TimeLimitedSolver<S> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn solve(&self, model: &LessonModel) -> TimetableResult<SolveOutcome> {
        let (tx, rx) = mpsc::channel();
        let solver = Arc::clone(&self.inner);
        let model = model.clone();
        let started = Instant::now();

        thread::Builder::new()
            .name(format!("{}-solve", solver.name()))
            .spawn(move || {
                // The receiver is gone after a timeout.
                let _ = tx.send(solver.solve(&model));
            })?;

        match rx.recv_timeout(self.limit) {
            Ok(outcome) => {
                info!("Solver {} finished in {:.2?}", self.name(), started.elapsed());
                outcome
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                warn!("Solver {} exceeded {:?}; result discarded", self.name(), self.limit);
                Err(TimetableError::SolverTimeout(self.limit))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(TimetableError::Solver(format!(
                "{} worker exited without a result",
                self.name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milp::LessonModelBuilder;
    use crate::models::{Snapshot, SnapshotRecords};

    #[derive(Debug)]
    struct SlowSolver(Duration);

    impl MilpSolver for SlowSolver {
        fn name(&self) -> &'static str {
            "slow"
        }

        fn solve(&self, model: &LessonModel) -> TimetableResult<SolveOutcome> {
            thread::sleep(self.0);
            Ok(SolveOutcome::Solved {
                assignment: Assignment::zeros(model.variable_count()),
                objective_value: 0.0,
            })
        }
    }

    #[derive(Debug)]
    struct PanickingSolver;

    impl MilpSolver for PanickingSolver {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn solve(&self, _model: &LessonModel) -> TimetableResult<SolveOutcome> {
            panic!("backend crashed");
        }
    }

    fn model() -> LessonModel {
        let records = SnapshotRecords::new()
            .with_classroom("R1", 10)
            .with_group("G1", 10)
            .with_professor("P1")
            .with_course_unit("U1")
            .with_parameter("C1", 1)
            .with_parameter("C2", 1)
            .with_parameter("C3", 1)
            .with_parameter("C4", 0)
            .with_parameter("C5", 0);
        let snapshot = Snapshot::from_records(&records).unwrap();
        LessonModelBuilder::new(&snapshot).build().unwrap()
    }

    #[test]
    fn test_time_limit_exceeded() {
        let solver = TimeLimitedSolver::new(
            SlowSolver(Duration::from_millis(500)),
            Duration::from_millis(20),
        );
        let err = solver.solve(&model()).unwrap_err();
        assert!(err.is_timeout());
        assert!(!err.is_infeasible());
    }

    #[test]
    fn test_within_time_limit() {
        let solver = TimeLimitedSolver::new(
            SlowSolver(Duration::from_millis(1)),
            Duration::from_secs(10),
        );
        let outcome = solver.solve(&model()).unwrap();
        assert!(outcome.is_solved());
    }

    #[test]
    fn test_worker_panic_is_solver_error() {
        let solver = TimeLimitedSolver::new(PanickingSolver, Duration::from_secs(10));
        let err = solver.solve(&model()).unwrap_err();
        assert!(matches!(err, TimetableError::Solver(_)));
    }

    #[test]
    fn test_infeasible_outcome_into_error() {
        let outcome = SolveOutcome::Infeasible {
            reason: Some("row 3".into()),
        };
        let err = outcome.into_solution().unwrap_err();
        assert!(err.is_infeasible());
    }
}
