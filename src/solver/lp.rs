//! `good_lp` backend (pure-Rust `microlp` solver).

use std::time::Instant;

use good_lp::{
    constraint, default_solver, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable,
};
use log::{debug, info, warn};

use super::{solve_empty, MilpSolver, SolveOutcome};
use crate::error::{TimetableError, TimetableResult};
use crate::milp::{Assignment, LessonModel};
use crate::models::{LinearConstraint, Sense};

/// Solves lesson models through `good_lp`.
///
/// Every lesson variable becomes a binary `good_lp` variable; rows are
/// added one by one with their sense. Rows with no terms are checked
/// directly instead of being passed to the backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodLpSolver;

impl GoodLpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl MilpSolver for GoodLpSolver {
    fn name(&self) -> &'static str {
        "microlp"
    }

    fn solve(&self, model: &LessonModel) -> TimetableResult<SolveOutcome> {
        if model.variable_count() == 0 {
            debug!("Empty variable domain, skipping backend");
            return solve_empty(model);
        }

        let started = Instant::now();
        let mut problem = ProblemVariables::new();
        let vars: Vec<Variable> = problem.add_vector(variable().binary(), model.variable_count());

        let objective: Expression = model
            .objective()
            .iter()
            .zip(&vars)
            .filter(|(w, _)| **w != 0)
            .map(|(&w, &v)| w as f64 * v)
            .sum();

        let mut lp = problem.maximise(objective).using(default_solver);
        for row in model.constraints() {
            if row.terms.is_empty() {
                if !row.sense.holds(0, row.rhs) {
                    return Ok(SolveOutcome::Infeasible {
                        reason: Some(format!(
                            "{} row has no variables and cannot hold",
                            row.family
                        )),
                    });
                }
                continue;
            }
            lp.add_constraint(to_constraint(row, &vars));
        }
        debug!(
            "Backend problem: {} variables, {} rows",
            vars.len(),
            model.constraint_count()
        );

        let solution = match lp.solve() {
            Ok(solution) => solution,
            Err(ResolutionError::Infeasible) => {
                info!("Model proved infeasible in {:.2?}", started.elapsed());
                return Ok(SolveOutcome::Infeasible {
                    reason: Some(ResolutionError::Infeasible.to_string()),
                });
            }
            Err(e) => return Err(TimetableError::Solver(e.to_string())),
        };

        let assignment = Assignment::new(vars.iter().map(|&v| solution.value(v) > 0.5).collect());
        let violated = model.violations(&assignment)?;
        if !violated.is_empty() {
            warn!(
                "Backend assignment violates {} rows (first: {})",
                violated.len(),
                violated[0].family
            );
        }
        let objective_value = model.objective_value(&assignment)? as f64;

        info!(
            "Solved {} variables in {:.2?}: {} lessons, objective {}",
            vars.len(),
            started.elapsed(),
            assignment.active_count(),
            objective_value
        );

        Ok(SolveOutcome::Solved {
            assignment,
            objective_value,
        })
    }
}

fn to_constraint(row: &LinearConstraint, vars: &[Variable]) -> good_lp::Constraint {
    let lhs: Expression = row
        .terms
        .iter()
        .map(|&(v, coef)| coef as f64 * vars[v])
        .sum();
    let rhs = row.rhs as f64;
    match row.sense {
        Sense::LessEqual => constraint!(lhs <= rhs),
        Sense::Equal => constraint!(lhs == rhs),
        Sense::GreaterEqual => constraint!(lhs >= rhs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milp::{LessonKey, LessonModelBuilder};
    use crate::models::{Block, ConstraintFamily, Day, Snapshot, SnapshotRecords, TimeSlot};

    fn records() -> SnapshotRecords {
        SnapshotRecords::new()
            .with_classroom("R1", 25)
            .with_group("G1", 20)
            .with_professor("P1")
            .with_course_unit("U1")
            .with_curriculum("G1", "U1")
            .with_professor_eligibility("P1", "G1 U1")
            .with_parameter("C1", 2)
            .with_parameter("C2", 15)
            .with_parameter("C3", 3)
            .with_parameter("C4", 1)
            .with_parameter("C5", 1)
    }

    #[test]
    fn test_solves_to_earliest_slots() {
        let snapshot = Snapshot::from_records(&records()).unwrap();
        let model = LessonModelBuilder::new(&snapshot).build().unwrap();
        let (assignment, value) = GoodLpSolver::new()
            .solve(&model)
            .unwrap()
            .into_solution()
            .unwrap();

        assert!(model.violations(&assignment).unwrap().is_empty());
        let keys: Vec<LessonKey> = assignment.active_keys(model.dimensions()).collect();
        assert_eq!(keys.len(), 2);
        // C4 forces different days; Mon and Tue AM1 are the best two.
        assert_eq!(keys[0].slot(), TimeSlot::new(Day::Mon, Block::AM1));
        assert_eq!(keys[1].slot(), TimeSlot::new(Day::Tue, Block::AM1));
        assert_eq!(value, model.objective_value(&assignment).unwrap() as f64);
    }

    #[test]
    fn test_infeasible_floor() {
        let snapshot = Snapshot::from_records(
            &records()
                .with_group_blackout("G1", "Mon AM1 AM2 PM1 PM2;Tue AM1 AM2 PM1 PM2")
                .with_group_blackout("G1", "Wed AM1 AM2 PM1 PM2;Thu AM1 AM2 PM1 PM2")
                .with_group_blackout("G1", "Fri AM1 AM2 PM1 PM2;Sat AM1 AM2 PM1 PM2")
                .with_parameter("C6", 1),
        )
        .unwrap();
        let model = LessonModelBuilder::new(&snapshot).build().unwrap();
        assert!(model.count_by_family().contains_key(&ConstraintFamily::CurriculumFloor));
        let outcome = GoodLpSolver::new().solve(&model).unwrap();
        assert!(matches!(outcome, SolveOutcome::Infeasible { .. }));
    }

    #[test]
    fn test_empty_domain_short_circuits() {
        let snapshot = Snapshot::from_records(
            &SnapshotRecords::new()
                .with_parameter("C1", 1)
                .with_parameter("C2", 1)
                .with_parameter("C3", 1)
                .with_parameter("C4", 0)
                .with_parameter("C5", 0),
        )
        .unwrap();
        let model = LessonModelBuilder::new(&snapshot).build().unwrap();
        let (assignment, value) = GoodLpSolver::new()
            .solve(&model)
            .unwrap()
            .into_solution()
            .unwrap();
        assert!(assignment.is_empty());
        assert_eq!(value, 0.0);
    }

    #[test]
    fn test_far_too_large_room_left_empty() {
        let hall_only = SnapshotRecords {
            classrooms: Vec::new(),
            ..records()
        }
        .with_classroom("HALL", 100);
        let snapshot = Snapshot::from_records(&hall_only).unwrap();
        let model = LessonModelBuilder::new(&snapshot).build().unwrap();
        assert!(model.objective().iter().all(|&w| w == -40));
        let (assignment, value) = GoodLpSolver::new()
            .solve(&model)
            .unwrap()
            .into_solution()
            .unwrap();
        assert_eq!(assignment.active_count(), 0);
        assert_eq!(value, 0.0);

        let snapshot = Snapshot::from_records(&records().with_classroom("HALL", 100)).unwrap();
        let model = LessonModelBuilder::new(&snapshot).build().unwrap();
        let (assignment, _) = GoodLpSolver::new()
            .solve(&model)
            .unwrap()
            .into_solution()
            .unwrap();
        let keys: Vec<LessonKey> = assignment.active_keys(model.dimensions()).collect();
        assert_eq!(keys.len(), 2);
        assert!(keys.iter().all(|k| k.classroom() == 0));
    }
}
