//! Binary lesson-assignment MILP formulation.
//!
//! Builds a [`LessonModel`] from a [`Snapshot`]: one binary variable per
//! point of the full `day × block × classroom × group × professor ×
//! course-unit` product, a tiered objective (see [`ObjectiveWeights`]),
//! and the rows of every active rule in the [constraint library](constraints).
//!
//! The model is backend-neutral; [`crate::solver`] translates it for a
//! concrete MILP solver.
//!
//! # Reference
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

mod assignment;
pub mod constraints;
mod index;
mod objective;

pub use assignment::Assignment;
pub use constraints::{ConstraintRule, RuleContext};
pub use index::{Axis, AxisSet, Dimensions, LessonKey, Subspace};
pub use objective::{ObjectiveWeights, MAX_EXACT_WEIGHT};

use std::collections::BTreeMap;

use log::debug;

use crate::error::TimetableResult;
use crate::models::{ConstraintFamily, LinearConstraint, Snapshot};

/// Builds a lesson model from a snapshot.
///
/// # Example
/// ```no_run
/// use u_timetable::milp::{LessonModelBuilder, ObjectiveWeights};
/// use u_timetable::models::{Snapshot, SnapshotRecords};
///
/// let records = SnapshotRecords::new()
///     .with_classroom("R1", 30)
///     .with_group("G1", 25)
///     .with_professor("P1")
///     .with_course_unit("U1")
///     .with_curriculum("G1", "U1")
///     .with_professor_eligibility("P1", "G1 U1")
///     .with_parameter("C1", 2)
///     .with_parameter("C2", 15)
///     .with_parameter("C3", 3)
///     .with_parameter("C4", 1)
///     .with_parameter("C5", 1);
/// let snapshot = Snapshot::from_records(&records).unwrap();
/// let model = LessonModelBuilder::new(&snapshot)
///     .with_weights(ObjectiveWeights::default())
///     .build()
///     .unwrap();
/// println!("{} variables", model.variable_count());
/// ```
pub struct LessonModelBuilder<'a> {
    snapshot: &'a Snapshot,
    weights: ObjectiveWeights,
    rules: Vec<Box<dyn ConstraintRule>>,
}

impl<'a> LessonModelBuilder<'a> {
    /// Creates a builder with default weights and the full rule library.
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            snapshot,
            weights: ObjectiveWeights::default(),
            rules: constraints::library(),
        }
    }

    /// Sets objective weights.
    pub fn with_weights(mut self, weights: ObjectiveWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Adds a rule on top of the library.
    pub fn with_rule<R: ConstraintRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Builds the model.
    ///
    /// Creates:
    /// - A binary variable per lesson key (full product, none omitted)
    /// - An objective coefficient per variable
    /// - The rows of every rule active under the snapshot's parameters
    ///
    /// # Errors
    /// `Config` if the weights fail validation.
    pub fn build(&self) -> TimetableResult<LessonModel> {
        self.weights.validate()?;

        let ctx = RuleContext::new(self.snapshot);
        let dims = ctx.dims;
        let classrooms = self.snapshot.classrooms();
        let groups = self.snapshot.groups();

        let objective: Vec<i64> = dims
            .keys()
            .map(|k| {
                self.weights.lesson_weight(
                    k.day(),
                    k.block(),
                    classrooms[k.classroom()].capacity,
                    groups[k.group()].size,
                )
            })
            .collect();

        let params = self.snapshot.parameters();
        let mut rows = Vec::new();
        for rule in &self.rules {
            if !rule.is_active(params) {
                debug!("{}: inactive", rule.family());
                continue;
            }
            let before = rows.len();
            rule.generate(&ctx, &mut rows);
            debug!("{}: {} rows", rule.family(), rows.len() - before);
        }

        Ok(LessonModel {
            dims,
            objective,
            constraints: rows,
        })
    }
}

/// A built lesson-assignment model.
#[derive(Debug, Clone)]
pub struct LessonModel {
    dims: Dimensions,
    objective: Vec<i64>,
    constraints: Vec<LinearConstraint>,
}

impl LessonModel {
    pub fn dimensions(&self) -> &Dimensions {
        &self.dims
    }

    pub fn variable_count(&self) -> usize {
        self.dims.len()
    }

    /// Objective coefficient per variable, in flat index order.
    pub fn objective(&self) -> &[i64] {
        &self.objective
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Row count per constraint family (inactive families omitted).
    pub fn count_by_family(&self) -> BTreeMap<ConstraintFamily, usize> {
        let mut counts = BTreeMap::new();
        for c in &self.constraints {
            *counts.entry(c.family).or_insert(0) += 1;
        }
        counts
    }

    /// Objective value of an assignment.
    ///
    /// # Errors
    /// `DomainMismatch` if the assignment does not cover the domain.
    pub fn objective_value(&self, assignment: &Assignment) -> TimetableResult<i64> {
        assignment.check_domain(&self.dims)?;
        Ok(assignment.active_indices().map(|i| self.objective[i]).sum())
    }

    /// Rows an assignment violates.
    ///
    /// # Errors
    /// `DomainMismatch` if the assignment does not cover the domain.
    pub fn violations(&self, assignment: &Assignment) -> TimetableResult<Vec<&LinearConstraint>> {
        assignment.check_domain(&self.dims)?;
        Ok(self
            .constraints
            .iter()
            .filter(|c| !c.is_satisfied(|v| assignment.value(v)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TimetableError;
    use crate::models::{Block, ConstraintParameters, Day, SnapshotRecords, TimeSlot};

    fn params() -> ConstraintParameters {
        ConstraintParameters {
            max_lessons_per_course_unit: 2,
            max_weekly_lessons_per_professor: 15,
            max_daily_lessons_per_professor: 3,
            no_repeat_same_day: true,
            enforce_room_capacity: true,
            min_lessons_per_course_unit: None,
        }
    }

    fn single_snapshot(params: &ConstraintParameters) -> Snapshot {
        let records = SnapshotRecords::new()
            .with_classroom("R1", 25)
            .with_group("G1", 20)
            .with_professor("P1")
            .with_course_unit("U1")
            .with_curriculum("G1", "U1")
            .with_professor_eligibility("P1", "G1 U1")
            .with_parameters(params);
        Snapshot::from_records(&records).unwrap()
    }

    #[test]
    fn test_full_product_domain() {
        let snap = single_snapshot(&params());
        let model = LessonModelBuilder::new(&snap).build().unwrap();
        assert_eq!(model.variable_count(), 24);
        assert_eq!(model.objective().len(), 24);
    }

    #[test]
    fn test_family_counts() {
        let snap = single_snapshot(&params());
        let model = LessonModelBuilder::new(&snap).build().unwrap();
        let counts = model.count_by_family();
        assert_eq!(counts[&ConstraintFamily::CurriculumCap], 1);
        assert_eq!(counts[&ConstraintFamily::OneLessonPerRoomSlot], 24);
        assert_eq!(counts[&ConstraintFamily::NoGroupOverlap], 24);
        assert_eq!(counts[&ConstraintFamily::NoProfessorOverlap], 24);
        assert_eq!(counts[&ConstraintFamily::ProfessorWeeklyCap], 1);
        assert_eq!(counts[&ConstraintFamily::ProfessorDailyCap], 6);
        assert_eq!(counts[&ConstraintFamily::NoRepeatSameDay], 6);
        assert!(!counts.contains_key(&ConstraintFamily::GroupBlackout));
        assert!(!counts.contains_key(&ConstraintFamily::CurriculumFloor));
        assert_eq!(model.constraint_count(), counts.values().sum::<usize>());
    }

    #[test]
    fn test_toggles_omit_rules() {
        let off = ConstraintParameters {
            no_repeat_same_day: false,
            ..params()
        };
        let snap = single_snapshot(&off);
        let model = LessonModelBuilder::new(&snap).build().unwrap();
        assert!(!model.count_by_family().contains_key(&ConstraintFamily::NoRepeatSameDay));
    }

    #[test]
    fn test_objective_prefers_early_slots() {
        let snap = single_snapshot(&params());
        let model = LessonModelBuilder::new(&snap).build().unwrap();
        let dims = model.dimensions();
        let mon = LessonKey::new(TimeSlot::new(Day::Mon, Block::AM1), 0, 0, 0, 0);
        let sat = LessonKey::new(TimeSlot::new(Day::Sat, Block::PM2), 0, 0, 0, 0);
        assert!(model.objective()[dims.index_of(&mon)] > model.objective()[dims.index_of(&sat)]);
        // Sat PM2 keeps only the room bonus: 40 - (25 - 20).
        assert_eq!(model.objective()[dims.index_of(&sat)], 35);
    }

    #[test]
    fn test_violations() {
        let snap = single_snapshot(&params());
        let model = LessonModelBuilder::new(&snap).build().unwrap();
        let dims = *model.dimensions();

        let ok = Assignment::from_keys(
            &dims,
            [
                LessonKey::new(TimeSlot::new(Day::Mon, Block::AM1), 0, 0, 0, 0),
                LessonKey::new(TimeSlot::new(Day::Tue, Block::AM1), 0, 0, 0, 0),
            ],
        );
        assert!(model.violations(&ok).unwrap().is_empty());

        let repeat = Assignment::from_keys(
            &dims,
            [
                LessonKey::new(TimeSlot::new(Day::Mon, Block::AM1), 0, 0, 0, 0),
                LessonKey::new(TimeSlot::new(Day::Mon, Block::AM2), 0, 0, 0, 0),
                LessonKey::new(TimeSlot::new(Day::Tue, Block::AM1), 0, 0, 0, 0),
            ],
        );
        let families: Vec<ConstraintFamily> = model
            .violations(&repeat)
            .unwrap()
            .iter()
            .map(|c| c.family)
            .collect();
        assert!(families.contains(&ConstraintFamily::CurriculumCap));
        assert!(families.contains(&ConstraintFamily::NoRepeatSameDay));
    }

    #[test]
    fn test_objective_value_domain_mismatch() {
        let snap = single_snapshot(&params());
        let model = LessonModelBuilder::new(&snap).build().unwrap();
        assert_eq!(model.objective_value(&Assignment::zeros(24)).unwrap(), 0);
        assert!(matches!(
            model.objective_value(&Assignment::zeros(3)),
            Err(TimetableError::DomainMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let snap = single_snapshot(&params());
        let result = LessonModelBuilder::new(&snap)
            .with_weights(ObjectiveWeights::new().with_room_fit(1, 2))
            .build();
        assert!(matches!(result, Err(TimetableError::Config(_))));
    }
}
