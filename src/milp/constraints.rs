//! Constraint library.
//!
//! Each rule is a standalone generator over its own scope axes: it walks
//! the subspace of its scope to find one anchor per constraint (or per
//! excluded combination), then sums or zeroes the variables of the
//! complementary subspace.
//!
//! # Categories
//!
//! - **Capacity**: CurriculumCap, ProfessorWeeklyCap, ProfessorDailyCap, CurriculumFloor
//! - **Exclusivity**: OneLessonPerRoomSlot, NoGroupOverlap, NoProfessorOverlap, NoRepeatSameDay
//! - **Forced zero**: GroupBlackout, ProfessorBlackout, RoomEligibility,
//!   CurriculumMembership, ProfessorEligibility, RoomCapacityFit
//!
//! Toggled rules (`C4`, `C5`, `C6`) emit nothing when off. Forced-zero
//! rules emit one equality per excluded key.

use std::fmt::Debug;

use super::index::{Axis, AxisSet, Dimensions, LessonKey};
use crate::models::{ConstraintFamily, ConstraintParameters, LinearConstraint, Sense, Snapshot};

/// Inputs shared by all rules during one build.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub snapshot: &'a Snapshot,
    pub dims: Dimensions,
}

impl<'a> RuleContext<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            snapshot,
            dims: Dimensions::of_snapshot(snapshot),
        }
    }

    pub fn parameters(&self) -> &'a ConstraintParameters {
        self.snapshot.parameters()
    }

    /// Variables sharing `anchor`'s coordinates on every `scope` axis.
    fn variables(&self, scope: AxisSet, anchor: LessonKey) -> impl Iterator<Item = usize> + '_ {
        let dims = self.dims;
        self.dims
            .subspace(scope.complement(), anchor)
            .map(move |k| dims.index_of(&k))
    }

    /// One `Σ <sense> rhs` row per scope anchor; `rhs` returning `None`
    /// skips the anchor.
    fn emit_sums(
        &self,
        family: ConstraintFamily,
        scope: AxisSet,
        sense: Sense,
        rhs: impl Fn(&LessonKey) -> Option<i64>,
        out: &mut Vec<LinearConstraint>,
    ) {
        for anchor in self.dims.subspace(scope, LessonKey::default()) {
            if let Some(rhs) = rhs(&anchor) {
                out.push(LinearConstraint::sum(
                    family,
                    self.variables(scope, anchor),
                    sense,
                    rhs,
                ));
            }
        }
    }

    /// `x = 0` for every key whose scope coordinates are excluded.
    fn emit_forced_zero(
        &self,
        family: ConstraintFamily,
        scope: AxisSet,
        excluded: impl Fn(&LessonKey) -> bool,
        out: &mut Vec<LinearConstraint>,
    ) {
        for anchor in self.dims.subspace(scope, LessonKey::default()) {
            if excluded(&anchor) {
                out.extend(
                    self.variables(scope, anchor)
                        .map(|v| LinearConstraint::forced_zero(family, v)),
                );
            }
        }
    }
}

/// A rule that generates linear constraints over lesson variables.
pub trait ConstraintRule: Send + Sync + Debug {
    /// Family tag carried by every generated constraint.
    fn family(&self) -> ConstraintFamily;

    /// Axes the rule ranges over.
    fn scope(&self) -> AxisSet;

    /// Whether the rule applies under the given parameters.
    fn is_active(&self, _params: &ConstraintParameters) -> bool {
        true
    }

    /// Appends this rule's constraints.
    fn generate(&self, ctx: &RuleContext<'_>, out: &mut Vec<LinearConstraint>);

    /// Rule description.
    fn description(&self) -> &'static str;
}

/// Every rule, in generation order.
pub fn library() -> Vec<Box<dyn ConstraintRule>> {
    vec![
        Box::new(CurriculumCap),
        Box::new(OneLessonPerRoomSlot),
        Box::new(NoGroupOverlap),
        Box::new(NoProfessorOverlap),
        Box::new(ProfessorWeeklyCap),
        Box::new(ProfessorDailyCap),
        Box::new(NoRepeatSameDay),
        Box::new(GroupBlackout),
        Box::new(ProfessorBlackout),
        Box::new(RoomEligibility),
        Box::new(CurriculumMembership),
        Box::new(ProfessorEligibility),
        Box::new(RoomCapacityFit),
        Box::new(CurriculumFloor),
    ]
}

// ======================== Capacity rules ========================

/// At most `C1` lessons of one course-unit per group per week.
#[derive(Debug, Clone, Copy)]
pub struct CurriculumCap;

impl ConstraintRule for CurriculumCap {
    fn family(&self) -> ConstraintFamily {
        ConstraintFamily::CurriculumCap
    }

    fn scope(&self) -> AxisSet {
        AxisSet::of(&[Axis::Group, Axis::CourseUnit])
    }

    fn generate(&self, ctx: &RuleContext<'_>, out: &mut Vec<LinearConstraint>) {
        let cap = i64::from(ctx.parameters().max_lessons_per_course_unit);
        ctx.emit_sums(self.family(), self.scope(), Sense::LessEqual, |_| Some(cap), out);
    }

    fn description(&self) -> &'static str {
        "Weekly lessons per (group, course-unit) <= C1"
    }
}

/// At most `C2` lessons per professor per week.
#[derive(Debug, Clone, Copy)]
pub struct ProfessorWeeklyCap;

impl ConstraintRule for ProfessorWeeklyCap {
    fn family(&self) -> ConstraintFamily {
        ConstraintFamily::ProfessorWeeklyCap
    }

    fn scope(&self) -> AxisSet {
        AxisSet::of(&[Axis::Professor])
    }

    fn generate(&self, ctx: &RuleContext<'_>, out: &mut Vec<LinearConstraint>) {
        let cap = i64::from(ctx.parameters().max_weekly_lessons_per_professor);
        ctx.emit_sums(self.family(), self.scope(), Sense::LessEqual, |_| Some(cap), out);
    }

    fn description(&self) -> &'static str {
        "Weekly lessons per professor <= C2"
    }
}

/// At most `C3` lessons per professor per day.
#[derive(Debug, Clone, Copy)]
pub struct ProfessorDailyCap;

impl ConstraintRule for ProfessorDailyCap {
    fn family(&self) -> ConstraintFamily {
        ConstraintFamily::ProfessorDailyCap
    }

    fn scope(&self) -> AxisSet {
        AxisSet::of(&[Axis::Professor, Axis::Day])
    }

    fn generate(&self, ctx: &RuleContext<'_>, out: &mut Vec<LinearConstraint>) {
        let cap = i64::from(ctx.parameters().max_daily_lessons_per_professor);
        ctx.emit_sums(self.family(), self.scope(), Sense::LessEqual, |_| Some(cap), out);
    }

    fn description(&self) -> &'static str {
        "Daily lessons per professor <= C3"
    }
}

/// At least `C6` lessons of each curriculum course-unit per group.
///
/// Active only when `C6` is present and positive.
#[derive(Debug, Clone, Copy)]
pub struct CurriculumFloor;

impl ConstraintRule for CurriculumFloor {
    fn family(&self) -> ConstraintFamily {
        ConstraintFamily::CurriculumFloor
    }

    fn scope(&self) -> AxisSet {
        AxisSet::of(&[Axis::Group, Axis::CourseUnit])
    }

    fn is_active(&self, params: &ConstraintParameters) -> bool {
        params.min_lessons_per_course_unit.is_some_and(|m| m > 0)
    }

    fn generate(&self, ctx: &RuleContext<'_>, out: &mut Vec<LinearConstraint>) {
        let Some(floor) = ctx.parameters().min_lessons_per_course_unit else {
            return;
        };
        let snapshot = ctx.snapshot;
        ctx.emit_sums(
            self.family(),
            self.scope(),
            Sense::GreaterEqual,
            |k| {
                snapshot
                    .in_curriculum(k.group(), k.course_unit())
                    .then_some(i64::from(floor))
            },
            out,
        );
    }

    fn description(&self) -> &'static str {
        "Weekly lessons per (group, curriculum course-unit) >= C6"
    }
}

// ======================== Exclusivity rules ========================

/// One lesson per classroom per slot.
#[derive(Debug, Clone, Copy)]
pub struct OneLessonPerRoomSlot;

impl ConstraintRule for OneLessonPerRoomSlot {
    fn family(&self) -> ConstraintFamily {
        ConstraintFamily::OneLessonPerRoomSlot
    }

    fn scope(&self) -> AxisSet {
        AxisSet::of(&[Axis::Day, Axis::Block, Axis::Classroom])
    }

    fn generate(&self, ctx: &RuleContext<'_>, out: &mut Vec<LinearConstraint>) {
        ctx.emit_sums(self.family(), self.scope(), Sense::LessEqual, |_| Some(1), out);
    }

    fn description(&self) -> &'static str {
        "At most one lesson per (day, block, classroom)"
    }
}

/// A group attends at most one lesson per slot.
#[derive(Debug, Clone, Copy)]
pub struct NoGroupOverlap;

impl ConstraintRule for NoGroupOverlap {
    fn family(&self) -> ConstraintFamily {
        ConstraintFamily::NoGroupOverlap
    }

    fn scope(&self) -> AxisSet {
        AxisSet::of(&[Axis::Group, Axis::Day, Axis::Block])
    }

    fn generate(&self, ctx: &RuleContext<'_>, out: &mut Vec<LinearConstraint>) {
        ctx.emit_sums(self.family(), self.scope(), Sense::LessEqual, |_| Some(1), out);
    }

    fn description(&self) -> &'static str {
        "At most one lesson per (group, day, block)"
    }
}

/// A professor teaches at most one lesson per slot.
#[derive(Debug, Clone, Copy)]
pub struct NoProfessorOverlap;

impl ConstraintRule for NoProfessorOverlap {
    fn family(&self) -> ConstraintFamily {
        ConstraintFamily::NoProfessorOverlap
    }

    fn scope(&self) -> AxisSet {
        AxisSet::of(&[Axis::Professor, Axis::Day, Axis::Block])
    }

    fn generate(&self, ctx: &RuleContext<'_>, out: &mut Vec<LinearConstraint>) {
        ctx.emit_sums(self.family(), self.scope(), Sense::LessEqual, |_| Some(1), out);
    }

    fn description(&self) -> &'static str {
        "At most one lesson per (professor, day, block)"
    }
}

/// A course-unit is taught to a group at most once a day (toggle `C4`).
#[derive(Debug, Clone, Copy)]
pub struct NoRepeatSameDay;

impl ConstraintRule for NoRepeatSameDay {
    fn family(&self) -> ConstraintFamily {
        ConstraintFamily::NoRepeatSameDay
    }

    fn scope(&self) -> AxisSet {
        AxisSet::of(&[Axis::Day, Axis::Group, Axis::CourseUnit])
    }

    fn is_active(&self, params: &ConstraintParameters) -> bool {
        params.no_repeat_same_day
    }

    fn generate(&self, ctx: &RuleContext<'_>, out: &mut Vec<LinearConstraint>) {
        ctx.emit_sums(self.family(), self.scope(), Sense::LessEqual, |_| Some(1), out);
    }

    fn description(&self) -> &'static str {
        "At most one lesson per (day, group, course-unit)"
    }
}

// ======================== Forced-zero rules ========================

/// No lessons in a group's blackout slots.
#[derive(Debug, Clone, Copy)]
pub struct GroupBlackout;

impl ConstraintRule for GroupBlackout {
    fn family(&self) -> ConstraintFamily {
        ConstraintFamily::GroupBlackout
    }

    fn scope(&self) -> AxisSet {
        AxisSet::of(&[Axis::Group, Axis::Day, Axis::Block])
    }

    fn generate(&self, ctx: &RuleContext<'_>, out: &mut Vec<LinearConstraint>) {
        let snapshot = ctx.snapshot;
        ctx.emit_forced_zero(
            self.family(),
            self.scope(),
            |k| snapshot.group_blackout(k.group()).contains(k.slot()),
            out,
        );
    }

    fn description(&self) -> &'static str {
        "Group unavailable slots are empty"
    }
}

/// No lessons in a professor's blackout slots.
#[derive(Debug, Clone, Copy)]
pub struct ProfessorBlackout;

impl ConstraintRule for ProfessorBlackout {
    fn family(&self) -> ConstraintFamily {
        ConstraintFamily::ProfessorBlackout
    }

    fn scope(&self) -> AxisSet {
        AxisSet::of(&[Axis::Professor, Axis::Day, Axis::Block])
    }

    fn generate(&self, ctx: &RuleContext<'_>, out: &mut Vec<LinearConstraint>) {
        let snapshot = ctx.snapshot;
        ctx.emit_forced_zero(
            self.family(),
            self.scope(),
            |k| snapshot.professor_blackout(k.professor()).contains(k.slot()),
            out,
        );
    }

    fn description(&self) -> &'static str {
        "Professor unavailable slots are empty"
    }
}

/// Room-restricted course-units are held only in their rooms.
#[derive(Debug, Clone, Copy)]
pub struct RoomEligibility;

impl ConstraintRule for RoomEligibility {
    fn family(&self) -> ConstraintFamily {
        ConstraintFamily::RoomEligibility
    }

    fn scope(&self) -> AxisSet {
        AxisSet::of(&[Axis::CourseUnit, Axis::Classroom])
    }

    fn generate(&self, ctx: &RuleContext<'_>, out: &mut Vec<LinearConstraint>) {
        let snapshot = ctx.snapshot;
        ctx.emit_forced_zero(
            self.family(),
            self.scope(),
            |k| !snapshot.is_room_eligible(k.course_unit(), k.classroom()),
            out,
        );
    }

    fn description(&self) -> &'static str {
        "Course-units with a room list use only those rooms"
    }
}

/// Groups take only course-units in their curriculum.
#[derive(Debug, Clone, Copy)]
pub struct CurriculumMembership;

impl ConstraintRule for CurriculumMembership {
    fn family(&self) -> ConstraintFamily {
        ConstraintFamily::CurriculumMembership
    }

    fn scope(&self) -> AxisSet {
        AxisSet::of(&[Axis::Group, Axis::CourseUnit])
    }

    fn generate(&self, ctx: &RuleContext<'_>, out: &mut Vec<LinearConstraint>) {
        let snapshot = ctx.snapshot;
        ctx.emit_forced_zero(
            self.family(),
            self.scope(),
            |k| !snapshot.in_curriculum(k.group(), k.course_unit()),
            out,
        );
    }

    fn description(&self) -> &'static str {
        "Groups take only curriculum course-units"
    }
}

/// Professors teach only the (group, course-unit) pairs they are eligible for.
#[derive(Debug, Clone, Copy)]
pub struct ProfessorEligibility;

impl ConstraintRule for ProfessorEligibility {
    fn family(&self) -> ConstraintFamily {
        ConstraintFamily::ProfessorEligibility
    }

    fn scope(&self) -> AxisSet {
        AxisSet::of(&[Axis::Professor, Axis::Group, Axis::CourseUnit])
    }

    fn generate(&self, ctx: &RuleContext<'_>, out: &mut Vec<LinearConstraint>) {
        let snapshot = ctx.snapshot;
        ctx.emit_forced_zero(
            self.family(),
            self.scope(),
            |k| !snapshot.is_professor_eligible(k.professor(), k.group(), k.course_unit()),
            out,
        );
    }

    fn description(&self) -> &'static str {
        "Professors teach only eligible (group, course-unit) pairs"
    }
}

/// Groups never use a room smaller than the group (toggle `C5`).
#[derive(Debug, Clone, Copy)]
pub struct RoomCapacityFit;

impl ConstraintRule for RoomCapacityFit {
    fn family(&self) -> ConstraintFamily {
        ConstraintFamily::RoomCapacityFit
    }

    fn scope(&self) -> AxisSet {
        AxisSet::of(&[Axis::Group, Axis::Classroom])
    }

    fn is_active(&self, params: &ConstraintParameters) -> bool {
        params.enforce_room_capacity
    }

    fn generate(&self, ctx: &RuleContext<'_>, out: &mut Vec<LinearConstraint>) {
        let snapshot = ctx.snapshot;
        ctx.emit_forced_zero(
            self.family(),
            self.scope(),
            |k| {
                let room = &snapshot.classrooms()[k.classroom()];
                !room.fits(snapshot.groups()[k.group()].size)
            },
            out,
        );
    }

    fn description(&self) -> &'static str {
        "Group size fits classroom capacity"
    }
}
