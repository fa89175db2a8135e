//! Linear constraints over lesson variables.
//!
//! Every rule in the constraint library emits [`LinearConstraint`]s tagged
//! with a [`ConstraintFamily`], so a model can be summarised, audited, and
//! diagnosed per rule.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The rule a constraint was generated by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConstraintFamily {
    /// Σ lessons per (group, course-unit) ≤ C1.
    CurriculumCap,
    /// Σ lessons per (day, block, classroom) ≤ 1.
    OneLessonPerRoomSlot,
    /// Σ lessons per (group, day, block) ≤ 1.
    NoGroupOverlap,
    /// Σ lessons per (professor, day, block) ≤ 1.
    NoProfessorOverlap,
    /// Σ lessons per professor ≤ C2.
    ProfessorWeeklyCap,
    /// Σ lessons per (professor, day) ≤ C3.
    ProfessorDailyCap,
    /// Σ lessons per (day, group, course-unit) ≤ 1, when C4 is on.
    NoRepeatSameDay,
    /// Lessons in a group's blackout slots = 0.
    GroupBlackout,
    /// Lessons in a professor's blackout slots = 0.
    ProfessorBlackout,
    /// Lessons of a room-restricted course-unit in other rooms = 0.
    RoomEligibility,
    /// Lessons of course-units outside the group's curriculum = 0.
    CurriculumMembership,
    /// Lessons of (group, course-unit) pairs the professor may not teach = 0.
    ProfessorEligibility,
    /// Lessons of a group in a smaller room = 0, when C5 is on.
    RoomCapacityFit,
    /// Σ lessons per (group, curriculum course-unit) ≥ C6, when set.
    CurriculumFloor,
}

impl ConstraintFamily {
    /// All families in generation order.
    pub const ALL: [ConstraintFamily; 14] = [
        ConstraintFamily::CurriculumCap,
        ConstraintFamily::OneLessonPerRoomSlot,
        ConstraintFamily::NoGroupOverlap,
        ConstraintFamily::NoProfessorOverlap,
        ConstraintFamily::ProfessorWeeklyCap,
        ConstraintFamily::ProfessorDailyCap,
        ConstraintFamily::NoRepeatSameDay,
        ConstraintFamily::GroupBlackout,
        ConstraintFamily::ProfessorBlackout,
        ConstraintFamily::RoomEligibility,
        ConstraintFamily::CurriculumMembership,
        ConstraintFamily::ProfessorEligibility,
        ConstraintFamily::RoomCapacityFit,
        ConstraintFamily::CurriculumFloor,
    ];

    /// Whether the family pins single variables to zero.
    pub fn is_forced_zero(self) -> bool {
        matches!(
            self,
            ConstraintFamily::GroupBlackout
                | ConstraintFamily::ProfessorBlackout
                | ConstraintFamily::RoomEligibility
                | ConstraintFamily::CurriculumMembership
                | ConstraintFamily::ProfessorEligibility
                | ConstraintFamily::RoomCapacityFit
        )
    }
}

impl fmt::Display for ConstraintFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Relation between the left-hand sum and the right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sense {
    LessEqual,
    Equal,
    GreaterEqual,
}

impl Sense {
    /// Whether `lhs <sense> rhs` holds.
    #[inline]
    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Sense::LessEqual => lhs <= rhs,
            Sense::Equal => lhs == rhs,
            Sense::GreaterEqual => lhs >= rhs,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Sense::LessEqual => "<=",
            Sense::Equal => "=",
            Sense::GreaterEqual => ">=",
        }
    }
}

/// `Σ coefficient · x[var] <sense> rhs` over lesson variables.
///
/// `vars` are flat variable indices (see [`Dimensions`](crate::milp::Dimensions)).
/// All library rules use unit coefficients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearConstraint {
    pub family: ConstraintFamily,
    pub terms: Vec<(usize, i64)>,
    pub sense: Sense,
    pub rhs: i64,
}

impl LinearConstraint {
    /// Unit-coefficient sum `Σ x[v] <sense> rhs`.
    pub fn sum(
        family: ConstraintFamily,
        vars: impl IntoIterator<Item = usize>,
        sense: Sense,
        rhs: i64,
    ) -> Self {
        Self {
            family,
            terms: vars.into_iter().map(|v| (v, 1)).collect(),
            sense,
            rhs,
        }
    }

    /// Pins one variable to zero.
    pub fn forced_zero(family: ConstraintFamily, var: usize) -> Self {
        Self {
            family,
            terms: vec![(var, 1)],
            sense: Sense::Equal,
            rhs: 0,
        }
    }

    /// Left-hand side under a 0/1 valuation.
    pub fn lhs(&self, value: impl Fn(usize) -> bool) -> i64 {
        self.terms
            .iter()
            .filter(|(v, _)| value(*v))
            .map(|(_, c)| *c)
            .sum()
    }

    /// Whether the constraint holds under a 0/1 valuation.
    pub fn is_satisfied(&self, value: impl Fn(usize) -> bool) -> bool {
        self.sense.holds(self.lhs(value), self.rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_constraint() {
        let c = LinearConstraint::sum(
            ConstraintFamily::NoGroupOverlap,
            [0, 2, 4],
            Sense::LessEqual,
            1,
        );
        assert_eq!(c.terms.len(), 3);
        assert!(c.is_satisfied(|v| v == 2));
        assert!(!c.is_satisfied(|v| v == 2 || v == 4));
        assert!(c.is_satisfied(|_| false));
    }

    #[test]
    fn test_forced_zero() {
        let c = LinearConstraint::forced_zero(ConstraintFamily::GroupBlackout, 7);
        assert!(c.is_satisfied(|v| v != 7));
        assert!(!c.is_satisfied(|v| v == 7));
        assert!(c.family.is_forced_zero());
    }

    #[test]
    fn test_floor_sense() {
        let c = LinearConstraint::sum(
            ConstraintFamily::CurriculumFloor,
            [1, 3],
            Sense::GreaterEqual,
            1,
        );
        assert!(!c.is_satisfied(|_| false));
        assert!(c.is_satisfied(|v| v == 3));
        assert!(!ConstraintFamily::CurriculumFloor.is_forced_zero());
    }
}
