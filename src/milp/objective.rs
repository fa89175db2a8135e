//! Objective weights for lesson variables.
//!
//! The objective maximises `Σ weight(key) · x[key]`. Weights encode a
//! strict lexicographic preference: earlier day, then earlier block, then
//! a better room-size fit. Each tier is scaled by the span of the tiers
//! below it, so one unit of a higher tier always outweighs any
//! combination of lower tiers.
//!
//! ```text
//! roomSpan  = base + 1
//! blockSpan = (max blockWeight + 1) · roomSpan
//! weight    = dayWeight · blockSpan + blockWeight · roomSpan + roomSizeBonus
//! ```
//!
//! A room with `base` or more empty seats has a non-positive bonus. Its
//! lesson weight is the bonus alone, so such placements are never rewarded.

use serde::{Deserialize, Serialize};

use crate::error::{TimetableError, TimetableResult};
use crate::models::{Block, Day};

/// Largest lesson weight the backend represents exactly as `f64`.
pub const MAX_EXACT_WEIGHT: i64 = 1 << 53;

/// Tiered objective weights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveWeights {
    /// Per day, `Mon..Sat`. Higher = preferred.
    pub day_weights: [u32; Day::COUNT],
    /// Per block, `AM1..PM2`. Higher = preferred.
    pub block_weights: [u32; Block::COUNT],
    /// Room-size bonus for a perfect fit.
    pub room_fit_base: u32,
    /// Room-size bonus for a room that is too small.
    pub room_fit_floor: u32,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            day_weights: [5, 4, 3, 2, 1, 0],
            block_weights: [3, 2, 1, 0],
            room_fit_base: 40,
            room_fit_floor: 1,
        }
    }
}

impl ObjectiveWeights {
    /// Creates the default weights.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_day_weights(mut self, weights: [u32; Day::COUNT]) -> Self {
        self.day_weights = weights;
        self
    }

    pub fn with_block_weights(mut self, weights: [u32; Block::COUNT]) -> Self {
        self.block_weights = weights;
        self
    }

    /// Sets the room-fit bonus range.
    pub fn with_room_fit(mut self, base: u32, floor: u32) -> Self {
        self.room_fit_base = base;
        self.room_fit_floor = floor;
        self
    }

    /// Checks that the tiers stay strictly ordered and exactly representable.
    ///
    /// # Errors
    /// `Config` when `room_fit_floor` is outside `1..=room_fit_base`, or when
    /// the largest lesson weight exceeds [`MAX_EXACT_WEIGHT`].
    pub fn validate(&self) -> TimetableResult<()> {
        if self.room_fit_floor == 0 || self.room_fit_floor > self.room_fit_base {
            return Err(TimetableError::Config(format!(
                "room_fit_floor ({}) must be between 1 and room_fit_base ({})",
                self.room_fit_floor, self.room_fit_base
            )));
        }
        match self.max_lesson_weight() {
            Some(max) if max <= MAX_EXACT_WEIGHT => Ok(()),
            _ => Err(TimetableError::Config(format!(
                "objective weights too large: a lesson weight exceeds {MAX_EXACT_WEIGHT}"
            ))),
        }
    }

    /// Largest possible lesson weight, or `None` on overflow.
    pub fn max_lesson_weight(&self) -> Option<i64> {
        let max_day = self.day_weights.iter().copied().max().unwrap_or(0);
        let max_block = self.block_weights.iter().copied().max().unwrap_or(0);
        let room_span = i64::from(self.room_fit_base).checked_add(1)?;
        let block_span = (i64::from(max_block) + 1).checked_mul(room_span)?;
        i64::from(max_day)
            .checked_mul(block_span)?
            .checked_add(i64::from(max_block).checked_mul(room_span)?)?
            .checked_add(i64::from(self.room_fit_base))
    }

    /// Room-size bonus of placing a group of `size` in a room of `capacity`.
    ///
    /// Too-small rooms get the floor. Otherwise the bonus shrinks by one per
    /// empty seat and turns negative past `room_fit_base` empty seats.
    pub fn room_size_bonus(&self, capacity: u32, size: u32) -> i64 {
        if capacity < size {
            return i64::from(self.room_fit_floor);
        }
        i64::from(self.room_fit_base) - i64::from(capacity - size)
    }

    pub fn room_span(&self) -> i64 {
        i64::from(self.room_fit_base) + 1
    }

    pub fn block_span(&self) -> i64 {
        let max_block = self.block_weights.iter().copied().max().unwrap_or(0);
        (i64::from(max_block) + 1).saturating_mul(self.room_span())
    }

    /// Weight of one lesson variable.
    ///
    /// Saturates instead of overflowing; [`validate`](Self::validate) bounds
    /// every weight well below that.
    pub fn lesson_weight(&self, day: Day, block: Block, capacity: u32, size: u32) -> i64 {
        let bonus = self.room_size_bonus(capacity, size);
        if bonus <= 0 {
            return bonus;
        }
        let day_weight = i64::from(self.day_weights[day.index()]);
        let block_weight = i64::from(self.block_weights[block.index()]);
        let day_tier = day_weight.saturating_mul(self.block_span());
        let block_tier = block_weight.saturating_mul(self.room_span());
        day_tier.saturating_add(block_tier).saturating_add(bonus)
    }
}
