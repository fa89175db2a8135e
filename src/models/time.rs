//! Weekly time grid.
//!
//! The teaching week is fixed: six days (`Mon..Sat`) of four two-hour
//! blocks (`AM1, AM2, PM1, PM2`), 24 slots in total. Ordering is
//! day-major everywhere in the crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A teaching day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Day {
    /// All days in week order.
    pub const ALL: [Day; 6] = [Day::Mon, Day::Tue, Day::Wed, Day::Thu, Day::Fri, Day::Sat];

    /// Number of days in the teaching week.
    pub const COUNT: usize = 6;

    /// Position in the week (Mon = 0).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Day at position `index`, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Short label (`"Mon"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Day::Mon => "Mon",
            Day::Tue => "Tue",
            Day::Wed => "Wed",
            Day::Thu => "Thu",
            Day::Fri => "Fri",
            Day::Sat => "Sat",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown day '{s}'"))
    }
}

/// A two-hour teaching block within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Block {
    AM1,
    AM2,
    PM1,
    PM2,
}

impl Block {
    /// All blocks in day order.
    pub const ALL: [Block; 4] = [Block::AM1, Block::AM2, Block::PM1, Block::PM2];

    /// Number of blocks per day.
    pub const COUNT: usize = 4;

    /// Position in the day (AM1 = 0).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Block at position `index`, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Block::AM1 => "AM1",
            Block::AM2 => "AM2",
            Block::PM1 => "PM1",
            Block::PM2 => "PM2",
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Block {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown block '{s}'"))
    }
}

/// A (day, block) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    pub day: Day,
    pub block: Block,
}

impl TimeSlot {
    /// Total number of slots in the week.
    pub const COUNT: usize = Day::COUNT * Block::COUNT;

    pub fn new(day: Day, block: Block) -> Self {
        Self { day, block }
    }

    /// Day-major position in the week (Mon AM1 = 0, Sat PM2 = 23).
    #[inline]
    pub fn index(self) -> usize {
        self.day.index() * Block::COUNT + self.block.index()
    }

    /// All 24 slots in day-major order.
    pub fn all() -> impl Iterator<Item = TimeSlot> + Clone {
        Day::ALL
            .into_iter()
            .flat_map(|day| Block::ALL.into_iter().map(move |block| TimeSlot { day, block }))
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day, self.block)
    }
}
