//! Lesson variable indexing.
//!
//! The variable domain is the full cartesian product
//! `day × block × classroom × group × professor × course-unit`. A
//! [`LessonKey`] is one coordinate in that product, [`Dimensions`] maps
//! keys to flat variable indices (mixed radix, day-major), and
//! [`Subspace`] enumerates keys that vary along a chosen set of axes while
//! the other coordinates stay pinned to an anchor key.
//!
//! Constraint rules iterate the subspace of their scope axes to find one
//! anchor per constraint, then the subspace of the complementary axes to
//! collect that constraint's variables.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{Block, Day, Snapshot, TimeSlot};

const AXES: usize = 6;

/// One dimension of the variable domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Axis {
    Day,
    Block,
    Classroom,
    Group,
    Professor,
    CourseUnit,
}

impl Axis {
    /// Axes from outermost (slowest) to innermost (fastest).
    pub const ALL: [Axis; AXES] = [
        Axis::Day,
        Axis::Block,
        Axis::Classroom,
        Axis::Group,
        Axis::Professor,
        Axis::CourseUnit,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A set of axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AxisSet(u8);

impl AxisSet {
    pub const EMPTY: AxisSet = AxisSet(0);
    pub const ALL: AxisSet = AxisSet((1 << AXES) - 1);

    pub fn of(axes: &[Axis]) -> Self {
        axes.iter().fold(Self::EMPTY, |set, &a| set.with(a))
    }

    pub fn with(self, axis: Axis) -> Self {
        AxisSet(self.0 | (1 << axis.index()))
    }

    pub fn contains(self, axis: Axis) -> bool {
        self.0 & (1 << axis.index()) != 0
    }

    /// Axes not in this set.
    pub fn complement(self) -> Self {
        AxisSet(!self.0 & Self::ALL.0)
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Axis> {
        Axis::ALL.into_iter().filter(move |&a| self.contains(a))
    }
}

/// Coordinate of one lesson variable.
///
/// Entity coordinates are indices into the snapshot's entity lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LessonKey {
    coords: [usize; AXES],
}

impl LessonKey {
    pub fn new(
        slot: TimeSlot,
        classroom: usize,
        group: usize,
        professor: usize,
        course_unit: usize,
    ) -> Self {
        Self {
            coords: [
                slot.day.index(),
                slot.block.index(),
                classroom,
                group,
                professor,
                course_unit,
            ],
        }
    }

    #[inline]
    pub fn get(&self, axis: Axis) -> usize {
        self.coords[axis.index()]
    }

    /// Returns a copy with one coordinate replaced.
    pub fn with(mut self, axis: Axis, value: usize) -> Self {
        self.coords[axis.index()] = value;
        self
    }

    pub fn day(&self) -> Day {
        Day::ALL[self.get(Axis::Day)]
    }

    pub fn block(&self) -> Block {
        Block::ALL[self.get(Axis::Block)]
    }

    pub fn slot(&self) -> TimeSlot {
        TimeSlot::new(self.day(), self.block())
    }

    pub fn classroom(&self) -> usize {
        self.get(Axis::Classroom)
    }

    pub fn group(&self) -> usize {
        self.get(Axis::Group)
    }

    pub fn professor(&self) -> usize {
        self.get(Axis::Professor)
    }

    pub fn course_unit(&self) -> usize {
        self.get(Axis::CourseUnit)
    }
}

impl fmt::Display for LessonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, c{}, g{}, p{}, u{})",
            self.slot(),
            self.classroom(),
            self.group(),
            self.professor(),
            self.course_unit()
        )
    }
}

/// Sizes of the six axes of the variable domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    sizes: [usize; AXES],
}

impl Dimensions {
    /// Creates dimensions for the given entity counts.
    pub fn new(classrooms: usize, groups: usize, professors: usize, course_units: usize) -> Self {
        Self {
            sizes: [Day::COUNT, Block::COUNT, classrooms, groups, professors, course_units],
        }
    }

    /// Dimensions of a snapshot's full product.
    pub fn of_snapshot(snapshot: &Snapshot) -> Self {
        Self::new(
            snapshot.classrooms().len(),
            snapshot.groups().len(),
            snapshot.professors().len(),
            snapshot.course_units().len(),
        )
    }

    pub fn size(&self, axis: Axis) -> usize {
        self.sizes[axis.index()]
    }

    /// Number of variables (product of all axis sizes).
    pub fn len(&self) -> usize {
        self.sizes.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether every coordinate of `key` is in range.
    pub fn contains(&self, key: &LessonKey) -> bool {
        key.coords.iter().zip(&self.sizes).all(|(c, s)| c < s)
    }

    /// Flat variable index of a key.
    #[inline]
    pub fn index_of(&self, key: &LessonKey) -> usize {
        key.coords
            .iter()
            .zip(&self.sizes)
            .fold(0, |acc, (&c, &s)| acc * s + c)
    }

    /// Inverse of [`index_of`](Self::index_of).
    pub fn key_at(&self, mut index: usize) -> LessonKey {
        let mut coords = [0; AXES];
        for axis in Axis::ALL.iter().rev() {
            let size = self.sizes[axis.index()];
            coords[axis.index()] = index % size;
            index /= size;
        }
        LessonKey { coords }
    }

    /// Number of keys a subspace over `free` yields.
    pub fn subspace_len(&self, free: AxisSet) -> usize {
        free.iter().map(|a| self.size(a)).product()
    }

    /// Keys varying along `free`, other coordinates taken from `anchor`.
    ///
    /// Iteration order is lexicographic with the innermost axis fastest.
    /// The iterator is lazy and can be cloned to restart from the same
    /// position. An empty `free` set yields `anchor` alone.
    pub fn subspace(&self, free: AxisSet, anchor: LessonKey) -> Subspace {
        let mut start = anchor.coords;
        let mut exhausted = false;
        for axis in free.iter() {
            if self.size(axis) == 0 {
                exhausted = true;
            }
            start[axis.index()] = 0;
        }
        Subspace {
            sizes: self.sizes,
            free,
            next: if exhausted { None } else { Some(start) },
        }
    }

    /// Every key of the domain in flat index order.
    pub fn keys(&self) -> Subspace {
        self.subspace(AxisSet::ALL, LessonKey::default())
    }
}

/// Lazy odometer over a subspace of the domain.
#[derive(Debug, Clone)]
pub struct Subspace {
    sizes: [usize; AXES],
    free: AxisSet,
    next: Option<[usize; AXES]>,
}

impl Iterator for Subspace {
    type Item = LessonKey;

    fn next(&mut self) -> Option<LessonKey> {
        let coords = self.next?;

        let mut advanced = coords;
        let mut carried = true;
        for axis in Axis::ALL.iter().rev() {
            if !self.free.contains(*axis) {
                continue;
            }
            let i = axis.index();
            advanced[i] += 1;
            if advanced[i] < self.sizes[i] {
                carried = false;
                break;
            }
            advanced[i] = 0;
        }
        self.next = if carried { None } else { Some(advanced) };

        Some(LessonKey { coords })
    }
}
