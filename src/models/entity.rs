//! Timetabling entities.
//!
//! Classrooms, groups, professors, and course-units are immutable inputs
//! for one scheduling cycle. Identity is the string `id`; position in the
//! snapshot's ordered lists is what the model indexes by.

use serde::{Deserialize, Serialize};

/// A room lessons can be held in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classroom {
    /// Unique classroom identifier.
    pub id: String,
    /// Seats available.
    pub capacity: u32,
}

impl Classroom {
    pub fn new(id: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            capacity,
        }
    }

    /// Whether a group of `size` students fits.
    #[inline]
    pub fn fits(&self, size: u32) -> bool {
        size <= self.capacity
    }
}

/// A student group (class) that attends lessons together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Unique group identifier.
    pub id: String,
    /// Number of students.
    pub size: u32,
}

impl Group {
    pub fn new(id: impl Into<String>, size: u32) -> Self {
        Self {
            id: id.into(),
            size,
        }
    }
}

/// A teaching professor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Professor {
    pub id: String,
}

impl Professor {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// An academic subject (course-unit).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseUnit {
    pub id: String,
}

impl CourseUnit {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}
