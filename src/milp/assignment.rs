//! 0/1 valuation of lesson variables.

use serde::{Deserialize, Serialize};

use super::index::{Dimensions, LessonKey};
use crate::error::{TimetableError, TimetableResult};

/// Solver output: one boolean per lesson variable, in flat index order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    values: Vec<bool>,
}

impl Assignment {
    pub fn new(values: Vec<bool>) -> Self {
        Self { values }
    }

    /// All variables at zero.
    pub fn zeros(len: usize) -> Self {
        Self {
            values: vec![false; len],
        }
    }

    /// Sets the given keys to one, everything else to zero.
    pub fn from_keys(dims: &Dimensions, keys: impl IntoIterator<Item = LessonKey>) -> Self {
        let mut assignment = Self::zeros(dims.len());
        for key in keys {
            assignment.values[dims.index_of(&key)] = true;
        }
        assignment
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a variable; out-of-range indices read as zero.
    #[inline]
    pub fn value(&self, index: usize) -> bool {
        self.values.get(index).copied().unwrap_or(false)
    }

    pub fn set(&mut self, index: usize, value: bool) {
        self.values[index] = value;
    }

    /// Number of variables at one.
    pub fn active_count(&self) -> usize {
        self.values.iter().filter(|&&v| v).count()
    }

    /// Indices of variables at one.
    pub fn active_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v)
            .map(|(i, _)| i)
    }

    /// Keys of variables at one, in flat index order.
    pub fn active_keys<'a>(&'a self, dims: &'a Dimensions) -> impl Iterator<Item = LessonKey> + 'a {
        self.active_indices().map(move |i| dims.key_at(i))
    }

    /// Checks the assignment covers exactly the domain of `dims`.
    ///
    /// # Errors
    /// `DomainMismatch` when the lengths differ.
    pub fn check_domain(&self, dims: &Dimensions) -> TimetableResult<()> {
        if self.values.len() != dims.len() {
            return Err(TimetableError::DomainMismatch {
                expected: dims.len(),
                actual: self.values.len(),
            });
        }
        Ok(())
    }
}
