//! Row enumeration of independence combinations
//!
//! For `p` studied variables there are `C(p,2) * 2^(p-2)` testable
//! independence statements: every unordered pair of distinct variables,
//! crossed with every subset of the remaining `p−2` variables as the
//! conditioning set. This module maps a linear row index to its
//! combination and back without materializing the full enumeration.
//!
//! The layout is pair-major: a pair's `2^(p-2)` conditioning subsets are
//! exhausted (in binary-counter order, least-significant bit on the
//! lowest-indexed non-pair variable) before the next pair begins. Pairs
//! `(i, j)` with `i < j` are ordered by increasing `i` and, within `i`,
//! increasing `j`. The mapping is a strict bijection for any fixed studied
//! ordering, independent of how many variables exist outside it.

use serde::{Deserialize, Serialize};

use super::IndependenceCombination;
use crate::error::{LabError, Result};
use crate::setup::ExperimentalSetup;

/// Enumerator over the independence combinations of a studied-variable
/// ordering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndependenceEnumerator {
    studied: Vec<String>,
}

impl IndependenceEnumerator {
    /// Create an enumerator over an explicit studied ordering.
    pub fn new(studied: Vec<String>) -> Self {
        IndependenceEnumerator { studied }
    }

    /// Create an enumerator over a setup's currently studied variables.
    pub fn from_setup(setup: &ExperimentalSetup) -> Self {
        Self::new(setup.studied_variable_names())
    }

    /// The studied ordering this enumerator ranges over.
    pub fn studied_names(&self) -> &[String] {
        &self.studied
    }

    /// Total number of combinations for `p` studied variables.
    ///
    /// Zero for fewer than two variables; never an error.
    pub fn row_count_for(p: usize) -> usize {
        if p < 2 {
            0
        } else {
            p * (p - 1) / 2 * (1usize << (p - 2))
        }
    }

    /// Total number of combinations for this enumerator.
    pub fn row_count(&self) -> usize {
        Self::row_count_for(self.studied.len())
    }

    /// Decode a row into the index triple `(i, j, bits)`.
    ///
    /// `i < j` are positions in the studied ordering; `bits` assigns one
    /// bit to each non-pair position in increasing order, bit 0 first.
    pub fn decode(&self, row: usize) -> Result<(usize, usize, usize)> {
        let p = self.studied.len();
        if p < 2 {
            return Err(LabError::InsufficientVariables { found: p });
        }
        let row_count = Self::row_count_for(p);
        if row >= row_count {
            return Err(LabError::RowOutOfRange { row, row_count });
        }

        let block = 1usize << (p - 2);
        let mut pair_index = row / block;
        let bits = row % block;

        // Walk first indices until the cumulative pair count covers
        // pair_index; p−1−i pairs start at first index i.
        let mut i = 0;
        while pair_index >= p - 1 - i {
            pair_index -= p - 1 - i;
            i += 1;
        }
        let j = i + 1 + pair_index;
        Ok((i, j, bits))
    }

    /// Re-encode an index triple into its row. Strict inverse of
    /// [`Self::decode`].
    ///
    /// # Panics
    ///
    /// With fewer than two studied variables there are no rows to encode
    /// into; the precondition is asserted.
    pub fn encode(&self, i: usize, j: usize, bits: usize) -> usize {
        let p = self.studied.len();
        assert!(
            p >= 2,
            "encode requires at least 2 studied variables, found {}",
            p
        );
        let block = 1usize << (p - 2);
        // Pairs preceding first index i: (p−1) + (p−2) + … + (p−i).
        let preceding: usize = (0..i).map(|t| p - 1 - t).sum();
        let pair_index = preceding + (j - i - 1);
        pair_index * block + bits
    }

    /// The combination at a row: variable names for the pair, plus the
    /// conditioning subset in increasing studied order.
    pub fn combination_at(&self, row: usize) -> Result<IndependenceCombination> {
        let (i, j, bits) = self.decode(row)?;

        let mut conditioning = Vec::new();
        let mut bit = 0;
        for (t, name) in self.studied.iter().enumerate() {
            if t == i || t == j {
                continue;
            }
            if bits & (1 << bit) != 0 {
                conditioning.push(name.clone());
            }
            bit += 1;
        }

        Ok(IndependenceCombination {
            first: self.studied[i].clone(),
            second: self.studied[j].clone(),
            conditioning,
        })
    }

    /// All combinations, in row order.
    pub fn combinations(&self) -> impl Iterator<Item = IndependenceCombination> + '_ {
        // Rows below row_count cannot fail to decode.
        (0..self.row_count()).filter_map(move |row| self.combination_at(row).ok())
    }
}
