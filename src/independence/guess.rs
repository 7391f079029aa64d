//! User guesses about independence
//!
//! The tracker records the student's ternary verdict for each enumerated
//! combination. Slots are keyed by structural equality of the combination
//! (both pair names and the full ordered conditioning set), not by row
//! index, so recorded guesses survive re-enumerations that shift indices.
//!
//! Setting a guess for a combination the tracker does not hold is a
//! silent no-op by design: the studied set may have changed between the
//! tracker's construction and the call, removing or reordering rows.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{IndependenceCombination, IndependenceEnumerator};

/// The student's ternary verdict on one combination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Guess {
    /// No guess recorded yet.
    #[default]
    Unset,
    /// Guessed independent.
    Independent,
    /// Guessed dependent.
    Dependent,
}

impl Guess {
    /// The boolean claim, if one has been recorded.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Guess::Unset => None,
            Guess::Independent => Some(true),
            Guess::Dependent => Some(false),
        }
    }
}

/// Sparse record of guesses over a fixed enumeration.
#[derive(Clone, Debug, Default)]
pub struct GuessedIndependenceTracker {
    /// Combinations in row order, each with its current guess.
    slots: Vec<(IndependenceCombination, Guess)>,
    /// Structural index into `slots`.
    index: FxHashMap<IndependenceCombination, usize>,
}

impl GuessedIndependenceTracker {
    /// Pre-enumerate all rows of an enumerator, one unset slot per row.
    ///
    /// An enumerator with fewer than two studied variables yields an
    /// empty tracker.
    pub fn new(enumerator: &IndependenceEnumerator) -> Self {
        let slots: Vec<(IndependenceCombination, Guess)> = enumerator
            .combinations()
            .map(|combo| (combo, Guess::Unset))
            .collect();
        let index = slots
            .iter()
            .enumerate()
            .map(|(i, (combo, _))| (combo.clone(), i))
            .collect();
        GuessedIndependenceTracker { slots, index }
    }

    /// Number of tracked combinations.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the tracker holds no combinations.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The recorded guess for a combination; `Unset` when the combination
    /// is unknown or nothing has been recorded.
    pub fn guess(&self, combination: &IndependenceCombination) -> Guess {
        self.index
            .get(combination)
            .map(|&i| self.slots[i].1)
            .unwrap_or_default()
    }

    /// The recorded boolean claim, if any.
    pub fn is_independent(&self, combination: &IndependenceCombination) -> Option<bool> {
        self.guess(combination).as_bool()
    }

    /// Record a guess for the matching combination.
    ///
    /// Silently does nothing when no slot matches; see the module docs.
    pub fn set_independent(&mut self, independent: bool, combination: &IndependenceCombination) {
        match self.index.get(combination) {
            Some(&i) => {
                self.slots[i].1 = if independent {
                    Guess::Independent
                } else {
                    Guess::Dependent
                };
            }
            None => {
                trace!(combination = %combination, "guess for unknown combination ignored");
            }
        }
    }

    /// Clear the guess for the matching combination, if any.
    pub fn clear(&mut self, combination: &IndependenceCombination) {
        if let Some(&i) = self.index.get(combination) {
            self.slots[i].1 = Guess::Unset;
        }
    }

    /// Combinations with their guesses, in row order.
    pub fn entries(&self) -> impl Iterator<Item = (&IndependenceCombination, Guess)> {
        self.slots.iter().map(|(combo, guess)| (combo, *guess))
    }
}
