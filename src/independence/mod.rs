//! Independence hypotheses over studied variables
//!
//! Everything about testable independence statements lives here:
//! - [`enumerate`]: the bijection between a linear row index and a
//!   (first variable, second variable, conditioning set) combination
//! - [`oracle`]: verdicts from a manipulated graph (d-separation) or a
//!   sample (conditional-independence test)
//! - [`guess`]: the user's recorded guesses, keyed structurally so they
//!   survive re-enumeration when the studied set changes

pub mod enumerate;
pub mod guess;
pub mod oracle;

pub use enumerate::IndependenceEnumerator;
pub use guess::{Guess, GuessedIndependenceTracker};
pub use oracle::{IndependenceOracle, Verdict};

use std::fmt;

use serde::{Deserialize, Serialize};

/// One testable independence statement: X ⊥⊥ Y | Z.
///
/// Equality is structural and position-sensitive, including the order of
/// the conditioning set as emitted by the enumerator.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndependenceCombination {
    /// First variable of the pair.
    pub first: String,
    /// Second variable of the pair.
    pub second: String,
    /// Conditioning variables, disjoint from the pair, in studied order.
    pub conditioning: Vec<String>,
}

impl IndependenceCombination {
    /// Build a combination from name-like parts.
    pub fn new<S: Into<String>>(
        first: impl Into<String>,
        second: impl Into<String>,
        conditioning: impl IntoIterator<Item = S>,
    ) -> Self {
        IndependenceCombination {
            first: first.into(),
            second: second.into(),
            conditioning: conditioning.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for IndependenceCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} _||_ {}", self.first, self.second)?;
        if !self.conditioning.is_empty() {
            write!(f, " | {}", self.conditioning.join(", "))?;
        }
        Ok(())
    }
}
