//! Error taxonomy for the laboratory core.
//!
//! Every error here is a local precondition violation: there is no retry
//! policy, and callers are expected to validate before invoking and surface
//! these as user-facing messages. Nothing in the core silently swallows one
//! of these; the guess tracker's no-match no-op is the single intentional
//! silent path and is documented at its definition site.

use thiserror::Error;

use crate::graph::GraphError;

/// Errors surfaced by experimental setups, enumerators, and oracles.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LabError {
    /// Variable name not present in the experimental setup or dataset.
    #[error("variable '{0}' is not part of this experimental setup")]
    UnknownVariable(String),

    /// Illegal manipulation attempted on a latent or error variable.
    #[error("variable '{name}' cannot be manipulated: {reason}")]
    InvalidManipulation { name: String, reason: String },

    /// Lock value outside the variable's declared domain.
    #[error("invalid lock value for variable '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    /// A combination was requested with fewer than two studied variables.
    #[error("independence combinations require at least 2 studied variables, found {found}")]
    InsufficientVariables { found: usize },

    /// A row index past the end of the enumeration.
    #[error("row {row} is out of range for {row_count} independence combinations")]
    RowOutOfRange { row: usize, row_count: usize },

    /// The statistical oracle could not match the sample to a test.
    #[error("no conditional-independence test available for this sample: {0}")]
    UnsupportedSampleType(String),

    /// The sample cannot support the requested test (too few rows, or a
    /// singular correlation structure).
    #[error("degenerate sample: {0}")]
    DegenerateSample(String),

    /// Underlying causal-graph failure.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LabError>;
