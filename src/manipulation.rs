//! Experimental manipulations
//!
//! A manipulation is the qualitative intervention an experimenter applies
//! to one variable:
//! - `None` — the variable follows its natural causes
//! - `Randomized` — the value is drawn independently per sample unit from a
//!   caller-chosen distribution
//! - `Locked` — the value is forced to a constant for all sample units
//! - `Latent` / `Error` — markers for variables that cannot be manipulated
//!
//! Kinds are a tagged union with exhaustive matching at call sites; the
//! legality of a transition (a latent or error variable can never become
//! locked or randomized) is enforced by [`crate::setup::ExperimentalSetup`],
//! which knows the underlying node kind.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LabError, Result};

/// Distribution a randomized variable is drawn from.
///
/// Which shape is sampled is a caller configuration choice; the laboratory
/// core only carries the parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Distribution {
    /// Uniform over [lower, upper].
    Uniform { lower: f64, upper: f64 },
    /// Normal with the given mean and standard deviation.
    Normal { mean: f64, std_dev: f64 },
}

impl Distribution {
    /// Mean of the distribution.
    pub fn mean(&self) -> f64 {
        match self {
            Distribution::Uniform { lower, upper } => (lower + upper) / 2.0,
            Distribution::Normal { mean, .. } => *mean,
        }
    }

    /// Variance of the distribution.
    pub fn variance(&self) -> f64 {
        match self {
            Distribution::Uniform { lower, upper } => (upper - lower).powi(2) / 12.0,
            Distribution::Normal { std_dev, .. } => std_dev.powi(2),
        }
    }
}

/// Value a locked variable is forced to.
///
/// Category membership is validated by the graph/IM layer, not here;
/// numeric values only need to be finite.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LockedValue {
    /// A category of a discrete variable, accepted as-is.
    Category(String),
    /// A numeric value of a continuous variable.
    Numeric(f64),
}

impl fmt::Display for LockedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockedValue::Category(c) => write!(f, "{}", c),
            LockedValue::Numeric(v) => write!(f, "{}", v),
        }
    }
}

/// Discriminant of a [`Manipulation`], without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManipulationKind {
    None,
    Randomized,
    Locked,
    Latent,
    Error,
}

impl fmt::Display for ManipulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ManipulationKind::None => "none",
            ManipulationKind::Randomized => "randomized",
            ManipulationKind::Locked => "locked",
            ManipulationKind::Latent => "latent",
            ManipulationKind::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// The manipulation state of one variable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum Manipulation {
    /// No manipulation; the variable follows its natural causes.
    #[default]
    None,
    /// Value drawn independently per sample unit.
    Randomized(Distribution),
    /// Value forced to a constant; `None` until a value is locked in.
    Locked(Option<LockedValue>),
    /// Unobserved variable marker; immutable.
    Latent,
    /// Measurement-error marker; immutable.
    Error,
}

impl Manipulation {
    /// Discriminant of this state.
    pub fn kind(&self) -> ManipulationKind {
        match self {
            Manipulation::None => ManipulationKind::None,
            Manipulation::Randomized(_) => ManipulationKind::Randomized,
            Manipulation::Locked(_) => ManipulationKind::Locked,
            Manipulation::Latent => ManipulationKind::Latent,
            Manipulation::Error => ManipulationKind::Error,
        }
    }

    /// Whether this state severs the variable from its natural causes.
    pub fn is_intervention(&self) -> bool {
        matches!(self, Manipulation::Randomized(_) | Manipulation::Locked(_))
    }

    /// Whether this state forbids any further manipulation.
    pub fn is_immutable(&self) -> bool {
        matches!(self, Manipulation::Latent | Manipulation::Error)
    }

    /// The locked value, if this state is `Locked` and a value has been set.
    pub fn locked_value(&self) -> Option<&LockedValue> {
        match self {
            Manipulation::Locked(v) => v.as_ref(),
            _ => None,
        }
    }

    /// Set or replace the value of a `Locked` state.
    ///
    /// Re-locking replaces the previous value. Fails with `InvalidValue`
    /// for a non-finite numeric value, and with `InvalidManipulation` when
    /// the state is not `Locked`. The `name` is only used for error
    /// reporting.
    pub fn set_locked_at(&mut self, name: &str, value: LockedValue) -> Result<()> {
        if let LockedValue::Numeric(v) = value {
            if !v.is_finite() {
                return Err(LabError::InvalidValue {
                    name: name.to_string(),
                    reason: format!("{} is not a finite number", v),
                });
            }
        }
        match self {
            Manipulation::Locked(slot) => {
                *slot = Some(value);
                Ok(())
            }
            other => Err(LabError::InvalidManipulation {
                name: name.to_string(),
                reason: format!("cannot lock a value on a '{}' state", other.kind()),
            }),
        }
    }
}
