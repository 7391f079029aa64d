//! Causalab: the independence-combinatorics core of a causal-inference
//! laboratory
//!
//! Students configure experiments on a hidden causal model, draw samples
//! under interventions, and test independence hypotheses against both the
//! true graph and their own guesses. This crate is the part of that
//! laboratory with real algorithmic content:
//!
//! ```text
//! CausalGraph ──► ExperimentalSetup ──► IndependenceEnumerator
//!                   (manipulations,        (row ↔ (X, Y, Z) bijection)
//!                    studied flags)               │
//!                        │                        ▼
//!                        ▼                IndependenceOracle
//!                 manipulated graph ──►   (d-separation | CI test)
//!                                                 │
//!                                                 ▼
//!                                     GuessedIndependenceTracker
//! ```
//!
//! # Example
//!
//! ```
//! use causalab::graph::{CausalGraph, GraphNode};
//! use causalab::independence::{IndependenceEnumerator, IndependenceOracle};
//! use causalab::setup::ExperimentalSetup;
//!
//! let mut graph = CausalGraph::new();
//! graph.add_node(GraphNode::measured("education"))?;
//! graph.add_node(GraphNode::measured("income"))?;
//! graph.add_node(GraphNode::measured("happiness"))?;
//! graph.add_edge("education", "income")?;
//! graph.add_edge("income", "happiness")?;
//!
//! let setup = ExperimentalSetup::new("observe", &graph);
//! let enumerator = IndependenceEnumerator::from_setup(&setup);
//! assert_eq!(enumerator.row_count(), 6);
//!
//! let manipulated = setup.apply_to_graph();
//! let oracle = IndependenceOracle::structural(&manipulated);
//! let combo = enumerator.combination_at(3)?; // education _||_ happiness | income
//! assert!(oracle.is_independent(&combo)?);
//! # Ok::<(), causalab::error::LabError>(())
//! ```
//!
//! The crate is single-threaded and synchronous; setups and guess trackers
//! mutate private in-memory state and carry no internal locking.

pub mod data;
pub mod error;
pub mod graph;
pub mod independence;
pub mod manipulation;
pub mod setup;
pub mod stats;

pub use data::{Dataset, SampleKind};
pub use error::{LabError, Result};
pub use graph::{CausalGraph, GraphNode, NodeKind};
pub use independence::{
    Guess, GuessedIndependenceTracker, IndependenceCombination, IndependenceEnumerator,
    IndependenceOracle, Verdict,
};
pub use manipulation::{Distribution, LockedValue, Manipulation, ManipulationKind};
pub use setup::{ExperimentalSetup, SetupVariable};
pub use stats::{ChiSquareTest, FisherZTest, IndependenceTest, TestResult, DEFAULT_ALPHA};
