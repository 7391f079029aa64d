//! Independence verdicts
//!
//! An [`IndependenceOracle`] answers one combination's independence claim
//! from whichever ground truth is available:
//! - a manipulated graph, via the d-separation oracle — deterministic,
//!   no p-value
//! - a sample, via the conditional-independence test matching the sample's
//!   generative type: chi-square for discrete data, Fisher-Z for
//!   continuous data
//!
//! Empty conditioning sets pass through both paths without special-casing.

use std::collections::HashSet;

use tracing::debug;

use super::IndependenceCombination;
use crate::data::{Dataset, SampleKind};
use crate::error::{LabError, Result};
use crate::graph::CausalGraph;
use crate::stats::{ChiSquareTest, FisherZTest, IndependenceTest, TestResult, DEFAULT_ALPHA};

/// A verdict on one independence combination.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Verdict {
    /// Graph-theoretic verdict: d-separated or not.
    Structural(bool),
    /// Sample-based verdict with its p-value.
    Statistical(TestResult),
}

impl Verdict {
    /// The boolean independence claim, whatever its source.
    pub fn is_independent(&self) -> bool {
        match self {
            Verdict::Structural(independent) => *independent,
            Verdict::Statistical(result) => result.independent,
        }
    }

    /// The p-value, if this verdict came from a statistical test.
    pub fn p_value(&self) -> Option<f64> {
        match self {
            Verdict::Structural(_) => None,
            Verdict::Statistical(result) => Some(result.p_value),
        }
    }
}

/// Ground truth an oracle evaluates against.
enum OracleSource<'a> {
    Graph(&'a CausalGraph),
    Sample(&'a Dataset),
}

/// Evaluates independence combinations against a graph or a sample.
pub struct IndependenceOracle<'a> {
    source: OracleSource<'a>,
    alpha: f64,
}

impl<'a> IndependenceOracle<'a> {
    /// Oracle over a (typically manipulated) graph's d-separation relation.
    pub fn structural(graph: &'a CausalGraph) -> Self {
        IndependenceOracle {
            source: OracleSource::Graph(graph),
            alpha: DEFAULT_ALPHA,
        }
    }

    /// Oracle over a sample, at the default significance level.
    pub fn statistical(sample: &'a Dataset) -> Self {
        IndependenceOracle {
            source: OracleSource::Sample(sample),
            alpha: DEFAULT_ALPHA,
        }
    }

    /// Replace the significance level for statistical verdicts.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Evaluate one combination.
    pub fn evaluate(&self, combination: &IndependenceCombination) -> Result<Verdict> {
        let verdict = match &self.source {
            OracleSource::Graph(graph) => {
                Verdict::Structural(d_separation_verdict(graph, combination)?)
            }
            OracleSource::Sample(sample) => {
                let test: Box<dyn IndependenceTest> = match sample.kind() {
                    SampleKind::Discrete => Box::new(ChiSquareTest::new(self.alpha)),
                    SampleKind::Continuous => Box::new(FisherZTest::new(self.alpha)),
                    other => {
                        return Err(LabError::UnsupportedSampleType(format!(
                            "sample is {:?}; expected all-discrete or all-continuous columns",
                            other
                        )))
                    }
                };
                Verdict::Statistical(test.evaluate(
                    sample,
                    &combination.first,
                    &combination.second,
                    &combination.conditioning,
                )?)
            }
        };
        debug!(combination = %combination, ?verdict, "independence evaluated");
        Ok(verdict)
    }

    /// Evaluate one combination down to its boolean claim.
    pub fn is_independent(&self, combination: &IndependenceCombination) -> Result<bool> {
        Ok(self.evaluate(combination)?.is_independent())
    }
}

/// Resolve a combination against the graph's d-separation relation.
fn d_separation_verdict(graph: &CausalGraph, combination: &IndependenceCombination) -> Result<bool> {
    for name in [&combination.first, &combination.second]
        .into_iter()
        .chain(combination.conditioning.iter())
    {
        if !graph.contains_node(name) {
            return Err(LabError::UnknownVariable(name.clone()));
        }
    }
    let conditioning: HashSet<String> = combination.conditioning.iter().cloned().collect();
    Ok(graph.d_separated(&combination.first, &combination.second, &conditioning))
}
