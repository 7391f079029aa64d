//! Experimental setups
//!
//! An [`ExperimentalSetup`] is a snapshot of a causal graph's measured
//! variables together with the manipulation the experimenter applies to
//! each and a studied/ignored flag. The variable-name set is fixed at
//! construction (exactly the measured-node names of the originating graph,
//! in node order); only the per-variable manipulation and studied flags
//! mutate afterwards.
//!
//! Latent and error nodes never appear among the setup's variables, so
//! asking about one fails with `UnknownVariable` like any other absent
//! name — except that trying to lock or randomize one is reported as the
//! more specific `InvalidManipulation`.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LabError, Result};
use crate::graph::{CausalGraph, NodeKind};
use crate::manipulation::{LockedValue, Manipulation};

/// One variable of an experimental setup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetupVariable {
    name: String,
    manipulation: Manipulation,
    studied: bool,
    mean: f64,
    std_dev: f64,
}

impl SetupVariable {
    /// Create a variable with default state: no manipulation, studied,
    /// mean 0, standard deviation 1.
    pub fn new(name: impl Into<String>) -> Self {
        SetupVariable {
            name: name.into(),
            manipulation: Manipulation::None,
            studied: true,
            mean: 0.0,
            std_dev: 1.0,
        }
    }

    /// Variable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current manipulation state.
    pub fn manipulation(&self) -> &Manipulation {
        &self.manipulation
    }

    /// Whether the variable is currently included in analysis views.
    pub fn is_studied(&self) -> bool {
        self.studied
    }

    /// Mean parameter for randomized manipulation.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Standard-deviation parameter for randomized manipulation.
    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Set the randomization parameters.
    pub fn set_parameters(&mut self, mean: f64, std_dev: f64) {
        self.mean = mean;
        self.std_dev = std_dev;
    }
}

/// A named experimental setup over the measured variables of a graph.
///
/// Deep-cloneable: a clone shares no mutable state with its source.
/// Serializable for the external persistence layer; reconstruction goes
/// through [`ExperimentalSetup::new`], so only `Serialize` is derived.
#[derive(Clone, Debug, Serialize)]
pub struct ExperimentalSetup {
    name: String,
    variables: Vec<SetupVariable>,
    #[serde(skip)]
    index: FxHashMap<String, usize>,
    graph: CausalGraph,
}

impl ExperimentalSetup {
    /// Build a setup from a graph snapshot.
    ///
    /// One variable is created per measured node, in the graph's node
    /// order; latent and error nodes are skipped entirely.
    pub fn new(name: impl Into<String>, graph: &CausalGraph) -> Self {
        let variables: Vec<SetupVariable> =
            graph.measured_names().map(SetupVariable::new).collect();
        let index = variables
            .iter()
            .enumerate()
            .map(|(i, v)| (v.name().to_string(), i))
            .collect();
        ExperimentalSetup {
            name: name.into(),
            variables,
            index,
            graph: graph.clone(),
        }
    }

    /// Name of this setup.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The graph snapshot the setup was built from.
    pub fn graph(&self) -> &CausalGraph {
        &self.graph
    }

    /// All variable names, in graph node order.
    pub fn variable_names(&self) -> Vec<String> {
        self.variables.iter().map(|v| v.name().to_string()).collect()
    }

    /// Names of studied variables: a stable sub-order of
    /// [`Self::variable_names`].
    pub fn studied_variable_names(&self) -> Vec<String> {
        self.variables
            .iter()
            .filter(|v| v.is_studied())
            .map(|v| v.name().to_string())
            .collect()
    }

    /// All variables, in graph node order.
    pub fn variables(&self) -> impl Iterator<Item = &SetupVariable> {
        self.variables.iter()
    }

    /// Look up a variable by name.
    pub fn variable(&self, name: &str) -> Result<&SetupVariable> {
        self.index
            .get(name)
            .map(|&i| &self.variables[i])
            .ok_or_else(|| LabError::UnknownVariable(name.to_string()))
    }

    /// Whether the named variable is currently studied.
    pub fn is_variable_studied(&self, name: &str) -> Result<bool> {
        Ok(self.variable(name)?.is_studied())
    }

    /// Mark the named variable as studied or ignored.
    pub fn set_studied(&mut self, name: &str, studied: bool) -> Result<()> {
        let var = self.variable_mut(name)?;
        var.studied = studied;
        debug!(variable = name, studied, "studied flag changed");
        Ok(())
    }

    /// Assign a manipulation to the named variable.
    ///
    /// Fails with `InvalidManipulation` when an intervention (`Locked` or
    /// `Randomized`) is attempted on a latent or error node, or when any
    /// reassignment is attempted on a variable whose current state is the
    /// immutable `Latent`/`Error` marker. The setup is left unchanged on
    /// failure.
    pub fn set_manipulation(&mut self, name: &str, manipulation: Manipulation) -> Result<()> {
        if !self.index.contains_key(name) {
            // Latent/error nodes were excluded at construction; locking or
            // randomizing one is the more specific failure.
            if manipulation.is_intervention() {
                if let Some(node) = self.graph.node(name) {
                    if matches!(node.kind, NodeKind::Latent | NodeKind::Error) {
                        return Err(LabError::InvalidManipulation {
                            name: name.to_string(),
                            reason: format!("node is {:?} and cannot be intervened on", node.kind),
                        });
                    }
                }
            }
            return Err(LabError::UnknownVariable(name.to_string()));
        }

        let var = self.variable_mut(name)?;
        // Latent/Error markers are immutable: any reassignment, including a
        // reset to `None`, would defeat the marker.
        if var.manipulation.is_immutable() && manipulation.kind() != var.manipulation.kind() {
            return Err(LabError::InvalidManipulation {
                name: name.to_string(),
                reason: format!(
                    "variable is marked '{}' and cannot be reassigned",
                    var.manipulation.kind()
                ),
            });
        }
        debug!(variable = name, kind = %manipulation.kind(), "manipulation changed");
        var.manipulation = manipulation;
        Ok(())
    }

    /// Set or replace the locked value of a variable in the `Locked` state.
    pub fn set_locked_at(&mut self, name: &str, value: LockedValue) -> Result<()> {
        let var = self.variable_mut(name)?;
        let name = var.name.clone();
        var.manipulation.set_locked_at(&name, value)
    }

    /// The manipulated graph implied by this setup.
    ///
    /// Every locked or randomized variable has its incoming edges severed;
    /// the rest of the graph is unchanged.
    pub fn apply_to_graph(&self) -> CausalGraph {
        let intervened: Vec<&str> = self
            .variables
            .iter()
            .filter(|v| v.manipulation.is_intervention())
            .map(|v| v.name())
            .collect();
        debug!(setup = %self.name, ?intervened, "building manipulated graph");
        self.graph.with_incoming_severed(intervened.iter().copied())
    }

    fn variable_mut(&mut self, name: &str) -> Result<&mut SetupVariable> {
        match self.index.get(name) {
            Some(&i) => Ok(&mut self.variables[i]),
            None => Err(LabError::UnknownVariable(name.to_string())),
        }
    }
}
