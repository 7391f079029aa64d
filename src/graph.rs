//! Causal graph: DAG with d-separation
//!
//! Implements the causal directed acyclic graphs the laboratory runs
//! experiments against:
//! - Node kinds (measured, latent, error-indicator)
//! - Directed edges with cycle rejection
//! - d-separation via the Bayes-Ball algorithm
//! - Edge severing for manipulated graphs (incoming edges removed from
//!   intervened variables)
//!
//! Node order is significant: `nodes()` yields nodes in insertion order,
//! and that order is what an [`crate::setup::ExperimentalSetup`] snapshot
//! preserves.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of a node in the causal graph.
///
/// Only measured nodes are manipulable and studyable; latent nodes are
/// unobserved, and error nodes denote measurement error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Observed, measurable variable.
    Measured,
    /// Unobserved variable.
    Latent,
    /// Measurement-error indicator.
    Error,
}

/// A named node in the causal graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphNode {
    /// Node identifier; identity is by name.
    pub name: String,
    /// Kind of node in the causal structure.
    pub kind: NodeKind,
}

impl GraphNode {
    /// Create a node of the given kind.
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        GraphNode {
            name: name.into(),
            kind,
        }
    }

    /// Create a measured variable node.
    pub fn measured(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Measured)
    }

    /// Create a latent/unobserved node.
    pub fn latent(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Latent)
    }

    /// Create a measurement-error node.
    pub fn error(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Error)
    }
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Errors from causal-graph operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// Node not found in graph.
    #[error("node '{0}' not found in graph")]
    NodeNotFound(String),

    /// Node with the same name already present.
    #[error("node '{0}' already exists in graph")]
    DuplicateNode(String),

    /// Adding the edge would create a directed cycle.
    #[error("adding edge {from} -> {to} would create a cycle")]
    CycleDetected { from: String, to: String },
}

/// Causal directed acyclic graph with ordered nodes.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CausalGraph {
    /// Nodes in insertion order.
    order: Vec<GraphNode>,
    /// Parent mapping: child name -> parent names.
    parents: HashMap<String, HashSet<String>>,
    /// Child mapping: parent name -> child names.
    children: HashMap<String, HashSet<String>>,
}

impl CausalGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Fails if a node of the same name is already present.
    pub fn add_node(&mut self, node: GraphNode) -> Result<(), GraphError> {
        if self.contains_node(&node.name) {
            return Err(GraphError::DuplicateNode(node.name));
        }
        self.parents.entry(node.name.clone()).or_default();
        self.children.entry(node.name.clone()).or_default();
        self.order.push(node);
        Ok(())
    }

    /// Check whether a node with this name exists.
    pub fn contains_node(&self, name: &str) -> bool {
        self.parents.contains_key(name)
    }

    /// Look up a node by name.
    pub fn node(&self, name: &str) -> Option<&GraphNode> {
        self.order.iter().find(|n| n.name == name)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.order.iter()
    }

    /// Names of measured nodes, in insertion order.
    pub fn measured_names(&self) -> impl Iterator<Item = &str> {
        self.order
            .iter()
            .filter(|n| n.kind == NodeKind::Measured)
            .map(|n| n.name.as_str())
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.children.values().map(|c| c.len()).sum()
    }

    /// Add a directed edge `from -> to`, rejecting cycles.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<(), GraphError> {
        if !self.contains_node(from) {
            return Err(GraphError::NodeNotFound(from.to_string()));
        }
        if !self.contains_node(to) {
            return Err(GraphError::NodeNotFound(to.to_string()));
        }
        if from == to || self.ancestors_of(from).contains(to) {
            return Err(GraphError::CycleDetected {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        self.parents
            .get_mut(to)
            .ok_or_else(|| GraphError::NodeNotFound(to.to_string()))?
            .insert(from.to_string());
        self.children
            .get_mut(from)
            .ok_or_else(|| GraphError::NodeNotFound(from.to_string()))?
            .insert(to.to_string());
        Ok(())
    }

    /// Parents of a node (empty set for unknown names).
    pub fn parents_of(&self, node: &str) -> HashSet<String> {
        self.parents.get(node).cloned().unwrap_or_default()
    }

    /// Children of a node (empty set for unknown names).
    pub fn children_of(&self, node: &str) -> HashSet<String> {
        self.children.get(node).cloned().unwrap_or_default()
    }

    /// All descendants of a node (not including the node itself).
    pub fn descendants_of(&self, node: &str) -> HashSet<String> {
        let mut desc = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(node.to_string());

        while let Some(n) = queue.pop_front() {
            for child in self.children.get(&n).into_iter().flatten() {
                if desc.insert(child.clone()) {
                    queue.push_back(child.clone());
                }
            }
        }
        desc
    }

    /// All ancestors of a node (not including the node itself).
    pub fn ancestors_of(&self, node: &str) -> HashSet<String> {
        let mut anc = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(node.to_string());

        while let Some(n) = queue.pop_front() {
            for parent in self.parents.get(&n).into_iter().flatten() {
                if anc.insert(parent.clone()) {
                    queue.push_back(parent.clone());
                }
            }
        }
        anc
    }

    /// Check d-separation: (X ⊥⊥ Y | Z) in this graph.
    pub fn d_separated(&self, x: &str, y: &str, z: &HashSet<String>) -> bool {
        !self.d_connected(x, y, z)
    }

    /// Check d-connection (negation of d-separation) via Bayes-Ball.
    ///
    /// The ball starts at `x` in both directions; a node in `z` blocks
    /// chains and forks, while a collider passes only when it or one of
    /// its descendants is in `z`.
    pub fn d_connected(&self, x: &str, y: &str, z: &HashSet<String>) -> bool {
        if x == y {
            return true;
        }

        let mut visited_up: HashSet<String> = HashSet::new();
        let mut visited_down: HashSet<String> = HashSet::new();

        // Queue of (node, arrived-from-child).
        let mut queue: VecDeque<(String, bool)> = VecDeque::new();
        queue.push_back((x.to_string(), true));
        queue.push_back((x.to_string(), false));

        while let Some((node, from_child)) = queue.pop_front() {
            if node == y {
                return true;
            }

            let in_z = z.contains(&node);

            if from_child {
                if visited_up.insert(node.clone()) && !in_z {
                    // Chain or fork through an unconditioned node.
                    for parent in self.parents.get(&node).into_iter().flatten() {
                        queue.push_back((parent.clone(), true));
                    }
                    for child in self.children.get(&node).into_iter().flatten() {
                        queue.push_back((child.clone(), false));
                    }
                }
            } else if visited_down.insert(node.clone()) {
                if !in_z {
                    for child in self.children.get(&node).into_iter().flatten() {
                        queue.push_back((child.clone(), false));
                    }
                }
                // Collider: passes only if conditioned on it or a descendant.
                if in_z || self.has_descendant_in(z, &node) {
                    for parent in self.parents.get(&node).into_iter().flatten() {
                        queue.push_back((parent.clone(), true));
                    }
                }
            }
        }

        false
    }

    /// Graph with all incoming edges to the named nodes removed.
    ///
    /// This is the manipulated graph of an intervened variable set: once a
    /// variable is forced or randomized by the experimenter, its natural
    /// causes no longer act on it.
    pub fn with_incoming_severed<'a>(
        &self,
        targets: impl IntoIterator<Item = &'a str>,
    ) -> CausalGraph {
        let mut severed = self.clone();
        for target in targets {
            let former: Vec<String> = severed.parents_of(target).into_iter().collect();
            for parent in &former {
                if let Some(children) = severed.children.get_mut(parent) {
                    children.remove(target);
                }
            }
            if let Some(parents) = severed.parents.get_mut(target) {
                parents.clear();
            }
        }
        severed
    }

    fn has_descendant_in(&self, set: &HashSet<String>, node: &str) -> bool {
        self.descendants_of(node).iter().any(|d| set.contains(d))
    }
}
