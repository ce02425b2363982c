//! Dependency graph of declared resources.
//!
//! Nodes are kept in declaration order. An edge `from -> to` means `to`
//! depends on `from`, so `from` must be created first.

use crate::resource::Resource;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use strata_core::{CoreError, CoreResult, LogicalId};

/// A directed acyclic graph of resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dag {
    /// All nodes, in declaration order
    pub nodes: IndexMap<LogicalId, Node>,
    /// All edges (dependencies)
    pub edges: Vec<Edge>,
}

impl Dag {
    /// Create a new empty DAG
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node; every dependency must already be present
    ///
    /// # Errors
    ///
    /// Returns error if the node already exists or a dependency is missing
    pub fn add_node(&mut self, node: Node) -> CoreResult<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(CoreError::AlreadyExists {
                kind: "Resource".to_string(),
                id: node.id.to_string(),
            });
        }
        if let Some(missing) = node.dependencies.iter().find(|d| !self.nodes.contains_key(*d)) {
            return Err(CoreError::NotFound {
                kind: "Resource".to_string(),
                id: missing.to_string(),
            });
        }

        for dep in &node.dependencies {
            self.edges.push(Edge::new(dep.clone(), node.id.clone()));
        }
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Add an edge between existing nodes
    ///
    /// # Errors
    ///
    /// Returns error if a node is missing or the edge would create a cycle
    pub fn add_edge(&mut self, edge: Edge) -> CoreResult<()> {
        for id in [&edge.from, &edge.to] {
            if !self.nodes.contains_key(id) {
                return Err(CoreError::NotFound {
                    kind: "Resource".to_string(),
                    id: id.to_string(),
                });
            }
        }
        if self.edges.contains(&edge) {
            return Ok(());
        }
        if self.would_create_cycle(&edge) {
            return Err(CoreError::Validation {
                field: "edge".to_string(),
                reason: format!("{} -> {} would create a cycle", edge.from, edge.to),
            });
        }

        if let Some(node) = self.nodes.get_mut(&edge.to) {
            node.dependencies.insert(edge.from.clone());
        }
        self.edges.push(edge);
        Ok(())
    }

    /// An edge closes a cycle when its source is reachable from its target
    fn would_create_cycle(&self, edge: &Edge) -> bool {
        if edge.from == edge.to {
            return true;
        }
        let mut visited = IndexSet::new();
        let mut stack = vec![&edge.to];

        while let Some(current) = stack.pop() {
            if current == &edge.from {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            for e in &self.edges {
                if &e.from == current {
                    stack.push(&e.to);
                }
            }
        }

        false
    }

    /// Creation order: every node after all of its dependencies, otherwise
    /// as close to declaration order as possible
    ///
    /// # Errors
    ///
    /// Returns error if the graph contains a cycle or a dangling edge
    pub fn topological_order(&self) -> CoreResult<Vec<&LogicalId>> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut done: IndexSet<&LogicalId> = IndexSet::new();
        let mut in_progress: IndexSet<&LogicalId> = IndexSet::new();

        for id in self.nodes.keys() {
            self.visit(id, &mut done, &mut in_progress, &mut order)?;
        }
        Ok(order)
    }

    fn visit<'a>(
        &'a self,
        id: &'a LogicalId,
        done: &mut IndexSet<&'a LogicalId>,
        in_progress: &mut IndexSet<&'a LogicalId>,
        order: &mut Vec<&'a LogicalId>,
    ) -> CoreResult<()> {
        if done.contains(id) {
            return Ok(());
        }
        if !in_progress.insert(id) {
            return Err(CoreError::Validation {
                field: "dag".to_string(),
                reason: format!("cycle detected at {}", id),
            });
        }
        let node = self.nodes.get(id).ok_or_else(|| CoreError::NotFound {
            kind: "Resource".to_string(),
            id: id.to_string(),
        })?;
        for dep in &node.dependencies {
            self.visit(dep, done, in_progress, order)?;
        }
        in_progress.shift_remove(id);
        done.insert(id);
        order.push(id);
        Ok(())
    }

    /// Validate the DAG structure
    ///
    /// # Errors
    ///
    /// Returns error if an edge names a missing node or the graph is cyclic
    pub fn validate(&self) -> CoreResult<()> {
        for edge in &self.edges {
            for id in [&edge.from, &edge.to] {
                if !self.nodes.contains_key(id) {
                    return Err(CoreError::NotFound {
                        kind: "Resource".to_string(),
                        id: id.to_string(),
                    });
                }
            }
        }
        self.topological_order().map(|_| ())
    }

    /// Get node by ID
    #[must_use]
    pub fn get_node(&self, id: &LogicalId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Get mutable node by ID
    pub fn get_node_mut(&mut self, id: &LogicalId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Declaration position of a node
    #[must_use]
    pub fn position(&self, id: &LogicalId) -> Option<usize> {
        self.nodes.get_index_of(id)
    }

    /// Nodes the given node depends on
    #[must_use]
    pub fn dependencies(&self, id: &LogicalId) -> Vec<&LogicalId> {
        self.edges
            .iter()
            .filter(|e| &e.to == id)
            .map(|e| &e.from)
            .collect()
    }

    /// Get total node count
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get total edge count
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Check if DAG is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A node in the DAG
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Logical ID
    pub id: LogicalId,
    /// Declared resource
    pub resource: Resource,
    /// Resources that must be created first
    pub dependencies: IndexSet<LogicalId>,
}

impl Node {
    /// Node whose dependencies are the resource's creation-time references
    #[must_use]
    pub fn new(id: LogicalId, resource: Resource) -> Self {
        let dependencies = resource.references().into_iter().cloned().collect();
        Self {
            id,
            resource,
            dependencies,
        }
    }
}

/// An edge between nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Dependency
    pub from: LogicalId,
    /// Dependent
    pub to: LogicalId,
}

impl Edge {
    /// Create a new edge
    #[must_use]
    pub fn new(from: LogicalId, to: LogicalId) -> Self {
        Self { from, to }
    }
}
