//! Deployment scope: the context resources are registered into.

use crate::dag::{Dag, Edge, Node};
use crate::handle::{Handle, ResourceKind};
use crate::resource::Resource;
use strata_core::{CoreError, CoreResult, LogicalId, ScopeId};

/// Enclosing declarative context for one stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentScope {
    id: ScopeId,
    name: String,
    environment: Option<String>,
    dag: Dag,
}

impl DeploymentScope {
    /// Create an empty scope named `name`
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: ScopeId::from_name(&name),
            name,
            environment: None,
            dag: Dag::new(),
        }
    }

    /// Tag the scope with a deployment environment (`dev`, `prod`, ...)
    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Scope identifier
    #[must_use]
    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// Scope name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Deployment environment
    #[must_use]
    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    /// Register a resource and return its handle
    ///
    /// # Errors
    ///
    /// Returns error if the ID is taken or a referenced resource is missing
    pub fn declare<K: ResourceKind>(
        &mut self,
        id: LogicalId,
        resource: Resource,
    ) -> CoreResult<Handle<K>> {
        let kind = resource.type_name();
        self.dag.add_node(Node::new(id.clone(), resource))?;
        tracing::debug!(scope = %self.name, id = %id, kind, "declared resource");
        Ok(Handle::new(self.id, id))
    }

    /// Record that `dependent` must be created after `dependency`
    ///
    /// # Errors
    ///
    /// Returns error if either resource is missing or a cycle would form
    pub fn add_dependency(&mut self, dependency: &LogicalId, dependent: &LogicalId) -> CoreResult<()> {
        self.dag
            .add_edge(Edge::new(dependency.clone(), dependent.clone()))
    }

    /// Whether a handle was produced by this scope and is still registered
    #[must_use]
    pub fn owns<K: ResourceKind>(&self, handle: &Handle<K>) -> bool {
        handle.scope() == self.id && self.dag.nodes.contains_key(handle.id())
    }

    /// Check a handle against this scope
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ForeignScope`] for another scope's handle and
    /// [`CoreError::NotFound`] if the resource is not registered
    pub fn check<K: ResourceKind>(&self, handle: &Handle<K>) -> CoreResult<()> {
        if handle.scope() != self.id {
            return Err(CoreError::ForeignScope {
                id: handle.id().to_string(),
            });
        }
        if !self.dag.nodes.contains_key(handle.id()) {
            return Err(CoreError::NotFound {
                kind: K::KIND.to_string(),
                id: handle.id().to_string(),
            });
        }
        Ok(())
    }

    /// Whether a logical ID is registered
    #[must_use]
    pub fn contains(&self, id: &LogicalId) -> bool {
        self.dag.nodes.contains_key(id)
    }

    /// Declared resource by ID
    #[must_use]
    pub fn resource(&self, id: &LogicalId) -> Option<&Resource> {
        self.dag.get_node(id).map(|n| &n.resource)
    }

    pub(crate) fn resource_mut(&mut self, id: &LogicalId) -> Option<&mut Resource> {
        self.dag.get_node_mut(id).map(|n| &mut n.resource)
    }

    /// Resource behind a handle
    #[must_use]
    pub fn get<K: ResourceKind>(&self, handle: &Handle<K>) -> Option<&Resource> {
        if handle.scope() == self.id {
            self.resource(handle.id())
        } else {
            None
        }
    }

    /// Declared resources in declaration order
    pub fn resources(&self) -> impl Iterator<Item = (&LogicalId, &Resource)> {
        self.dag.nodes.iter().map(|(id, node)| (id, &node.resource))
    }

    /// Creation order
    ///
    /// # Errors
    ///
    /// Returns error if the graph is cyclic
    pub fn build_order(&self) -> CoreResult<Vec<&LogicalId>> {
        self.dag.topological_order()
    }

    /// Underlying dependency graph
    #[must_use]
    pub fn dag(&self) -> &Dag {
        &self.dag
    }

    /// Number of declared resources
    #[must_use]
    pub fn len(&self) -> usize {
        self.dag.node_count()
    }

    /// Check if nothing has been declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dag.is_empty()
    }
}
