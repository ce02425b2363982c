//! Manifest synthesis.
//!
//! Renders a scope's resource graph, in creation order, into the JSON
//! manifest handed to the provisioning tool. The manifest carries a digest
//! of its own content so two runs over the same configuration can be
//! compared without diffing.

use crate::scope::DeploymentScope;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strata_core::{CoreError, CoreResult, Digest};

/// Manifest layout version
pub const FORMAT_VERSION: u32 = 1;

/// One resource entry in a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManifestResource {
    /// Provider type name
    #[serde(rename = "Type")]
    pub type_name: String,
    /// Provider properties
    pub properties: Value,
    /// Logical IDs that must be created first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

/// Synthesized stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Layout version
    pub format_version: u32,
    /// Stack (scope) name
    pub stack: String,
    /// Deployment environment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Resources keyed by logical ID, in creation order
    pub resources: IndexMap<String, ManifestResource>,
    /// Hex digest over every other field
    pub digest: String,
}

impl Manifest {
    /// Logical IDs in creation order
    pub fn order(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// Recompute the digest and compare it with the stored one
    #[must_use]
    pub fn verify(&self) -> bool {
        let Ok(stored) = Digest::from_hex(&self.digest) else {
            return false;
        };
        content_digest(self.format_version, &self.stack, self.environment.as_deref(), &self.resources)
            .is_ok_and(|d| d == stored)
    }

    /// Pretty JSON rendering
    ///
    /// # Errors
    ///
    /// Returns error if the manifest cannot be encoded
    pub fn to_json_pretty(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn content_digest(
    format_version: u32,
    stack: &str,
    environment: Option<&str>,
    resources: &IndexMap<String, ManifestResource>,
) -> CoreResult<Digest> {
    Ok(Digest::of_json(&(format_version, stack, environment, resources))?)
}

/// Synthesize the manifest for everything declared in `scope`
///
/// # Errors
///
/// Returns error if the graph is cyclic or has dangling edges
pub fn synthesize(scope: &DeploymentScope) -> CoreResult<Manifest> {
    let dag = scope.dag();
    dag.validate()?;

    let mut resources = IndexMap::with_capacity(dag.node_count());
    for id in dag.topological_order()? {
        let node = dag.get_node(id).ok_or_else(|| CoreError::Internal {
            message: format!("ordered node {} vanished", id),
        })?;
        resources.insert(
            id.to_string(),
            ManifestResource {
                type_name: node.resource.type_name().to_string(),
                properties: node.resource.properties(),
                depends_on: node.dependencies.iter().map(ToString::to_string).collect(),
            },
        );
    }

    let environment = scope.environment().map(str::to_string);
    let digest = content_digest(FORMAT_VERSION, scope.name(), scope.environment(), &resources)?;
    tracing::info!(
        stack = %scope.name(),
        resources = resources.len(),
        digest = %digest.short_hex(),
        "synthesized manifest"
    );

    Ok(Manifest {
        format_version: FORMAT_VERSION,
        stack: scope.name().to_string(),
        environment,
        resources,
        digest: digest.to_hex(),
    })
}
