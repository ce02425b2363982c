//! STRATA Planner
//!
//! Assembles a stack's resources in dependency order against an explicit
//! deployment scope and synthesizes the resulting graph into a manifest
//! for an external provisioning tool.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assembly;
pub mod config;
pub mod construct;
pub mod dag;
pub mod handle;
pub mod naming;
pub mod resource;
pub mod scope;
pub mod synth;
pub mod validate;

#[cfg(test)]
mod test_support;

pub use assembly::{AssemblyError, AssemblyStep, StackResources, assemble, assemble_with};
pub use config::{AssemblyConfig, ConfigBundle, ConfigError, LayerSpec, Runtime};
pub use dag::{Dag, Edge, Node};
pub use handle::{Handle, KeyHandle, LayerHandle, PolicyHandle, RoleHandle, SubscriptionHandle, TopicHandle};
pub use resource::Resource;
pub use scope::DeploymentScope;
pub use synth::{Manifest, ManifestResource, synthesize};
pub use validate::{ValidationError, Validator};
