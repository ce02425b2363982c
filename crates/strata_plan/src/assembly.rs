//! The resource assembly sequencer.
//!
//! Declares the stack's resources in a fixed dependency order so that every
//! cross-reference (key ARN, topic ARN, policy document) exists before the
//! step that consumes it:
//!
//! 1. key policy document
//! 2. encryption key
//! 3. notification topic, then its e-mail subscription
//! 4. aggregate role policy (key, storage and topic grants)
//! 5. execution role, then policy attachment
//! 6. packaging layers
//!
//! Configuration is validated in full before step 1, so a bad bundle never
//! leaves declarations behind. Any later failure aborts the run; there is no
//! retry and no rollback.

use crate::config::{AssemblyConfig, ConfigBundle, ConfigError};
use crate::construct::{iam, kms, layer, sns};
use crate::handle::{KeyHandle, LayerHandle, PolicyHandle, RoleHandle, SubscriptionHandle, TopicHandle};
use crate::scope::DeploymentScope;
use indexmap::IndexMap;
use strata_core::CoreError;
use strata_policy::PolicyError;

/// Assembly error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyError {
    /// Required configuration absent or malformed
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// A step's dependency was never produced in this scope
    #[error("Composition error: {resource} requires {dependency}: {source}")]
    Composition {
        /// Resource being declared
        resource: String,
        /// Missing dependency
        dependency: String,
        /// Scope check that failed
        source: CoreError,
    },

    /// Composed policy is structurally invalid
    #[error("Invalid policy for {resource}: {source}")]
    Policy {
        /// Resource carrying the policy
        resource: String,
        /// Validation failure
        source: PolicyError,
    },

    /// Registration rejected by the scope (duplicate ID, cycle, ...)
    #[error("Scope error: {0}")]
    Scope(#[from] CoreError),
}

impl AssemblyError {
    pub(crate) fn composition(resource: &str, dependency: &str, source: CoreError) -> Self {
        Self::Composition {
            resource: resource.to_string(),
            dependency: dependency.to_string(),
            source,
        }
    }

    /// Whether the error came from configuration rather than composition
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// One step of the build sequence
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssemblyStep {
    /// Key policy document composed
    KeyPolicyDocument,
    /// Encryption key declared
    Key,
    /// Notification topic declared
    Topic,
    /// E-mail subscription attached to the topic
    Subscription,
    /// Aggregate role policy composed and declared
    RolePolicy,
    /// Execution role declared
    Role,
    /// Role policy attached to the role
    PolicyAttachment,
    /// Packaging layer declared
    Layer(String),
}

/// Handles produced by one assembly run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackResources {
    /// Encryption key
    pub key: KeyHandle,
    /// Notification topic
    pub topic: TopicHandle,
    /// E-mail subscription
    pub subscription: SubscriptionHandle,
    /// Aggregate role policy
    pub policy: PolicyHandle,
    /// Execution role
    pub role: RoleHandle,
    /// Layers by name, in declaration order
    pub layers: IndexMap<String, LayerHandle>,
    /// Steps in the order they ran
    pub steps: Vec<AssemblyStep>,
}

/// Validate `bundle` and assemble the stack into `scope`
///
/// # Errors
///
/// Returns a configuration error before anything is declared if the bundle
/// is incomplete, otherwise the first composition or scope failure
pub fn assemble(
    scope: &mut DeploymentScope,
    bundle: &ConfigBundle,
) -> Result<StackResources, AssemblyError> {
    let config = AssemblyConfig::from_bundle(bundle).inspect_err(|err| {
        tracing::warn!(scope = %scope.name(), error = %err, "configuration rejected");
    })?;
    assemble_with(scope, &config)
}

/// Assemble the stack from already validated configuration
///
/// # Errors
///
/// Returns the first composition or scope failure
pub fn assemble_with(
    scope: &mut DeploymentScope,
    config: &AssemblyConfig,
) -> Result<StackResources, AssemblyError> {
    let mut steps = Vec::new();

    // 1-2. key
    let key_policy = iam::key_policy_document();
    steps.push(AssemblyStep::KeyPolicyDocument);
    let key = kms::create_key(scope, config, key_policy)?;
    steps.push(AssemblyStep::Key);

    // 3. topic and subscription
    let topic = sns::create_topic(scope, config, &key)?;
    steps.push(AssemblyStep::Topic);
    let subscription = sns::subscribe_email(scope, config, &topic)?;
    steps.push(AssemblyStep::Subscription);

    // 4. role policy
    let statements = vec![
        kms::encrypt_decrypt_statement(&key),
        iam::object_access_statement(config),
        sns::publish_statement(&topic),
    ];
    let policy = iam::create_managed_policy(scope, config, &config.role_name, statements)?;
    steps.push(AssemblyStep::RolePolicy);

    // 5. role
    let role = iam::create_role(scope, config, &config.role_name, &config.role_services)?;
    steps.push(AssemblyStep::Role);
    iam::attach_policy(scope, &policy, &role)?;
    steps.push(AssemblyStep::PolicyAttachment);

    // 6. layers
    let mut layers = IndexMap::with_capacity(config.layers.len());
    for spec in &config.layers {
        let handle = layer::create_layer(scope, config, spec)?;
        steps.push(AssemblyStep::Layer(spec.name.clone()));
        layers.insert(spec.name.clone(), handle);
    }

    tracing::info!(
        scope = %scope.name(),
        resources = scope.len(),
        layers = layers.len(),
        "stack assembled"
    );

    Ok(StackResources {
        key,
        topic,
        subscription,
        policy,
        role,
        layers,
        steps,
    })
}
