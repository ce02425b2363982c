//! Identifier and physical-name derivation.
//!
//! Every function here is pure: the same inputs always give the same names.
//! The patterns are part of the deployed stack's contract and must not change.

use strata_core::{CoreResult, LogicalId};

/// Logical ID of the encryption key: `{short}-kms-key-id`
pub fn key_id(app_name_short: &str) -> CoreResult<LogicalId> {
    LogicalId::new(format!("{}-kms-key-id", app_name_short))
}

/// Human-readable key description
#[must_use]
pub fn key_description(app_name: &str) -> String {
    format!("{} encryption key", app_name)
}

/// Logical ID of the notification topic: `{app}-sns-topic`
pub fn topic_id(app_name: &str) -> CoreResult<LogicalId> {
    LogicalId::new(format!("{}-sns-topic", app_name))
}

/// Topic display name: `{source} Reservoir Topic`
#[must_use]
pub fn topic_display_name(source_id_short: &str) -> String {
    format!("{} Reservoir Topic", source_id_short)
}

/// Logical ID of the topic's e-mail subscription
pub fn subscription_id(app_name: &str) -> CoreResult<LogicalId> {
    LogicalId::new(format!("{}-sns-topic-email-subscription", app_name))
}

/// Logical ID of a role: `{short}-{name}-role-id`
pub fn role_id(app_name_short: &str, role: &str) -> CoreResult<LogicalId> {
    LogicalId::new(format!("{}-{}-role-id", app_name_short, role))
}

/// Physical role name: `{short}{name}-role`
#[must_use]
pub fn role_name(app_name_short: &str, role: &str) -> String {
    format!("{}{}-role", app_name_short, role)
}

/// Logical ID of a managed policy: `{app}-{name}-policy-id`
pub fn policy_id(app_name: &str, policy: &str) -> CoreResult<LogicalId> {
    LogicalId::new(format!("{}-{}-policy-id", app_name, policy))
}

/// Physical managed policy name: `{app}-{name}-policy`
#[must_use]
pub fn policy_name(app_name: &str, policy: &str) -> String {
    format!("{}-{}-policy", app_name, policy)
}

/// Logical ID of a layer: `{short}-{layer}-Id`
pub fn layer_id(app_name_short: &str, layer: &str) -> CoreResult<LogicalId> {
    LogicalId::new(format!("{}-{}-Id", app_name_short, layer))
}

/// Default stack name for an application and optional environment
#[must_use]
pub fn stack_name(app_name: &str, environment: Option<&str>) -> String {
    match environment {
        Some(env) if !env.is_empty() => format!("{}-{}-stack", app_name, env),
        _ => format!("{}-stack", app_name),
    }
}
