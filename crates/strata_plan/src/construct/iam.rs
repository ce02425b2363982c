//! Roles, managed policies and the key policy document.

use crate::assembly::AssemblyError;
use crate::config::AssemblyConfig;
use crate::handle::{ManagedPolicy, PolicyHandle, Role, RoleHandle};
use crate::naming;
use crate::resource::{ManagedPolicyProps, Resource, RoleProps};
use crate::scope::DeploymentScope;
use strata_core::{CoreError, Reference};
use strata_policy::{PolicyDocument, PolicyStatement, Principal, grants};

/// Resource policy for the stack's encryption key
#[must_use]
pub fn key_policy_document() -> PolicyDocument {
    PolicyDocument::from_statements(vec![grants::key_administration()])
}

/// Statement granting object access on the configured storage resource
#[must_use]
pub fn object_access_statement(config: &AssemblyConfig) -> PolicyStatement {
    grants::object_access(Reference::literal(config.storage_arn.clone()))
}

/// Declare a role assumable by the given services (`lambda`, `glue`, `states`)
///
/// # Errors
///
/// Returns a policy error if no service may assume the role, or a scope
/// error if the role's ID is already taken in `scope`
pub fn create_role(
    scope: &mut DeploymentScope,
    config: &AssemblyConfig,
    role_name: &str,
    assumed_by: &[String],
) -> Result<RoleHandle, AssemblyError> {
    let id = naming::role_id(&config.app_name_short, role_name)?;
    let props = RoleProps {
        role_name: naming::role_name(&config.app_name_short, role_name),
        assumed_by: assumed_by.iter().map(|s| Principal::service(s)).collect(),
    };
    props
        .trust_policy()
        .validate_trust_policy()
        .map_err(|source| AssemblyError::Policy {
            resource: id.to_string(),
            source,
        })?;
    Ok(scope.declare::<Role>(id, Resource::Role(props))?)
}

/// Declare a managed policy from `statements`
///
/// Every resource the statements reference must already be declared.
///
/// # Errors
///
/// Returns a composition error for references to undeclared resources and
/// a policy error if the statements do not form a valid identity policy
pub fn create_managed_policy(
    scope: &mut DeploymentScope,
    config: &AssemblyConfig,
    policy_name: &str,
    statements: Vec<PolicyStatement>,
) -> Result<PolicyHandle, AssemblyError> {
    let id = naming::policy_id(&config.app_name, policy_name)?;
    let document = PolicyDocument::from_statements(statements);
    document
        .validate_identity_policy()
        .map_err(|source| AssemblyError::Policy {
            resource: id.to_string(),
            source,
        })?;
    super::require_declared(scope, document.referenced_resources(), id.as_str())?;

    let resource = Resource::ManagedPolicy(ManagedPolicyProps {
        policy_name: naming::policy_name(&config.app_name, policy_name),
        document,
        roles: Vec::new(),
    });
    Ok(scope.declare::<ManagedPolicy>(id, resource)?)
}

/// Attach `policy` to `role`
///
/// Attaching the same pair twice is a no-op.
///
/// # Errors
///
/// Returns a composition error if either handle is not live in `scope`
pub fn attach_policy(
    scope: &mut DeploymentScope,
    policy: &PolicyHandle,
    role: &RoleHandle,
) -> Result<(), AssemblyError> {
    super::require(scope, policy, role.id().as_str())?;
    super::require(scope, role, policy.id().as_str())?;
    scope.add_dependency(role.id(), policy.id())?;

    match scope.resource_mut(policy.id()) {
        Some(Resource::ManagedPolicy(props)) => {
            let reference = role.reference();
            if !props.roles.contains(&reference) {
                props.roles.push(reference);
            }
        }
        _ => {
            return Err(AssemblyError::Scope(CoreError::Internal {
                message: format!("{} is not a managed policy", policy.id()),
            }));
        }
    }
    tracing::debug!(policy = %policy.id(), role = %role.id(), "attached policy");
    Ok(())
}
