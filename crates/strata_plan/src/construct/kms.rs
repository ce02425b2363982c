//! Encryption keys.

use crate::assembly::AssemblyError;
use crate::config::AssemblyConfig;
use crate::handle::{Key, KeyHandle};
use crate::naming;
use crate::resource::{KeyProps, Resource};
use crate::scope::DeploymentScope;
use strata_policy::{PolicyDocument, PolicyStatement, grants};

/// Declare the stack's encryption key with the given resource policy
///
/// # Errors
///
/// Returns error if the policy is not a valid resource policy or the key's
/// ID is already taken in `scope`
pub fn create_key(
    scope: &mut DeploymentScope,
    config: &AssemblyConfig,
    policy: PolicyDocument,
) -> Result<KeyHandle, AssemblyError> {
    let id = naming::key_id(&config.app_name_short)?;
    policy
        .validate_resource_policy()
        .map_err(|source| AssemblyError::Policy {
            resource: id.to_string(),
            source,
        })?;
    super::require_declared(scope, policy.referenced_resources(), id.as_str())?;

    let resource = Resource::Key(KeyProps {
        description: naming::key_description(&config.app_name),
        policy,
        enable_key_rotation: true,
    });
    Ok(scope.declare::<Key>(id, resource)?)
}

/// Statement letting a role encrypt and decrypt with `key`
#[must_use]
pub fn encrypt_decrypt_statement(key: &KeyHandle) -> PolicyStatement {
    grants::key_encrypt_decrypt(key.arn())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::iam;
    use crate::test_support::config;
    use strata_core::Reference;

    #[test]
    fn test_create_key() {
        let mut scope = DeploymentScope::new("s");
        let key = create_key(&mut scope, &config(), iam::key_policy_document()).unwrap();
        assert_eq!(key.id().as_str(), "pm-kms-key-id");
        match scope.get(&key) {
            Some(Resource::Key(props)) => {
                assert!(props.enable_key_rotation);
                assert_eq!(props.description, "pm-app encryption key");
                assert_eq!(props.policy, iam::key_policy_document());
            }
            other => panic!("expected key, got {:?}", other),
        }
    }

    #[test]
    fn test_create_key_rejects_identity_policy() {
        let mut scope = DeploymentScope::new("s");
        let policy = PolicyDocument::from_statements(vec![
            PolicyStatement::allow()
                .with_actions(["kms:Decrypt"])
                .with_resource(Reference::literal("*")),
        ]);
        let err = create_key(&mut scope, &config(), policy).unwrap_err();
        assert!(matches!(err, AssemblyError::Policy { .. }));
        assert!(scope.is_empty());
    }

    #[test]
    fn test_create_key_twice_rejected() {
        let mut scope = DeploymentScope::new("s");
        create_key(&mut scope, &config(), iam::key_policy_document()).unwrap();
        let err = create_key(&mut scope, &config(), iam::key_policy_document()).unwrap_err();
        assert!(matches!(err, AssemblyError::Scope(_)));
    }

    #[test]
    fn test_encrypt_decrypt_statement_targets_key() {
        let mut scope = DeploymentScope::new("s");
        let key = create_key(&mut scope, &config(), iam::key_policy_document()).unwrap();
        let stmt = encrypt_decrypt_statement(&key);
        assert!(stmt.resources.contains(&key.arn()));
    }
}
