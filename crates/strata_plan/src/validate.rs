//! Structural checks over an assembled scope.
//!
//! Assembly already refuses most bad graphs at declaration time. The
//! validator re-checks a finished scope as a whole and reports every
//! finding at once.

use crate::resource::Resource;
use crate::scope::DeploymentScope;
use indexmap::IndexMap;

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Nothing declared
    Empty,
    /// A reference names a resource that was never declared
    DanglingReference {
        /// Referencing resource
        resource: String,
        /// Missing target
        target: String,
    },
    /// A creation-time reference names a resource declared later
    ForwardReference {
        /// Referencing resource
        resource: String,
        /// Later target
        target: String,
    },
    /// Dependency cycle
    Cycle {
        /// Detail from the graph walk
        reason: String,
    },
    /// Two resources share a physical name
    DuplicatePhysicalName {
        /// Shared name
        name: String,
        /// Resources using it
        resources: Vec<String>,
    },
    /// Embedded policy document is malformed
    InvalidPolicy {
        /// Resource carrying the policy
        resource: String,
        /// What is wrong
        reason: String,
    },
    /// Resource count over the configured ceiling
    TooMany {
        /// Declared resources
        count: usize,
        /// Ceiling
        max: usize,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "No resources declared"),
            Self::DanglingReference { resource, target } => {
                write!(f, "{} references undeclared resource {}", resource, target)
            }
            Self::ForwardReference { resource, target } => {
                write!(f, "{} references {} before it is declared", resource, target)
            }
            Self::Cycle { reason } => write!(f, "Dependency cycle: {}", reason),
            Self::DuplicatePhysicalName { name, resources } => {
                write!(f, "Physical name {} used by {}", name, resources.join(", "))
            }
            Self::InvalidPolicy { resource, reason } => {
                write!(f, "Invalid policy on {}: {}", resource, reason)
            }
            Self::TooMany { count, max } => {
                write!(f, "Resource count {} exceeds max {}", count, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validator for assembled scopes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validator {
    /// Reject a scope with no resources
    pub require_resources: bool,
    /// Maximum allowed resources (0 = no limit)
    pub max_resources: usize,
    /// Re-validate embedded policy documents
    pub check_policies: bool,
}

impl Validator {
    /// Create a new validator
    #[must_use]
    pub fn new() -> Self {
        Self {
            require_resources: true,
            max_resources: 0,
            check_policies: true,
        }
    }

    /// Validate a scope
    ///
    /// # Errors
    ///
    /// Returns every finding if the scope is invalid
    pub fn validate(&self, scope: &DeploymentScope) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.require_resources && scope.is_empty() {
            errors.push(ValidationError::Empty);
        }
        if self.max_resources > 0 && scope.len() > self.max_resources {
            errors.push(ValidationError::TooMany {
                count: scope.len(),
                max: self.max_resources,
            });
        }

        self.check_references(scope, &mut errors);

        if let Err(e) = scope.dag().topological_order() {
            errors.push(ValidationError::Cycle {
                reason: e.to_string(),
            });
        }

        self.check_physical_names(scope, &mut errors);

        if self.check_policies {
            self.check_policy_documents(scope, &mut errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            for error in &errors {
                tracing::warn!(scope = %scope.name(), %error, "validation finding");
            }
            Err(errors)
        }
    }

    /// Creation references must point backwards; attachments only need to exist
    fn check_references(&self, scope: &DeploymentScope, errors: &mut Vec<ValidationError>) {
        let dag = scope.dag();
        for (position, (id, resource)) in scope.resources().enumerate() {
            for target in resource.references() {
                match dag.position(target) {
                    None => errors.push(ValidationError::DanglingReference {
                        resource: id.to_string(),
                        target: target.to_string(),
                    }),
                    Some(at) if at >= position => errors.push(ValidationError::ForwardReference {
                        resource: id.to_string(),
                        target: target.to_string(),
                    }),
                    Some(_) => {}
                }
            }
            for target in resource.attachments() {
                if !scope.contains(target) {
                    errors.push(ValidationError::DanglingReference {
                        resource: id.to_string(),
                        target: target.to_string(),
                    });
                }
            }
        }
    }

    fn check_physical_names(&self, scope: &DeploymentScope, errors: &mut Vec<ValidationError>) {
        let mut by_name: IndexMap<(&str, &str), Vec<String>> = IndexMap::new();
        for (id, resource) in scope.resources() {
            if let Some(name) = resource.physical_name() {
                by_name
                    .entry((resource.type_name(), name))
                    .or_default()
                    .push(id.to_string());
            }
        }
        for ((_, name), resources) in by_name {
            if resources.len() > 1 {
                errors.push(ValidationError::DuplicatePhysicalName {
                    name: name.to_string(),
                    resources,
                });
            }
        }
    }

    fn check_policy_documents(&self, scope: &DeploymentScope, errors: &mut Vec<ValidationError>) {
        for (id, resource) in scope.resources() {
            let result = match resource {
                Resource::Key(props) => props.policy.validate_resource_policy(),
                Resource::Role(props) => props.trust_policy().validate_trust_policy(),
                Resource::ManagedPolicy(props) => props.document.validate_identity_policy(),
                _ => Ok(()),
            };
            if let Err(e) = result {
                errors.push(ValidationError::InvalidPolicy {
                    resource: id.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    /// Set whether an empty scope is an error
    #[must_use]
    pub fn with_require_resources(mut self, require: bool) -> Self {
        self.require_resources = require;
        self
    }

    /// Set maximum resource count
    #[must_use]
    pub fn with_max_resources(mut self, max: usize) -> Self {
        self.max_resources = max;
        self
    }

    /// Set whether embedded policies are re-validated
    #[must_use]
    pub fn with_check_policies(mut self, check: bool) -> Self {
        self.check_policies = check;
        self
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::assemble;
    use crate::handle::{ManagedPolicy, Role};
    use crate::resource::{ManagedPolicyProps, RoleProps};
    use crate::test_support::bundle;
    use strata_core::{LogicalId, Reference};
    use strata_policy::{PolicyDocument, PolicyStatement, Principal};

    fn id(s: &str) -> LogicalId {
        LogicalId::new(s).unwrap()
    }

    fn role(name: &str) -> Resource {
        Resource::Role(RoleProps {
            role_name: name.to_string(),
            assumed_by: vec![Principal::service("lambda")],
        })
    }

    #[test]
    fn test_validator_new() {
        let validator = Validator::new();
        assert!(validator.require_resources);
        assert!(validator.check_policies);
        assert_eq!(validator.max_resources, 0);
    }

    #[test]
    fn test_validator_with_options() {
        let validator = Validator::new()
            .with_require_resources(false)
            .with_check_policies(false)
            .with_max_resources(10);
        assert!(!validator.require_resources);
        assert!(!validator.check_policies);
        assert_eq!(validator.max_resources, 10);
    }

    #[test]
    fn test_assembled_scope_is_valid() {
        let mut scope = DeploymentScope::new("s");
        assemble(&mut scope, &bundle()).unwrap();
        assert_eq!(Validator::new().validate(&scope), Ok(()));
    }

    #[test]
    fn test_empty_scope() {
        let scope = DeploymentScope::new("s");
        assert_eq!(Validator::new().validate(&scope), Err(vec![ValidationError::Empty]));
        assert!(Validator::new().with_require_resources(false).validate(&scope).is_ok());
    }

    #[test]
    fn test_too_many() {
        let mut scope = DeploymentScope::new("s");
        assemble(&mut scope, &bundle()).unwrap();
        let errors = Validator::new().with_max_resources(3).validate(&scope).unwrap_err();
        assert_eq!(errors, vec![ValidationError::TooMany { count: 5, max: 3 }]);
    }

    #[test]
    fn test_duplicate_physical_name() {
        let mut scope = DeploymentScope::new("s");
        scope.declare::<Role>(id("a"), role("pmmainStack-role")).unwrap();
        scope.declare::<Role>(id("b"), role("pmmainStack-role")).unwrap();
        let errors = Validator::new().validate(&scope).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::DuplicatePhysicalName {
                name: "pmmainStack-role".to_string(),
                resources: vec!["a".to_string(), "b".to_string()],
            }]
        );
    }

    #[test]
    fn test_invalid_policy_and_dangling_attachment() {
        let mut scope = DeploymentScope::new("s");
        scope
            .declare::<ManagedPolicy>(
                id("p"),
                Resource::ManagedPolicy(ManagedPolicyProps {
                    policy_name: "p".to_string(),
                    document: PolicyDocument::from_statements(vec![
                        PolicyStatement::allow().with_resource(Reference::literal("*")),
                    ]),
                    roles: vec![Reference::ref_of(id("ghost-role"))],
                }),
            )
            .unwrap();
        let errors = Validator::new().validate(&scope).unwrap_err();
        assert!(errors.contains(&ValidationError::DanglingReference {
            resource: "p".to_string(),
            target: "ghost-role".to_string(),
        }));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidPolicy { resource, .. } if resource == "p")));
        assert!(Validator::new()
            .with_check_policies(false)
            .validate(&scope)
            .unwrap_err()
            .iter()
            .all(|e| !matches!(e, ValidationError::InvalidPolicy { .. })));
    }

    #[test]
    fn test_error_display() {
        let e = ValidationError::ForwardReference {
            resource: "pm-app-sns-topic".to_string(),
            target: "pm-kms-key-id".to_string(),
        };
        assert_eq!(e.to_string(), "pm-app-sns-topic references pm-kms-key-id before it is declared");
    }
}
