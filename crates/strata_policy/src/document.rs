//! Policy documents and their validation.

use crate::matcher::Matcher;
use crate::statement::{Effect, PolicyStatement};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strata_core::{CoreError, LogicalId, Reference};

/// Policy language version stamped on every rendered document
pub const POLICY_LANGUAGE_VERSION: &str = "2012-10-17";

static ACTION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\*|[a-z0-9-]+:[A-Za-z0-9*?]+)$").expect("static action pattern compiles")
});

/// Policy validation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// Document has no statements
    #[error("Policy document has no statements")]
    Empty,

    /// Statement grants no actions
    #[error("Statement {index} has no actions")]
    NoActions {
        /// Statement position
        index: usize,
    },

    /// Statement names no resources
    #[error("Statement {index} has no resources")]
    NoResources {
        /// Statement position
        index: usize,
    },

    /// Action does not look like `service:Action`
    #[error("Statement {index} has malformed action {action:?}")]
    MalformedAction {
        /// Statement position
        index: usize,
        /// Offending action
        action: String,
    },

    /// Resource policy statement without a principal
    #[error("Statement {index} of a resource policy has no principal")]
    MissingPrincipal {
        /// Statement position
        index: usize,
    },

    /// Identity policy statement carrying a principal
    #[error("Statement {index} of an identity policy must not name principals")]
    UnexpectedPrincipal {
        /// Statement position
        index: usize,
    },
}

impl From<PolicyError> for CoreError {
    fn from(err: PolicyError) -> Self {
        CoreError::Validation {
            field: "policy".to_string(),
            reason: err.to_string(),
        }
    }
}

/// An ordered collection of statements
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    /// Statements in the document
    pub statements: Vec<PolicyStatement>,
}

impl PolicyDocument {
    /// Create an empty document
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from statements
    #[must_use]
    pub fn from_statements(statements: Vec<PolicyStatement>) -> Self {
        Self { statements }
    }

    /// Append a statement
    pub fn add_statement(&mut self, statement: PolicyStatement) {
        self.statements.push(statement);
    }

    /// Check if document has no statements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Every declared resource referenced by any statement
    pub fn referenced_resources(&self) -> impl Iterator<Item = &LogicalId> {
        self.statements
            .iter()
            .flat_map(|stmt| stmt.referenced_resources())
    }

    /// Validate as a resource policy (attached to a key, topic, ...)
    ///
    /// # Errors
    ///
    /// Returns the first structural problem found
    pub fn validate_resource_policy(&self) -> Result<(), PolicyError> {
        self.validate_common(true)?;
        for (index, stmt) in self.statements.iter().enumerate() {
            if stmt.principals.is_empty() {
                return Err(PolicyError::MissingPrincipal { index });
            }
        }
        Ok(())
    }

    /// Validate as an identity policy (attached to a role)
    ///
    /// # Errors
    ///
    /// Returns the first structural problem found
    pub fn validate_identity_policy(&self) -> Result<(), PolicyError> {
        self.validate_common(true)?;
        for (index, stmt) in self.statements.iter().enumerate() {
            if !stmt.principals.is_empty() {
                return Err(PolicyError::UnexpectedPrincipal { index });
            }
        }
        Ok(())
    }

    /// Validate as a role trust policy: principals and actions, no resources
    ///
    /// # Errors
    ///
    /// Returns the first structural problem found
    pub fn validate_trust_policy(&self) -> Result<(), PolicyError> {
        self.validate_common(false)?;
        for (index, stmt) in self.statements.iter().enumerate() {
            if stmt.principals.is_empty() {
                return Err(PolicyError::MissingPrincipal { index });
            }
        }
        Ok(())
    }

    fn validate_common(&self, require_resources: bool) -> Result<(), PolicyError> {
        if self.statements.is_empty() {
            return Err(PolicyError::Empty);
        }
        for (index, stmt) in self.statements.iter().enumerate() {
            if stmt.actions.is_empty() {
                return Err(PolicyError::NoActions { index });
            }
            if require_resources && stmt.resources.is_empty() {
                return Err(PolicyError::NoResources { index });
            }
            if let Some(action) = stmt.actions.iter().find(|a| !ACTION_PATTERN.is_match(a)) {
                return Err(PolicyError::MalformedAction {
                    index,
                    action: action.clone(),
                });
            }
        }
        Ok(())
    }

    /// Whether `action` on `resource` is allowed: some `Allow` statement
    /// covers it and no `Deny` statement does.
    #[must_use]
    pub fn allows(&self, action: &str, resource: &Reference) -> bool {
        let matcher = Matcher::new();
        let covers = |stmt: &PolicyStatement| {
            stmt.actions.iter().any(|p| matcher.match_action(p, action))
                && stmt
                    .resources
                    .iter()
                    .any(|p| matcher.match_resource(p, resource))
        };
        let denied = self
            .statements
            .iter()
            .filter(|s| s.effect == Effect::Deny)
            .any(covers);
        !denied
            && self
                .statements
                .iter()
                .filter(|s| s.effect == Effect::Allow)
                .any(covers)
    }

    /// Render in the policy language layout
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "Version": POLICY_LANGUAGE_VERSION,
            "Statement": self.statements.iter().map(PolicyStatement::to_json).collect::<Vec<_>>(),
        })
    }
}
