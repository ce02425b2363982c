//! Policy statements.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use strata_core::{LogicalId, Reference};

/// Statement effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    /// Grant the listed actions
    Allow,
    /// Refuse the listed actions, overriding any allow
    Deny,
}

impl Effect {
    /// Canonical name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "Allow",
            Self::Deny => "Deny",
        }
    }
}

/// Principal a resource policy statement applies to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Principal {
    /// Cloud service, e.g. `s3.amazonaws.com`
    Service(String),
    /// Root of the account the stack is deployed into
    AccountRoot,
    /// Explicit principal ARN
    Arn(Reference),
}

impl Principal {
    /// Service principal for a short service name (`lambda` -> `lambda.amazonaws.com`)
    #[must_use]
    pub fn service(short_name: &str) -> Self {
        Self::Service(format!("{}.amazonaws.com", short_name))
    }

    /// Key under which this principal is grouped in a rendered statement
    #[must_use]
    pub const fn group(&self) -> &'static str {
        match self {
            Self::Service(_) => "Service",
            Self::AccountRoot | Self::Arn(_) => "AWS",
        }
    }

    /// Render the principal value
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Service(name) => Value::String(name.clone()),
            Self::AccountRoot => json!({
                "Fn::Join": ["", [
                    "arn:",
                    { "Ref": "AWS::Partition" },
                    ":iam::",
                    { "Ref": "AWS::AccountId" },
                    ":root"
                ]]
            }),
            Self::Arn(reference) => reference.to_json(),
        }
    }
}

/// A declarative permission grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyStatement {
    /// Effect
    pub effect: Effect,
    /// Actions, in insertion order
    pub actions: IndexSet<String>,
    /// Resources, in insertion order
    pub resources: IndexSet<Reference>,
    /// Principals (resource policies only)
    pub principals: IndexSet<Principal>,
}

impl PolicyStatement {
    /// Create an empty `Allow` statement
    #[must_use]
    pub fn allow() -> Self {
        Self::new(Effect::Allow)
    }

    /// Create an empty statement with the given effect
    #[must_use]
    pub fn new(effect: Effect) -> Self {
        Self {
            effect,
            actions: IndexSet::new(),
            resources: IndexSet::new(),
            principals: IndexSet::new(),
        }
    }

    /// Add actions
    #[must_use]
    pub fn with_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_actions(actions);
        self
    }

    /// Add a resource
    #[must_use]
    pub fn with_resource(mut self, resource: Reference) -> Self {
        self.add_resource(resource);
        self
    }

    /// Add actions in place
    pub fn add_actions<I, S>(&mut self, actions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions.extend(actions.into_iter().map(Into::into));
    }

    /// Add a resource in place
    pub fn add_resource(&mut self, resource: Reference) {
        self.resources.insert(resource);
    }

    /// Grant on every resource (`*`)
    pub fn add_all_resources(&mut self) {
        self.resources.insert(Reference::literal("*"));
    }

    /// Add a service principal by full name
    pub fn add_service_principal(&mut self, service: impl Into<String>) {
        self.principals.insert(Principal::Service(service.into()));
    }

    /// Add the account root principal
    pub fn add_account_root_principal(&mut self) {
        self.principals.insert(Principal::AccountRoot);
    }

    /// Declared resources that this statement points at
    pub fn referenced_resources(&self) -> impl Iterator<Item = &LogicalId> {
        self.resources
            .iter()
            .filter_map(Reference::target)
            .chain(self.principals.iter().filter_map(|p| match p {
                Principal::Arn(reference) => reference.target(),
                _ => None,
            }))
    }

    /// Render in the policy language layout
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert(
            "Effect".to_string(),
            Value::String(self.effect.as_str().to_string()),
        );
        out.insert(
            "Action".to_string(),
            collapse(self.actions.iter().map(|a| Value::String(a.clone())).collect()),
        );
        if !self.principals.is_empty() {
            let mut grouped: Map<String, Value> = Map::new();
            for group in ["AWS", "Service"] {
                let values: Vec<Value> = self
                    .principals
                    .iter()
                    .filter(|p| p.group() == group)
                    .map(Principal::to_json)
                    .collect();
                if !values.is_empty() {
                    grouped.insert(group.to_string(), collapse(values));
                }
            }
            out.insert("Principal".to_string(), Value::Object(grouped));
        }
        if !self.resources.is_empty() {
            out.insert(
                "Resource".to_string(),
                collapse(self.resources.iter().map(Reference::to_json).collect()),
            );
        }
        Value::Object(out)
    }
}

/// Single values render as scalars, several as an array
fn collapse(mut values: Vec<Value>) -> Value {
    if values.len() == 1 {
        values.remove(0)
    } else {
        Value::Array(values)
    }
}
