//! Declared resources and their properties.

use crate::config::Runtime;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strata_core::{Digest, LogicalId, Reference};
use strata_policy::{PolicyDocument, PolicyStatement, Principal};

/// Encryption key properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyProps {
    /// Description
    pub description: String,
    /// Key resource policy
    pub policy: PolicyDocument,
    /// Yearly automatic rotation
    pub enable_key_rotation: bool,
}

/// Notification topic properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicProps {
    /// Display name
    pub display_name: String,
    /// Key encrypting messages at rest
    pub master_key: Reference,
}

/// Subscription delivery protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    /// E-mail delivery
    Email,
}

impl Protocol {
    /// Provider protocol name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
        }
    }
}

/// Topic subscription properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionProps {
    /// Subscribed topic
    pub topic: Reference,
    /// Delivery protocol
    pub protocol: Protocol,
    /// Delivery endpoint
    pub endpoint: String,
}

/// Execution role properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleProps {
    /// Physical role name
    pub role_name: String,
    /// Service principals allowed to assume the role
    pub assumed_by: Vec<Principal>,
}

impl RoleProps {
    /// Trust policy rendered from `assumed_by`
    #[must_use]
    pub fn trust_policy(&self) -> PolicyDocument {
        let mut stmt = PolicyStatement::allow().with_actions(["sts:AssumeRole"]);
        stmt.principals.extend(self.assumed_by.iter().cloned());
        PolicyDocument::from_statements(vec![stmt])
    }
}

/// Managed policy properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedPolicyProps {
    /// Physical policy name
    pub policy_name: String,
    /// Granted permissions
    pub document: PolicyDocument,
    /// Roles the policy is attached to
    pub roles: Vec<Reference>,
}

/// Asset bundled into a layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetCode {
    /// Asset location, as configured
    pub location: String,
    /// Fingerprint of the location
    pub fingerprint: Digest,
}

impl AssetCode {
    /// Asset at `location`
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        let location = location.into();
        let fingerprint = Digest::compute(location.as_bytes());
        Self {
            location,
            fingerprint,
        }
    }
}

/// Packaging layer properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerProps {
    /// Layer name
    pub layer_name: String,
    /// Bundled code
    pub code: AssetCode,
    /// Compatible runtimes
    pub compatible_runtimes: Vec<Runtime>,
}

/// A declared resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resource {
    /// Encryption key
    Key(KeyProps),
    /// Notification topic
    Topic(TopicProps),
    /// Topic subscription
    Subscription(SubscriptionProps),
    /// Execution role
    Role(RoleProps),
    /// Managed policy
    ManagedPolicy(ManagedPolicyProps),
    /// Packaging layer
    Layer(LayerProps),
}

impl Resource {
    /// Provider type name
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Key(_) => "AWS::KMS::Key",
            Self::Topic(_) => "AWS::SNS::Topic",
            Self::Subscription(_) => "AWS::SNS::Subscription",
            Self::Role(_) => "AWS::IAM::Role",
            Self::ManagedPolicy(_) => "AWS::IAM::ManagedPolicy",
            Self::Layer(_) => "AWS::Lambda::LayerVersion",
        }
    }

    /// Physical name, for resources that carry one
    #[must_use]
    pub fn physical_name(&self) -> Option<&str> {
        match self {
            Self::Role(props) => Some(props.role_name.as_str()),
            Self::ManagedPolicy(props) => Some(props.policy_name.as_str()),
            _ => None,
        }
    }

    /// Resources this one needed at creation time
    #[must_use]
    pub fn references(&self) -> Vec<&LogicalId> {
        match self {
            Self::Key(props) => props.policy.referenced_resources().collect(),
            Self::Topic(props) => props.master_key.target().into_iter().collect(),
            Self::Subscription(props) => props.topic.target().into_iter().collect(),
            Self::Role(_) | Self::Layer(_) => Vec::new(),
            Self::ManagedPolicy(props) => props.document.referenced_resources().collect(),
        }
    }

    /// Resources attached after creation
    #[must_use]
    pub fn attachments(&self) -> Vec<&LogicalId> {
        match self {
            Self::ManagedPolicy(props) => props.roles.iter().filter_map(Reference::target).collect(),
            _ => Vec::new(),
        }
    }

    /// Properties in the provider's layout
    #[must_use]
    pub fn properties(&self) -> Value {
        match self {
            Self::Key(props) => json!({
                "Description": props.description,
                "EnableKeyRotation": props.enable_key_rotation,
                "KeyPolicy": props.policy.to_json(),
            }),
            Self::Topic(props) => json!({
                "DisplayName": props.display_name,
                "KmsMasterKeyId": props.master_key.to_json(),
            }),
            Self::Subscription(props) => json!({
                "Endpoint": props.endpoint,
                "Protocol": props.protocol.as_str(),
                "TopicArn": props.topic.to_json(),
            }),
            Self::Role(props) => json!({
                "AssumeRolePolicyDocument": props.trust_policy().to_json(),
                "RoleName": props.role_name,
            }),
            Self::ManagedPolicy(props) => json!({
                "ManagedPolicyName": props.policy_name,
                "PolicyDocument": props.document.to_json(),
                "Roles": props.roles.iter().map(Reference::to_json).collect::<Vec<_>>(),
            }),
            Self::Layer(props) => json!({
                "CompatibleRuntimes": props
                    .compatible_runtimes
                    .iter()
                    .map(Runtime::as_str)
                    .collect::<Vec<_>>(),
                "Content": {
                    "AssetPath": props.code.location,
                    "AssetHash": props.code.fingerprint.to_hex(),
                },
                "LayerName": props.layer_name,
            }),
        }
    }
}
