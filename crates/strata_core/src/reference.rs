//! References to resource attributes.
//!
//! A [`Reference`] is either a literal value taken from configuration or a
//! pointer to an attribute of a resource declared in the same scope. The
//! provisioning tool resolves pointers at deploy time.

use crate::id::LogicalId;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Resource attribute that can be referenced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Attribute {
    /// The resource's primary reference (name or physical ID)
    Ref,
    /// The resource's ARN
    Arn,
}

/// A value that may point at another resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Reference {
    /// Literal value from configuration
    Literal(String),
    /// Attribute of a resource declared in the same scope
    Resource {
        /// Target resource
        target: LogicalId,
        /// Referenced attribute
        attribute: Attribute,
    },
    /// Literal suffix appended to another reference (e.g. `<arn>/*`)
    Suffixed {
        /// Base reference
        base: Box<Reference>,
        /// Appended literal
        suffix: String,
    },
}

impl Reference {
    /// Literal value
    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    /// ARN of a declared resource
    #[must_use]
    pub fn arn_of(target: LogicalId) -> Self {
        Self::Resource {
            target,
            attribute: Attribute::Arn,
        }
    }

    /// Primary reference of a declared resource
    #[must_use]
    pub fn ref_of(target: LogicalId) -> Self {
        Self::Resource {
            target,
            attribute: Attribute::Ref,
        }
    }

    /// Append a literal suffix
    #[must_use]
    pub fn with_suffix(self, suffix: impl Into<String>) -> Self {
        Self::Suffixed {
            base: Box::new(self),
            suffix: suffix.into(),
        }
    }

    /// Resource this reference points at, if any
    #[must_use]
    pub fn target(&self) -> Option<&LogicalId> {
        match self {
            Self::Literal(_) => None,
            Self::Resource { target, .. } => Some(target),
            Self::Suffixed { base, .. } => base.target(),
        }
    }

    /// Render in the intrinsic-function form consumed by the provisioning tool
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Literal(value) => Value::String(value.clone()),
            Self::Resource {
                target,
                attribute: Attribute::Ref,
            } => json!({ "Ref": target.as_str() }),
            Self::Resource {
                target,
                attribute: Attribute::Arn,
            } => json!({ "Fn::GetAtt": [target.as_str(), "Arn"] }),
            Self::Suffixed { base, suffix } => match base.to_json() {
                Value::String(value) => Value::String(format!("{}{}", value, suffix)),
                resolved => json!({ "Fn::Join": ["", [resolved, suffix]] }),
            },
        }
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(value) => f.write_str(value),
            Self::Resource { target, attribute } => write!(f, "${{{}.{:?}}}", target, attribute),
            Self::Suffixed { base, suffix } => write!(f, "{}{}", base, suffix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_id() -> LogicalId {
        LogicalId::new("pm-kms-key-id").unwrap()
    }

    #[test]
    fn test_literal_has_no_target() {
        let r = Reference::literal("arn:aws:s3:::bucket");
        assert!(r.target().is_none());
        assert_eq!(r.to_json(), Value::String("arn:aws:s3:::bucket".to_string()));
    }

    #[test]
    fn test_arn_of_renders_get_att() {
        let r = Reference::arn_of(key_id());
        assert_eq!(r.target(), Some(&key_id()));
        assert_eq!(r.to_json(), json!({ "Fn::GetAtt": ["pm-kms-key-id", "Arn"] }));
    }

    #[test]
    fn test_ref_of_renders_ref() {
        let r = Reference::ref_of(key_id());
        assert_eq!(r.to_json(), json!({ "Ref": "pm-kms-key-id" }));
    }

    #[test]
    fn test_suffixed_keeps_target() {
        let r = Reference::arn_of(key_id()).with_suffix("/*");
        assert_eq!(r.target(), Some(&key_id()));
        assert_eq!(r.to_string(), "${pm-kms-key-id.Arn}/*");
    }

    #[test]
    fn test_suffixed_literal_stays_literal() {
        let r = Reference::literal("arn:aws:s3:::bucket").with_suffix("/*");
        assert_eq!(r.to_json(), Value::String("arn:aws:s3:::bucket/*".to_string()));
    }

    #[test]
    fn test_suffixed_resource_renders_join() {
        let r = Reference::arn_of(key_id()).with_suffix("/*");
        assert_eq!(
            r.to_json(),
            json!({ "Fn::Join": ["", [{ "Fn::GetAtt": ["pm-kms-key-id", "Arn"] }, "/*"]] })
        );
    }
}
