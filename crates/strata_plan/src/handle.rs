//! Typed resource handles.
//!
//! A handle is returned by exactly one creation step and names the declared
//! resource plus the scope it lives in. Handles are only meaningful for the
//! assembly run that produced them.

use std::marker::PhantomData;
use strata_core::{Attribute, LogicalId, Reference, ScopeId};

/// Kind marker for a handle
pub trait ResourceKind {
    /// Kind name used in errors and logs
    const KIND: &'static str;
    /// Attribute that yields the resource's ARN
    const ARN_ATTRIBUTE: Attribute;
}

macro_rules! resource_kind {
    ($(#[$doc:meta])* $name:ident, $kind:literal, $attr:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name;

        impl ResourceKind for $name {
            const KIND: &'static str = $kind;
            const ARN_ATTRIBUTE: Attribute = $attr;
        }
    };
}

resource_kind!(
    /// Encryption key
    Key, "Key", Attribute::Arn
);
resource_kind!(
    /// Notification topic
    Topic, "Topic", Attribute::Ref
);
resource_kind!(
    /// Topic subscription
    Subscription, "Subscription", Attribute::Ref
);
resource_kind!(
    /// Execution role
    Role, "Role", Attribute::Arn
);
resource_kind!(
    /// Managed policy
    ManagedPolicy, "ManagedPolicy", Attribute::Ref
);
resource_kind!(
    /// Packaging layer
    Layer, "Layer", Attribute::Ref
);

/// Reference to a declared resource of kind `K`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Handle<K> {
    scope: ScopeId,
    id: LogicalId,
    _kind: PhantomData<K>,
}

impl<K: ResourceKind> Handle<K> {
    pub(crate) fn new(scope: ScopeId, id: LogicalId) -> Self {
        Self {
            scope,
            id,
            _kind: PhantomData,
        }
    }

    /// Logical ID of the resource
    #[must_use]
    pub fn id(&self) -> &LogicalId {
        &self.id
    }

    /// Scope the resource was declared in
    #[must_use]
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Kind name
    #[must_use]
    pub fn kind(&self) -> &'static str {
        K::KIND
    }

    /// ARN of the resource, resolved by the provisioning tool
    #[must_use]
    pub fn arn(&self) -> Reference {
        Reference::Resource {
            target: self.id.clone(),
            attribute: K::ARN_ATTRIBUTE,
        }
    }

    /// Primary reference of the resource
    #[must_use]
    pub fn reference(&self) -> Reference {
        Reference::ref_of(self.id.clone())
    }
}

impl<K: ResourceKind> std::fmt::Display for Handle<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", K::KIND, self.id)
    }
}

/// Encryption key handle
pub type KeyHandle = Handle<Key>;
/// Notification topic handle
pub type TopicHandle = Handle<Topic>;
/// Topic subscription handle
pub type SubscriptionHandle = Handle<Subscription>;
/// Execution role handle
pub type RoleHandle = Handle<Role>;
/// Managed policy handle
pub type PolicyHandle = Handle<ManagedPolicy>;
/// Packaging layer handle
pub type LayerHandle = Handle<Layer>;
