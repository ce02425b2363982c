//! STRATA Core Types
//!
//! Pure types shared by every STRATA crate: logical identifiers, resource
//! references, content digests and the core error type. No I/O.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod hash;
pub mod id;
pub mod reference;

// Re-exports
pub use error::{CoreError, CoreResult};
pub use hash::{Digest, HashError};
pub use id::{LogicalId, ScopeId};
pub use reference::{Attribute, Reference};
