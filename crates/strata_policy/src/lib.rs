//! STRATA Policy System
//!
//! Declarative permission grants: statements, documents, wildcard
//! matching and the catalog of grants used by stack assembly.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod grants;
pub mod matcher;
pub mod statement;

pub use document::{PolicyDocument, PolicyError, POLICY_LANGUAGE_VERSION};
pub use matcher::Matcher;
pub use statement::{Effect, Principal, PolicyStatement};
