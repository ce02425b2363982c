//! Resource constructs.
//!
//! Free functions grouped by service. Each takes the deployment scope
//! explicitly, checks that every input handle belongs to that scope, and
//! registers exactly one new node (or one attachment).

pub mod iam;
pub mod kms;
pub mod layer;
pub mod sns;

use crate::assembly::AssemblyError;
use crate::handle::{Handle, ResourceKind};
use crate::scope::DeploymentScope;
use strata_core::{CoreError, LogicalId};

/// Fail with a composition error unless `handle` is live in `scope`
pub(crate) fn require<K: ResourceKind>(
    scope: &DeploymentScope,
    handle: &Handle<K>,
    needed_by: &str,
) -> Result<(), AssemblyError> {
    scope
        .check(handle)
        .map_err(|err| AssemblyError::composition(needed_by, handle.id().as_str(), err))
}

/// Fail with a composition error unless every referenced ID is declared
pub(crate) fn require_declared<'a>(
    scope: &DeploymentScope,
    ids: impl IntoIterator<Item = &'a LogicalId>,
    needed_by: &str,
) -> Result<(), AssemblyError> {
    for id in ids {
        if !scope.contains(id) {
            return Err(AssemblyError::composition(
                needed_by,
                id.as_str(),
                CoreError::NotFound {
                    kind: "Resource".to_string(),
                    id: id.to_string(),
                },
            ));
        }
    }
    Ok(())
}
