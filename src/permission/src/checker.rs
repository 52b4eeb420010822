//! The per-resource-family checker contract.

use crate::audit::AuditLog;
use crate::error::Result;
use crate::types::{AuthorizationType, ResourceIdSet};
use async_trait::async_trait;

/// Listing and operation-permission logic for one resource family.
///
/// One instance exists per family, constructed at startup and owned by the
/// [`CheckerRegistry`](crate::registry::CheckerRegistry) for the process
/// lifetime. Implementations are deliberately heterogeneous: each family
/// owns its authorization semantics (some always deny operations, some
/// always allow, some consult the caller's role) and the dispatcher imposes
/// no default.
#[async_trait]
pub trait ResourceChecker: Send + Sync {
    /// Tags this checker answers for. Must be non-empty; several tags may
    /// map to the same instance.
    fn authorization_types(&self) -> &[AuthorizationType];

    /// Every resource id of this family the user is entitled to see.
    ///
    /// For the sentinel [`ADMIN_USER_ID`](crate::types::ADMIN_USER_ID) a
    /// checker with an administrative view returns its full universe. A
    /// valid but unknown user id yields an empty set, never an error; `Err`
    /// is reserved for downstream store failures.
    async fn list_authorized_resource_ids(
        &self,
        user_id: i32,
        log: &dyn AuditLog,
    ) -> Result<ResourceIdSet>;

    /// Whether the user may perform the operation named by
    /// `permission_key` on this resource family.
    ///
    /// `permission_key` is free-form (a URL or action name); no checker
    /// parses it today, but it travels with the call for ones that might.
    async fn permission_check(
        &self,
        user_id: i32,
        permission_key: &str,
        log: &dyn AuditLog,
    ) -> Result<bool>;
}
