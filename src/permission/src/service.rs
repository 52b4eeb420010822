//! Dispatcher façade answering the generic permission questions.

use crate::audit::AuditLog;
use crate::error::Result;
use crate::registry::CheckerRegistry;
use crate::store::UserStore;
use crate::types::{AuthorizationType, ResourceIdSet, ADMIN_USER_ID};
use std::sync::Arc;
use tracing::debug;

/// Generic permission entry points over the checker registry.
///
/// The service performs no I/O of its own; the only awaits are user
/// resolution and the store calls inside the matched checker, and no lock
/// is held across them. Many request-handling tasks may call it
/// concurrently.
pub struct PermissionService {
    registry: Arc<CheckerRegistry>,
    users: Arc<dyn UserStore>,
}

impl PermissionService {
    pub fn new(registry: Arc<CheckerRegistry>, users: Arc<dyn UserStore>) -> Self {
        Self { registry, users }
    }

    /// Does the user own every id in `need_checks`?
    ///
    /// An empty `need_checks` is trivially allowed. Otherwise the matched
    /// checker's owned-id set is fetched with the raw caller id (no admin
    /// bypass on this path) and the answer is plain set containment. A
    /// shortfall is a normal `false` with a warning naming the user id, not
    /// an error.
    pub async fn resource_permission_check(
        &self,
        auth_type: AuthorizationType,
        need_checks: &[i32],
        user_id: i32,
        log: &dyn AuditLog,
    ) -> Result<bool> {
        if need_checks.is_empty() {
            return Ok(true);
        }

        debug!(
            "resource permission check: type={:?}, user_id={}, requested={}",
            auth_type,
            user_id,
            need_checks.len()
        );

        let requested: ResourceIdSet = need_checks.iter().copied().collect();
        let checker = self.registry.checker_for(auth_type)?;
        let owned = checker.list_authorized_resource_ids(user_id, log).await?;

        let allowed = requested.is_subset(&owned);
        if !allowed {
            log.warn(&format!(
                "user does not have permission on all requested {auth_type:?} resources, user_id: {user_id}"
            ));
        }
        Ok(allowed)
    }

    /// May the user perform the operation named by `permission_key`?
    ///
    /// A missing user fails closed with an error-level audit line.
    /// Administrators bypass every per-family operation check
    /// unconditionally; ordinary users get the matched checker's answer.
    pub async fn operation_permission_check(
        &self,
        auth_type: AuthorizationType,
        user_id: i32,
        permission_key: &str,
        log: &dyn AuditLog,
    ) -> Result<bool> {
        let Some(user) = self.users.user_by_id(user_id).await? else {
            log.error(&format!("user does not exist, user_id: {user_id}"));
            return Ok(false);
        };
        if user.is_admin() {
            return Ok(true);
        }

        debug!(
            "operation permission check: type={:?}, user_id={}, key={}",
            auth_type, user_id, permission_key
        );

        let checker = self.registry.checker_for(auth_type)?;
        checker.permission_check(user_id, permission_key, log).await
    }

    /// Every id of the family the user is entitled to see.
    ///
    /// A missing user fails closed with an empty set. Administrators are
    /// delegated under the sentinel id so checkers with an administrative
    /// view return their unrestricted universe.
    pub async fn user_owned_resource_ids(
        &self,
        auth_type: AuthorizationType,
        user_id: i32,
        log: &dyn AuditLog,
    ) -> Result<ResourceIdSet> {
        let Some(user) = self.users.user_by_id(user_id).await? else {
            log.error(&format!("user does not exist, user_id: {user_id}"));
            return Ok(ResourceIdSet::new());
        };

        let effective_id = if user.is_admin() { ADMIN_USER_ID } else { user.id };
        let checker = self.registry.checker_for(auth_type)?;
        checker.list_authorized_resource_ids(effective_id, log).await
    }

    /// Whether the whole permission subsystem is switched off.
    ///
    /// Always `false` here; the flag exists for deployment modes that
    /// disable authorization entirely, which this crate does not implement.
    /// Callers are expected to skip checks when it reports `true`.
    pub fn function_disabled(&self) -> bool {
        false
    }
}
