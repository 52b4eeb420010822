//! Core permission types

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Sentinel user id under which checkers expose their administrative
/// all-resources view.
///
/// Inherited from the wider platform: user id 0 is never a real account,
/// and checkers that support an unrestricted listing return their full
/// universe when queried with it. Changing the sentinel would change
/// observable behavior for every checker, so it stays.
pub const ADMIN_USER_ID: i32 = 0;

/// Resource categories protected by the permission layer.
///
/// The set is closed at compile time: supporting a new category means
/// writing a new [`ResourceChecker`](crate::checker::ResourceChecker) and
/// registering it, never editing the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorizationType {
    Queue,
    Projects,
    TaskGroup,
    K8sNamespace,
    Environment,
    WorkerGroup,
    AlertPluginInstance,
    AlertGroup,
    Tenant,
    Datasource,
    AccessToken,
}

/// User classification as reported by the user directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    /// Administrators bypass per-type operation checks and receive the
    /// unrestricted resource universe on bulk listings.
    AdminUser,
    GeneralUser,
}

/// A user as resolved from the external user directory.
///
/// Owned by the directory, never by this crate; the permission layer only
/// reads the admin/ordinary classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub user_type: UserType,
}

impl User {
    pub fn new(id: i32, user_type: UserType) -> Self {
        Self { id, user_type }
    }

    pub fn is_admin(&self) -> bool {
        self.user_type == UserType::AdminUser
    }
}

/// Set of resource identifiers a user is entitled to see.
///
/// Recomputed on every call; this crate never caches ownership.
pub type ResourceIdSet = HashSet<i32>;
