//! Tag → checker registry.

use crate::checker::ResourceChecker;
use crate::error::{PermissionError, Result};
use crate::types::AuthorizationType;
use dashmap::DashMap;
use std::sync::Arc;

/// Mapping from [`AuthorizationType`] to its [`ResourceChecker`].
///
/// Populated once during startup and read lock-free from every
/// request-handling task afterwards; `DashMap` keeps the brief window where
/// registration and first requests interleave safe. Registering two
/// checkers for the same tag is a configuration error, the last
/// registration wins.
pub struct CheckerRegistry {
    checkers: DashMap<AuthorizationType, Arc<dyn ResourceChecker>>,
}

impl CheckerRegistry {
    pub fn new() -> Self {
        Self {
            checkers: DashMap::new(),
        }
    }

    /// Attach a checker under every tag it declares.
    pub fn register(&self, checker: Arc<dyn ResourceChecker>) {
        for auth_type in checker.authorization_types() {
            self.checkers.insert(*auth_type, Arc::clone(&checker));
        }
    }

    /// Look up the checker for a tag.
    ///
    /// A missing tag means the startup wiring never registered this family;
    /// it surfaces as [`PermissionError::CheckerNotRegistered`] so the
    /// caller fails its request loudly instead of treating it as a denial.
    pub fn checker_for(&self, auth_type: AuthorizationType) -> Result<Arc<dyn ResourceChecker>> {
        self.checkers
            .get(&auth_type)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(PermissionError::CheckerNotRegistered(auth_type))
    }

    /// Number of registered tags.
    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }
}

impl Default for CheckerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
