//! Error types for the permission layer

use crate::types::AuthorizationType;
use thiserror::Error;

/// Permission layer errors
///
/// "Access denied" is never an error here; denials are ordinary `false` /
/// empty-set results. Errors cover startup wiring mistakes and downstream
/// data-access failures only.
#[derive(Debug, Error)]
pub enum PermissionError {
    /// No checker registered for an authorization type. A configuration
    /// error that should surface loudly, not a runtime denial.
    #[error("no resource checker registered for authorization type {0:?}")]
    CheckerNotRegistered(AuthorizationType),

    /// Downstream data-access failure, propagated verbatim without retry.
    #[error("store error: {0}")]
    Store(String),
}

/// Result type for permission operations
pub type Result<T> = std::result::Result<T, PermissionError>;
