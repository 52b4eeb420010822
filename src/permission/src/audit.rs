//! Audit log sink for denial and lookup-failure lines.
//!
//! The sink is passed explicitly into every check call instead of living as
//! ambient global state, so the same dispatcher instance can serve callers
//! with different audit destinations. [`TracingAuditLog`] is the default
//! and forwards to whatever `tracing` subscriber is installed.

/// Destination for audit lines emitted by checkers and the dispatcher.
pub trait AuditLog: Send + Sync {
    /// Denials and ownership shortfalls.
    fn warn(&self, message: &str);

    /// Lookup failures, e.g. an unknown user id.
    fn error(&self, message: &str);
}

/// [`AuditLog`] backed by the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditLog;

impl AuditLog for TracingAuditLog {
    fn warn(&self, message: &str) {
        tracing::warn!(target: "permission_audit", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "permission_audit", "{message}");
    }
}
