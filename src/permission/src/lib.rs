//! # TaskHive Permission Layer
//!
//! Pluggable authorization-check registry for the TaskHive platform.
//!
//! Each protected resource family (queues, projects, task groups,
//! namespaces, environments, worker groups, alert plugins and groups,
//! tenants, data sources, access tokens) registers a [`ResourceChecker`]
//! that knows how to list the ids a user may see and whether a user may
//! perform a named operation. [`PermissionService`] answers both questions
//! generically, applying the administrator bypass, without knowing any
//! family at compile time.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use taskhive_permission::{
//!     standard_registry, AuthorizationType, InMemoryStore, PermissionService, Stores,
//!     TracingAuditLog, User, UserType,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> taskhive_permission::Result<()> {
//! let backend = Arc::new(InMemoryStore::new());
//! backend.insert_user(User::new(7, UserType::GeneralUser)).await;
//! backend.grant_projects(7, [3, 4]).await;
//!
//! let stores = Stores::from_backend(backend);
//! let registry = Arc::new(standard_registry(&stores));
//! let service = PermissionService::new(registry, stores.users.clone());
//!
//! let log = TracingAuditLog;
//! let allowed = service
//!     .resource_permission_check(AuthorizationType::Projects, &[3], 7, &log)
//!     .await?;
//! assert!(allowed);
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod checker;
pub mod checkers;
pub mod error;
pub mod registry;
pub mod service;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use audit::{AuditLog, TracingAuditLog};
pub use checker::ResourceChecker;
pub use checkers::standard_registry;
pub use error::{PermissionError, Result};
pub use registry::CheckerRegistry;
pub use service::PermissionService;
pub use store::{InMemoryStore, Stores, UserStore};
pub use types::{AuthorizationType, ResourceIdSet, User, UserType, ADMIN_USER_ID};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
