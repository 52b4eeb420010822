//! Concrete per-resource-family checkers.
//!
//! Each checker is a thin adapter over its data-access trait. The policy
//! table lives here and nowhere else:
//!
//! | family | listing | operation check |
//! |---|---|---|
//! | queue | admin view only | deny |
//! | projects | per-user grants | allow |
//! | task group | per-user grants | allow |
//! | k8s namespace | per-user grants | deny |
//! | environment | unrestricted | admins only |
//! | worker group | unrestricted | deny |
//! | alert plugin instance | empty | deny |
//! | alert group | unrestricted | deny |
//! | tenant | unrestricted | deny |
//! | data source | per-user grants | allow |
//! | access token | per-user grants | deny |

use crate::audit::AuditLog;
use crate::checker::ResourceChecker;
use crate::error::Result;
use crate::registry::CheckerRegistry;
use crate::store::{
    AccessTokenStore, AlertGroupStore, DataSourceStore, EnvironmentStore, NamespaceStore,
    ProjectStore, QueueStore, Stores, TaskGroupStore, TenantStore, UserStore, WorkerGroupStore,
};
use crate::types::{AuthorizationType, ResourceIdSet, ADMIN_USER_ID};
use async_trait::async_trait;
use std::sync::Arc;

/// Queues carry no per-user grants; only the administrative view lists
/// them, and no queue operation is granted through this path.
pub struct QueueChecker {
    queues: Arc<dyn QueueStore>,
}

impl QueueChecker {
    pub fn new(queues: Arc<dyn QueueStore>) -> Self {
        Self { queues }
    }
}

#[async_trait]
impl ResourceChecker for QueueChecker {
    fn authorization_types(&self) -> &[AuthorizationType] {
        &[AuthorizationType::Queue]
    }

    async fn list_authorized_resource_ids(
        &self,
        user_id: i32,
        _log: &dyn AuditLog,
    ) -> Result<ResourceIdSet> {
        if user_id != ADMIN_USER_ID {
            return Ok(ResourceIdSet::new());
        }
        Ok(self.queues.all_queue_ids().await?.into_iter().collect())
    }

    async fn permission_check(
        &self,
        _user_id: i32,
        _permission_key: &str,
        _log: &dyn AuditLog,
    ) -> Result<bool> {
        Ok(false)
    }
}

pub struct ProjectChecker {
    projects: Arc<dyn ProjectStore>,
}

impl ProjectChecker {
    pub fn new(projects: Arc<dyn ProjectStore>) -> Self {
        Self { projects }
    }
}

#[async_trait]
impl ResourceChecker for ProjectChecker {
    fn authorization_types(&self) -> &[AuthorizationType] {
        &[AuthorizationType::Projects]
    }

    async fn list_authorized_resource_ids(
        &self,
        user_id: i32,
        _log: &dyn AuditLog,
    ) -> Result<ResourceIdSet> {
        Ok(self
            .projects
            .authorized_project_ids(user_id)
            .await?
            .into_iter()
            .collect())
    }

    async fn permission_check(
        &self,
        _user_id: i32,
        _permission_key: &str,
        _log: &dyn AuditLog,
    ) -> Result<bool> {
        // every user may create projects
        Ok(true)
    }
}

pub struct TaskGroupChecker {
    task_groups: Arc<dyn TaskGroupStore>,
}

impl TaskGroupChecker {
    pub fn new(task_groups: Arc<dyn TaskGroupStore>) -> Self {
        Self { task_groups }
    }
}

#[async_trait]
impl ResourceChecker for TaskGroupChecker {
    fn authorization_types(&self) -> &[AuthorizationType] {
        &[AuthorizationType::TaskGroup]
    }

    async fn list_authorized_resource_ids(
        &self,
        user_id: i32,
        _log: &dyn AuditLog,
    ) -> Result<ResourceIdSet> {
        Ok(self
            .task_groups
            .authorized_task_group_ids(user_id)
            .await?
            .into_iter()
            .collect())
    }

    async fn permission_check(
        &self,
        _user_id: i32,
        _permission_key: &str,
        _log: &dyn AuditLog,
    ) -> Result<bool> {
        Ok(true)
    }
}

pub struct K8sNamespaceChecker {
    namespaces: Arc<dyn NamespaceStore>,
}

impl K8sNamespaceChecker {
    pub fn new(namespaces: Arc<dyn NamespaceStore>) -> Self {
        Self { namespaces }
    }
}

#[async_trait]
impl ResourceChecker for K8sNamespaceChecker {
    fn authorization_types(&self) -> &[AuthorizationType] {
        &[AuthorizationType::K8sNamespace]
    }

    async fn list_authorized_resource_ids(
        &self,
        user_id: i32,
        _log: &dyn AuditLog,
    ) -> Result<ResourceIdSet> {
        Ok(self
            .namespaces
            .authorized_namespace_ids(user_id)
            .await?
            .into_iter()
            .collect())
    }

    async fn permission_check(
        &self,
        _user_id: i32,
        _permission_key: &str,
        _log: &dyn AuditLog,
    ) -> Result<bool> {
        Ok(false)
    }
}

/// Environments are listed unrestricted for any caller, but only
/// administrators may operate on them; this is the one checker that
/// resolves the user itself.
pub struct EnvironmentChecker {
    environments: Arc<dyn EnvironmentStore>,
    users: Arc<dyn UserStore>,
}

impl EnvironmentChecker {
    pub fn new(environments: Arc<dyn EnvironmentStore>, users: Arc<dyn UserStore>) -> Self {
        Self {
            environments,
            users,
        }
    }
}

#[async_trait]
impl ResourceChecker for EnvironmentChecker {
    fn authorization_types(&self) -> &[AuthorizationType] {
        &[AuthorizationType::Environment]
    }

    async fn list_authorized_resource_ids(
        &self,
        _user_id: i32,
        _log: &dyn AuditLog,
    ) -> Result<ResourceIdSet> {
        Ok(self
            .environments
            .all_environment_ids()
            .await?
            .into_iter()
            .collect())
    }

    async fn permission_check(
        &self,
        user_id: i32,
        _permission_key: &str,
        log: &dyn AuditLog,
    ) -> Result<bool> {
        let Some(user) = self.users.user_by_id(user_id).await? else {
            log.error(&format!("user does not exist, user_id: {user_id}"));
            return Ok(false);
        };
        Ok(user.is_admin())
    }
}

pub struct WorkerGroupChecker {
    worker_groups: Arc<dyn WorkerGroupStore>,
}

impl WorkerGroupChecker {
    pub fn new(worker_groups: Arc<dyn WorkerGroupStore>) -> Self {
        Self { worker_groups }
    }
}

#[async_trait]
impl ResourceChecker for WorkerGroupChecker {
    fn authorization_types(&self) -> &[AuthorizationType] {
        &[AuthorizationType::WorkerGroup]
    }

    async fn list_authorized_resource_ids(
        &self,
        _user_id: i32,
        _log: &dyn AuditLog,
    ) -> Result<ResourceIdSet> {
        Ok(self
            .worker_groups
            .all_worker_group_ids()
            .await?
            .into_iter()
            .collect())
    }

    async fn permission_check(
        &self,
        _user_id: i32,
        _permission_key: &str,
        _log: &dyn AuditLog,
    ) -> Result<bool> {
        Ok(false)
    }
}

/// Alert plugin instances are never listed per user and never grant
/// operations; access goes through explicit id-set checks elsewhere.
pub struct AlertPluginInstanceChecker;

#[async_trait]
impl ResourceChecker for AlertPluginInstanceChecker {
    fn authorization_types(&self) -> &[AuthorizationType] {
        &[AuthorizationType::AlertPluginInstance]
    }

    async fn list_authorized_resource_ids(
        &self,
        _user_id: i32,
        _log: &dyn AuditLog,
    ) -> Result<ResourceIdSet> {
        Ok(ResourceIdSet::new())
    }

    async fn permission_check(
        &self,
        _user_id: i32,
        _permission_key: &str,
        _log: &dyn AuditLog,
    ) -> Result<bool> {
        Ok(false)
    }
}

pub struct AlertGroupChecker {
    alert_groups: Arc<dyn AlertGroupStore>,
}

impl AlertGroupChecker {
    pub fn new(alert_groups: Arc<dyn AlertGroupStore>) -> Self {
        Self { alert_groups }
    }
}

#[async_trait]
impl ResourceChecker for AlertGroupChecker {
    fn authorization_types(&self) -> &[AuthorizationType] {
        &[AuthorizationType::AlertGroup]
    }

    async fn list_authorized_resource_ids(
        &self,
        _user_id: i32,
        _log: &dyn AuditLog,
    ) -> Result<ResourceIdSet> {
        Ok(self
            .alert_groups
            .all_alert_group_ids()
            .await?
            .into_iter()
            .collect())
    }

    async fn permission_check(
        &self,
        _user_id: i32,
        _permission_key: &str,
        _log: &dyn AuditLog,
    ) -> Result<bool> {
        Ok(false)
    }
}

pub struct TenantChecker {
    tenants: Arc<dyn TenantStore>,
}

impl TenantChecker {
    pub fn new(tenants: Arc<dyn TenantStore>) -> Self {
        Self { tenants }
    }
}

#[async_trait]
impl ResourceChecker for TenantChecker {
    fn authorization_types(&self) -> &[AuthorizationType] {
        &[AuthorizationType::Tenant]
    }

    async fn list_authorized_resource_ids(
        &self,
        _user_id: i32,
        _log: &dyn AuditLog,
    ) -> Result<ResourceIdSet> {
        Ok(self.tenants.all_tenant_ids().await?.into_iter().collect())
    }

    async fn permission_check(
        &self,
        _user_id: i32,
        _permission_key: &str,
        _log: &dyn AuditLog,
    ) -> Result<bool> {
        Ok(false)
    }
}

pub struct DataSourceChecker {
    data_sources: Arc<dyn DataSourceStore>,
}

impl DataSourceChecker {
    pub fn new(data_sources: Arc<dyn DataSourceStore>) -> Self {
        Self { data_sources }
    }
}

#[async_trait]
impl ResourceChecker for DataSourceChecker {
    fn authorization_types(&self) -> &[AuthorizationType] {
        &[AuthorizationType::Datasource]
    }

    async fn list_authorized_resource_ids(
        &self,
        user_id: i32,
        _log: &dyn AuditLog,
    ) -> Result<ResourceIdSet> {
        Ok(self
            .data_sources
            .authorized_data_source_ids(user_id)
            .await?
            .into_iter()
            .collect())
    }

    async fn permission_check(
        &self,
        _user_id: i32,
        _permission_key: &str,
        _log: &dyn AuditLog,
    ) -> Result<bool> {
        Ok(true)
    }
}

pub struct AccessTokenChecker {
    access_tokens: Arc<dyn AccessTokenStore>,
}

impl AccessTokenChecker {
    pub fn new(access_tokens: Arc<dyn AccessTokenStore>) -> Self {
        Self { access_tokens }
    }
}

#[async_trait]
impl ResourceChecker for AccessTokenChecker {
    fn authorization_types(&self) -> &[AuthorizationType] {
        &[AuthorizationType::AccessToken]
    }

    async fn list_authorized_resource_ids(
        &self,
        user_id: i32,
        _log: &dyn AuditLog,
    ) -> Result<ResourceIdSet> {
        Ok(self
            .access_tokens
            .authorized_access_token_ids(user_id)
            .await?
            .into_iter()
            .collect())
    }

    async fn permission_check(
        &self,
        _user_id: i32,
        _permission_key: &str,
        _log: &dyn AuditLog,
    ) -> Result<bool> {
        Ok(false)
    }
}

/// Build a registry with the full standard checker set attached.
pub fn standard_registry(stores: &Stores) -> CheckerRegistry {
    let registry = CheckerRegistry::new();
    registry.register(Arc::new(QueueChecker::new(stores.queues.clone())));
    registry.register(Arc::new(ProjectChecker::new(stores.projects.clone())));
    registry.register(Arc::new(TaskGroupChecker::new(stores.task_groups.clone())));
    registry.register(Arc::new(K8sNamespaceChecker::new(stores.namespaces.clone())));
    registry.register(Arc::new(EnvironmentChecker::new(
        stores.environments.clone(),
        stores.users.clone(),
    )));
    registry.register(Arc::new(WorkerGroupChecker::new(
        stores.worker_groups.clone(),
    )));
    registry.register(Arc::new(AlertPluginInstanceChecker));
    registry.register(Arc::new(AlertGroupChecker::new(stores.alert_groups.clone())));
    registry.register(Arc::new(TenantChecker::new(stores.tenants.clone())));
    registry.register(Arc::new(DataSourceChecker::new(stores.data_sources.clone())));
    registry.register(Arc::new(AccessTokenChecker::new(
        stores.access_tokens.clone(),
    )));
    registry
}
