//! External data-access collaborators.
//!
//! The permission layer never talks to a database itself; each resource
//! family declares the one query it needs as a narrow trait, and user
//! resolution goes through [`UserStore`]. Production wires these to the DAO
//! layer; [`InMemoryStore`] backs tests and embedded deployments.

use crate::error::Result;
use crate::types::User;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// User directory lookup.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Resolve a user by id; `None` when no such user exists.
    async fn user_by_id(&self, user_id: i32) -> Result<Option<User>>;
}

/// Queue listing. Queues have no per-user grants; only the administrative
/// view enumerates them.
#[async_trait]
pub trait QueueStore: Send + Sync {
    async fn all_queue_ids(&self) -> Result<Vec<i32>>;
}

/// Projects a user owns or has been granted.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn authorized_project_ids(&self, user_id: i32) -> Result<Vec<i32>>;
}

/// Task groups visible to a user.
#[async_trait]
pub trait TaskGroupStore: Send + Sync {
    async fn authorized_task_group_ids(&self, user_id: i32) -> Result<Vec<i32>>;
}

/// Kubernetes namespaces explicitly authorized to a user.
#[async_trait]
pub trait NamespaceStore: Send + Sync {
    async fn authorized_namespace_ids(&self, user_id: i32) -> Result<Vec<i32>>;
}

/// Environment listing; environments are visible to every caller.
#[async_trait]
pub trait EnvironmentStore: Send + Sync {
    async fn all_environment_ids(&self) -> Result<Vec<i32>>;
}

/// Worker group listing; worker groups are visible to every caller.
#[async_trait]
pub trait WorkerGroupStore: Send + Sync {
    async fn all_worker_group_ids(&self) -> Result<Vec<i32>>;
}

/// Alert group listing; alert groups are visible to every caller.
#[async_trait]
pub trait AlertGroupStore: Send + Sync {
    async fn all_alert_group_ids(&self) -> Result<Vec<i32>>;
}

/// Tenant listing; tenants are visible to every caller.
#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn all_tenant_ids(&self) -> Result<Vec<i32>>;
}

/// Data sources visible to a user.
#[async_trait]
pub trait DataSourceStore: Send + Sync {
    async fn authorized_data_source_ids(&self, user_id: i32) -> Result<Vec<i32>>;
}

/// Access tokens visible to a user.
#[async_trait]
pub trait AccessTokenStore: Send + Sync {
    async fn authorized_access_token_ids(&self, user_id: i32) -> Result<Vec<i32>>;
}

/// Handles to every collaborator the standard checkers and dispatcher need.
///
/// Fields are public so individual stores can be swapped out, e.g. a test
/// replacing one of them with a failing double.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub queues: Arc<dyn QueueStore>,
    pub projects: Arc<dyn ProjectStore>,
    pub task_groups: Arc<dyn TaskGroupStore>,
    pub namespaces: Arc<dyn NamespaceStore>,
    pub environments: Arc<dyn EnvironmentStore>,
    pub worker_groups: Arc<dyn WorkerGroupStore>,
    pub alert_groups: Arc<dyn AlertGroupStore>,
    pub tenants: Arc<dyn TenantStore>,
    pub data_sources: Arc<dyn DataSourceStore>,
    pub access_tokens: Arc<dyn AccessTokenStore>,
}

impl Stores {
    /// Build a bundle from one backend implementing every store trait.
    pub fn from_backend<S>(backend: Arc<S>) -> Self
    where
        S: UserStore
            + QueueStore
            + ProjectStore
            + TaskGroupStore
            + NamespaceStore
            + EnvironmentStore
            + WorkerGroupStore
            + AlertGroupStore
            + TenantStore
            + DataSourceStore
            + AccessTokenStore
            + 'static,
    {
        Self {
            users: backend.clone(),
            queues: backend.clone(),
            projects: backend.clone(),
            task_groups: backend.clone(),
            namespaces: backend.clone(),
            environments: backend.clone(),
            worker_groups: backend.clone(),
            alert_groups: backend.clone(),
            tenants: backend.clone(),
            data_sources: backend.clone(),
            access_tokens: backend,
        }
    }
}

#[derive(Default)]
struct InMemoryData {
    users: HashMap<i32, User>,
    queues: Vec<i32>,
    environments: Vec<i32>,
    worker_groups: Vec<i32>,
    alert_groups: Vec<i32>,
    tenants: Vec<i32>,
    // user id -> granted resource ids
    projects: HashMap<i32, Vec<i32>>,
    task_groups: HashMap<i32, Vec<i32>>,
    namespaces: HashMap<i32, Vec<i32>>,
    data_sources: HashMap<i32, Vec<i32>>,
    access_tokens: HashMap<i32, Vec<i32>>,
}

/// In-memory backend implementing every store trait.
pub struct InMemoryStore {
    data: RwLock<InMemoryData>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(InMemoryData::default()),
        }
    }

    pub async fn insert_user(&self, user: User) {
        self.data.write().await.users.insert(user.id, user);
    }

    pub async fn insert_queues(&self, ids: impl IntoIterator<Item = i32>) {
        self.data.write().await.queues.extend(ids);
    }

    pub async fn insert_environments(&self, ids: impl IntoIterator<Item = i32>) {
        self.data.write().await.environments.extend(ids);
    }

    pub async fn insert_worker_groups(&self, ids: impl IntoIterator<Item = i32>) {
        self.data.write().await.worker_groups.extend(ids);
    }

    pub async fn insert_alert_groups(&self, ids: impl IntoIterator<Item = i32>) {
        self.data.write().await.alert_groups.extend(ids);
    }

    pub async fn insert_tenants(&self, ids: impl IntoIterator<Item = i32>) {
        self.data.write().await.tenants.extend(ids);
    }

    pub async fn grant_projects(&self, user_id: i32, ids: impl IntoIterator<Item = i32>) {
        let mut data = self.data.write().await;
        data.projects.entry(user_id).or_default().extend(ids);
    }

    pub async fn grant_task_groups(&self, user_id: i32, ids: impl IntoIterator<Item = i32>) {
        let mut data = self.data.write().await;
        data.task_groups.entry(user_id).or_default().extend(ids);
    }

    pub async fn grant_namespaces(&self, user_id: i32, ids: impl IntoIterator<Item = i32>) {
        let mut data = self.data.write().await;
        data.namespaces.entry(user_id).or_default().extend(ids);
    }

    pub async fn grant_data_sources(&self, user_id: i32, ids: impl IntoIterator<Item = i32>) {
        let mut data = self.data.write().await;
        data.data_sources.entry(user_id).or_default().extend(ids);
    }

    pub async fn grant_access_tokens(&self, user_id: i32, ids: impl IntoIterator<Item = i32>) {
        let mut data = self.data.write().await;
        data.access_tokens.entry(user_id).or_default().extend(ids);
    }

    async fn granted(&self, table: fn(&InMemoryData) -> &HashMap<i32, Vec<i32>>, user_id: i32) -> Vec<i32> {
        let data = self.data.read().await;
        table(&data).get(&user_id).cloned().unwrap_or_default()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn user_by_id(&self, user_id: i32) -> Result<Option<User>> {
        Ok(self.data.read().await.users.get(&user_id).cloned())
    }
}

#[async_trait]
impl QueueStore for InMemoryStore {
    async fn all_queue_ids(&self) -> Result<Vec<i32>> {
        Ok(self.data.read().await.queues.clone())
    }
}

#[async_trait]
impl ProjectStore for InMemoryStore {
    async fn authorized_project_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        Ok(self.granted(|d| &d.projects, user_id).await)
    }
}

#[async_trait]
impl TaskGroupStore for InMemoryStore {
    async fn authorized_task_group_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        Ok(self.granted(|d| &d.task_groups, user_id).await)
    }
}

#[async_trait]
impl NamespaceStore for InMemoryStore {
    async fn authorized_namespace_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        Ok(self.granted(|d| &d.namespaces, user_id).await)
    }
}

#[async_trait]
impl EnvironmentStore for InMemoryStore {
    async fn all_environment_ids(&self) -> Result<Vec<i32>> {
        Ok(self.data.read().await.environments.clone())
    }
}

#[async_trait]
impl WorkerGroupStore for InMemoryStore {
    async fn all_worker_group_ids(&self) -> Result<Vec<i32>> {
        Ok(self.data.read().await.worker_groups.clone())
    }
}

#[async_trait]
impl AlertGroupStore for InMemoryStore {
    async fn all_alert_group_ids(&self) -> Result<Vec<i32>> {
        Ok(self.data.read().await.alert_groups.clone())
    }
}

#[async_trait]
impl TenantStore for InMemoryStore {
    async fn all_tenant_ids(&self) -> Result<Vec<i32>> {
        Ok(self.data.read().await.tenants.clone())
    }
}

#[async_trait]
impl DataSourceStore for InMemoryStore {
    async fn authorized_data_source_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        Ok(self.granted(|d| &d.data_sources, user_id).await)
    }
}

#[async_trait]
impl AccessTokenStore for InMemoryStore {
    async fn authorized_access_token_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        Ok(self.granted(|d| &d.access_tokens, user_id).await)
    }
}
