//! End-to-end tests for the permission dispatcher:
//! registry lookup → checker delegation → admin bypass → audit lines.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use taskhive_permission::{
    standard_registry, AuditLog, AuthorizationType, InMemoryStore, PermissionError,
    PermissionService, ResourceIdSet, Stores, User, UserType, ADMIN_USER_ID,
};

const ADMIN: i32 = 1;
const ALICE: i32 = 2;
const NO_SUCH_USER: i32 = 404;

/// Audit sink capturing lines so tests can assert on them.
#[derive(Default)]
struct CapturingLog {
    warnings: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl AuditLog for CapturingLog {
    fn warn(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

const ALL_TYPES: [AuthorizationType; 11] = [
    AuthorizationType::Queue,
    AuthorizationType::Projects,
    AuthorizationType::TaskGroup,
    AuthorizationType::K8sNamespace,
    AuthorizationType::Environment,
    AuthorizationType::WorkerGroup,
    AuthorizationType::AlertPluginInstance,
    AuthorizationType::AlertGroup,
    AuthorizationType::Tenant,
    AuthorizationType::Datasource,
    AuthorizationType::AccessToken,
];

async fn harness() -> (Arc<InMemoryStore>, PermissionService) {
    let backend = Arc::new(InMemoryStore::new());
    backend.insert_user(User::new(ADMIN, UserType::AdminUser)).await;
    backend.insert_user(User::new(ALICE, UserType::GeneralUser)).await;

    let stores = Stores::from_backend(backend.clone());
    let registry = Arc::new(standard_registry(&stores));
    let service = PermissionService::new(registry, stores.users.clone());
    (backend, service)
}

// ============================================================================
// RESOURCE ID-SET CHECKS
// ============================================================================

#[tokio::test]
async fn test_empty_request_set_is_always_allowed() {
    let (_backend, service) = harness().await;
    let log = CapturingLog::default();

    for auth_type in ALL_TYPES {
        for user_id in [ADMIN, ALICE, NO_SUCH_USER] {
            let allowed = service
                .resource_permission_check(auth_type, &[], user_id, &log)
                .await
                .unwrap();
            assert!(allowed, "empty request must pass for {auth_type:?}");
        }
    }
    assert!(log.warnings.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_queue_superset_allows_and_shortfall_warns() {
    let (backend, service) = harness().await;
    backend.insert_queues([1, 2, 3, 4]).await;
    let log = CapturingLog::default();

    // queue ownership is only exposed under the sentinel id
    let allowed = service
        .resource_permission_check(AuthorizationType::Queue, &[1, 2, 3], ADMIN_USER_ID, &log)
        .await
        .unwrap();
    assert!(allowed);
    assert!(log.warnings.lock().unwrap().is_empty());

    // an ordinary id owns no queues at all
    let denied = service
        .resource_permission_check(AuthorizationType::Queue, &[1, 2, 3], ALICE, &log)
        .await
        .unwrap();
    assert!(!denied);

    let warnings = log.warnings.lock().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(
        warnings[0].contains(&ALICE.to_string()),
        "denial warning must name the user id: {}",
        warnings[0]
    );
}

#[tokio::test]
async fn test_queue_shortfall_under_sentinel_id() {
    let (backend, service) = harness().await;
    backend.insert_queues([1, 2]).await;
    let log = CapturingLog::default();

    let denied = service
        .resource_permission_check(AuthorizationType::Queue, &[1, 2, 3], ADMIN_USER_ID, &log)
        .await
        .unwrap();
    assert!(!denied, "requested ids exceed the owned set");
    assert_eq!(log.warnings.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_alert_plugin_instance_denies_any_nonempty_request() {
    let (_backend, service) = harness().await;
    let log = CapturingLog::default();

    for user_id in [ADMIN_USER_ID, ADMIN, ALICE] {
        let denied = service
            .resource_permission_check(AuthorizationType::AlertPluginInstance, &[1], user_id, &log)
            .await
            .unwrap();
        assert!(!denied);
    }
}

#[tokio::test]
async fn test_project_grants_gate_resource_check() {
    let (backend, service) = harness().await;
    backend.grant_projects(ALICE, [10, 11]).await;
    let log = CapturingLog::default();

    assert!(service
        .resource_permission_check(AuthorizationType::Projects, &[10], ALICE, &log)
        .await
        .unwrap());
    assert!(service
        .resource_permission_check(AuthorizationType::Projects, &[10, 11], ALICE, &log)
        .await
        .unwrap());
    assert!(!service
        .resource_permission_check(AuthorizationType::Projects, &[10, 12], ALICE, &log)
        .await
        .unwrap());
}

// ============================================================================
// OPERATION CHECKS
// ============================================================================

#[tokio::test]
async fn test_admin_bypasses_every_operation_check() {
    let (_backend, service) = harness().await;
    let log = CapturingLog::default();

    for auth_type in ALL_TYPES {
        let allowed = service
            .operation_permission_check(auth_type, ADMIN, "any:key", &log)
            .await
            .unwrap();
        assert!(allowed, "admin must bypass {auth_type:?}");
    }
}

#[tokio::test]
async fn test_deny_families_reject_ordinary_users() {
    let (_backend, service) = harness().await;
    let log = CapturingLog::default();

    let deny_families = [
        AuthorizationType::Queue,
        AuthorizationType::K8sNamespace,
        AuthorizationType::Environment,
        AuthorizationType::WorkerGroup,
        AuthorizationType::AlertPluginInstance,
        AuthorizationType::AlertGroup,
        AuthorizationType::Tenant,
        AuthorizationType::AccessToken,
    ];
    for auth_type in deny_families {
        let allowed = service
            .operation_permission_check(auth_type, ALICE, "any:key", &log)
            .await
            .unwrap();
        assert!(!allowed, "{auth_type:?} must deny ordinary users");
    }
}

#[tokio::test]
async fn test_allow_families_accept_ordinary_users() {
    let (_backend, service) = harness().await;
    let log = CapturingLog::default();

    let allow_families = [
        AuthorizationType::Projects,
        AuthorizationType::TaskGroup,
        AuthorizationType::Datasource,
    ];
    for auth_type in allow_families {
        let allowed = service
            .operation_permission_check(auth_type, ALICE, "create", &log)
            .await
            .unwrap();
        assert!(allowed, "{auth_type:?} must allow ordinary users");
    }
}

#[tokio::test]
async fn test_missing_user_fails_closed_with_error_line() {
    let (_backend, service) = harness().await;
    let log = CapturingLog::default();

    let allowed = service
        .operation_permission_check(AuthorizationType::Projects, NO_SUCH_USER, "create", &log)
        .await
        .unwrap();
    assert!(!allowed);

    let owned = service
        .user_owned_resource_ids(AuthorizationType::Tenant, NO_SUCH_USER, &log)
        .await
        .unwrap();
    assert!(owned.is_empty());

    let errors = log.errors.lock().unwrap();
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|line| line.contains(&NO_SUCH_USER.to_string())));
}

// ============================================================================
// BULK LISTING
// ============================================================================

#[tokio::test]
async fn test_admin_listing_equals_sentinel_universe() {
    let (backend, service) = harness().await;
    backend.insert_queues([1, 2, 3]).await;
    backend.insert_tenants([7, 8]).await;
    backend.insert_worker_groups([4]).await;
    let log = CapturingLog::default();

    // the admin is delegated under the sentinel id, so the queue family
    // yields its full universe even though the admin holds no grants
    let queues = service
        .user_owned_resource_ids(AuthorizationType::Queue, ADMIN, &log)
        .await
        .unwrap();
    assert_eq!(queues, ResourceIdSet::from([1, 2, 3]));

    let tenants = service
        .user_owned_resource_ids(AuthorizationType::Tenant, ADMIN, &log)
        .await
        .unwrap();
    assert_eq!(tenants, ResourceIdSet::from([7, 8]));

    let worker_groups = service
        .user_owned_resource_ids(AuthorizationType::WorkerGroup, ADMIN, &log)
        .await
        .unwrap();
    assert_eq!(worker_groups, ResourceIdSet::from([4]));
}

#[tokio::test]
async fn test_ordinary_user_listing_uses_real_id() {
    let (backend, service) = harness().await;
    backend.insert_queues([1, 2, 3]).await;
    backend.grant_projects(ALICE, [10]).await;
    let log = CapturingLog::default();

    // no sentinel substitution for ordinary users
    let queues = service
        .user_owned_resource_ids(AuthorizationType::Queue, ALICE, &log)
        .await
        .unwrap();
    assert!(queues.is_empty());

    let projects = service
        .user_owned_resource_ids(AuthorizationType::Projects, ALICE, &log)
        .await
        .unwrap();
    assert_eq!(projects, ResourceIdSet::from([10]));
}

#[tokio::test]
async fn test_unrestricted_families_list_for_everyone() {
    let (backend, service) = harness().await;
    backend.insert_environments([1]).await;
    backend.insert_alert_groups([2]).await;
    backend.insert_tenants([3]).await;
    backend.insert_worker_groups([4]).await;
    let log = CapturingLog::default();

    for user_id in [ADMIN, ALICE] {
        for (auth_type, expected) in [
            (AuthorizationType::Environment, 1),
            (AuthorizationType::AlertGroup, 2),
            (AuthorizationType::Tenant, 3),
            (AuthorizationType::WorkerGroup, 4),
        ] {
            let owned = service
                .user_owned_resource_ids(auth_type, user_id, &log)
                .await
                .unwrap();
            assert_eq!(owned, ResourceIdSet::from([expected]));
        }
    }
}

// ============================================================================
// FAILURE AND CONFIGURATION PATHS
// ============================================================================

#[tokio::test]
async fn test_unregistered_type_is_a_config_error() {
    let backend = Arc::new(InMemoryStore::new());
    backend.insert_user(User::new(ALICE, UserType::GeneralUser)).await;

    // empty registry: nothing was wired at startup
    let registry = Arc::new(taskhive_permission::CheckerRegistry::new());
    let service = PermissionService::new(registry, backend);
    let log = CapturingLog::default();

    let err = service
        .resource_permission_check(AuthorizationType::Queue, &[1], ALICE, &log)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PermissionError::CheckerNotRegistered(AuthorizationType::Queue)
    ));

    let err = service
        .operation_permission_check(AuthorizationType::Queue, ALICE, "any", &log)
        .await
        .unwrap_err();
    assert!(matches!(err, PermissionError::CheckerNotRegistered(_)));
}

struct FailingQueueStore;

#[async_trait]
impl taskhive_permission::store::QueueStore for FailingQueueStore {
    async fn all_queue_ids(&self) -> taskhive_permission::Result<Vec<i32>> {
        Err(PermissionError::Store("queue backend unavailable".into()))
    }
}

#[tokio::test]
async fn test_store_failure_propagates_and_isolates() {
    let backend = Arc::new(InMemoryStore::new());
    backend.insert_user(User::new(ADMIN, UserType::AdminUser)).await;
    backend.insert_tenants([7]).await;

    let mut stores = Stores::from_backend(backend.clone());
    stores.queues = Arc::new(FailingQueueStore);

    let registry = Arc::new(standard_registry(&stores));
    let service = PermissionService::new(registry, stores.users.clone());
    let log = CapturingLog::default();

    let err = service
        .user_owned_resource_ids(AuthorizationType::Queue, ADMIN, &log)
        .await
        .unwrap_err();
    assert!(matches!(err, PermissionError::Store(_)));

    // the failure stays inside the queue family; other checkers are intact
    let tenants = service
        .user_owned_resource_ids(AuthorizationType::Tenant, ADMIN, &log)
        .await
        .unwrap();
    assert_eq!(tenants, ResourceIdSet::from([7]));
}

#[tokio::test]
async fn test_idempotence_over_unchanged_store() {
    let (backend, service) = harness().await;
    backend.grant_data_sources(ALICE, [5, 6]).await;
    let log = CapturingLog::default();

    for _ in 0..2 {
        assert!(service
            .resource_permission_check(AuthorizationType::Datasource, &[5], ALICE, &log)
            .await
            .unwrap());
        assert!(service
            .operation_permission_check(AuthorizationType::Datasource, ALICE, "create", &log)
            .await
            .unwrap());
        assert_eq!(
            service
                .user_owned_resource_ids(AuthorizationType::Datasource, ALICE, &log)
                .await
                .unwrap(),
            ResourceIdSet::from([5, 6])
        );
    }
}

#[tokio::test]
async fn test_function_disabled_reports_enabled() {
    let (_backend, service) = harness().await;
    assert!(!service.function_disabled());
}

#[tokio::test]
async fn test_concurrent_checks_share_the_registry() {
    let (backend, service) = harness().await;
    backend.grant_projects(ALICE, [1, 2, 3]).await;
    backend.insert_tenants([9]).await;
    let service = Arc::new(service);

    let mut handles = Vec::new();
    for _ in 0..16 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            let log = CapturingLog::default();
            let allowed = service
                .resource_permission_check(AuthorizationType::Projects, &[1, 2], ALICE, &log)
                .await
                .unwrap();
            let tenants = service
                .user_owned_resource_ids(AuthorizationType::Tenant, ALICE, &log)
                .await
                .unwrap();
            (allowed, tenants)
        }));
    }

    for handle in handles {
        let (allowed, tenants) = handle.await.unwrap();
        assert!(allowed);
        assert_eq!(tenants, ResourceIdSet::from([9]));
    }
}
