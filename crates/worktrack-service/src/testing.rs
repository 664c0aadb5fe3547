//! Shared fixtures for service tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Barrier;
use uuid::Uuid;

use worktrack_auth::AccessEvaluator;
use worktrack_core::config::NotificationConfig;
use worktrack_core::result::AppResult;
use worktrack_core::types::pagination::{PageRequest, PageResponse};
use worktrack_database::{Change, ProjectScope, Store, StoreManager, TaskQuery, UnitOfWork};
use worktrack_entity::audit::{AuditEntry, AuditFilter};
use worktrack_entity::notification::{Notification, NotificationKind};
use worktrack_entity::project::{Project, ProjectStatus};
use worktrack_entity::task::{Task, TaskLogEntry};
use worktrack_entity::user::{User, UserRole};

use crate::context::RequestContext;
use crate::notification::{DueSoonGenerator, FanoutEngine};
use crate::project::ProjectService;
use crate::task::{TaskLogService, TaskService};

/// An admin, two managers, two members and one project owned by `manager`
/// with `member` and `other_member` in it.
pub(crate) struct Fixture {
    pub store: Arc<StoreManager>,
    pub admin: User,
    pub manager: User,
    pub other_manager: User,
    pub member: User,
    pub other_member: User,
    pub project: Project,
}

impl Fixture {
    pub async fn new() -> Self {
        let store = Arc::new(StoreManager::memory());
        let admin = User::new("root", "x", UserRole::Admin);
        let manager = User::new("maria", "x", UserRole::Manager);
        let other_manager = User::new("mateo", "x", UserRole::Manager);
        let member = User::new("uma", "x", UserRole::Member);
        let other_member = User::new("ugo", "x", UserRole::Member);
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: "Apollo".into(),
            description: None,
            manager_id: manager.id,
            members: vec![member.id, other_member.id],
            status: ProjectStatus::Active,
            version: 1,
            created_by: manager.id,
            created_at: now,
            updated_at: now,
        };

        let mut unit = UnitOfWork::new();
        for user in [&admin, &manager, &other_manager, &member, &other_member] {
            unit.change(Change::InsertUser(user.clone()));
        }
        unit.change(Change::InsertProject(project.clone()));
        store.commit(unit).await.unwrap();

        Self {
            store,
            admin,
            manager,
            other_manager,
            member,
            other_member,
            project,
        }
    }

    pub fn ctx(user: &User) -> RequestContext {
        RequestContext::for_user(user, "127.0.0.1".into(), None)
    }

    fn fanout(&self) -> Arc<FanoutEngine> {
        Arc::new(FanoutEngine::new(Arc::clone(&self.store)))
    }

    pub fn projects(&self) -> ProjectService {
        self.projects_on(Arc::clone(&self.store))
    }

    /// A project service that commits through `store` instead of the
    /// fixture's own handle.
    pub fn projects_on(&self, store: Arc<StoreManager>) -> ProjectService {
        ProjectService::new(store, Arc::new(AccessEvaluator::new()), self.fanout())
    }

    /// A handle whose commits wait until `writers` commits are pending, so
    /// that every writer has finished its reads first.
    pub fn gated(&self, writers: usize) -> Arc<StoreManager> {
        Arc::new(StoreManager::from_store(Arc::new(GatedStore {
            inner: Arc::clone(&self.store),
            barrier: Barrier::new(writers),
        })))
    }

    pub async fn add_user(&self, username: &str, role: UserRole) -> User {
        let user = User::new(username, "x", role);
        let mut unit = UnitOfWork::new();
        unit.change(Change::InsertUser(user.clone()));
        self.store.commit(unit).await.unwrap();
        user
    }

    pub fn tasks(&self) -> TaskService {
        TaskService::new(
            Arc::clone(&self.store),
            Arc::new(AccessEvaluator::new()),
            self.fanout(),
            Arc::new(DueSoonGenerator::new(
                Arc::clone(&self.store),
                &NotificationConfig::default(),
            )),
        )
    }

    pub fn logs(&self) -> TaskLogService {
        TaskLogService::new(
            Arc::clone(&self.store),
            Arc::new(AccessEvaluator::new()),
            self.fanout(),
        )
    }

    pub async fn inbox(&self, user: &User) -> Vec<Notification> {
        self.store
            .list_notifications(user.id, false, 100)
            .await
            .unwrap()
    }

    pub async fn inbox_count(&self, user: &User, kind: NotificationKind) -> usize {
        self.inbox(user)
            .await
            .iter()
            .filter(|n| n.kind == kind)
            .count()
    }
}

/// Delegating store that holds every commit at a barrier.
#[derive(Debug)]
struct GatedStore {
    inner: Arc<StoreManager>,
    barrier: Barrier,
}

#[async_trait]
impl Store for GatedStore {
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        self.inner.find_user(id).await
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.inner.find_user_by_username(username).await
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.inner.list_users().await
    }

    async fn active_admin_ids(&self) -> AppResult<Vec<Uuid>> {
        self.inner.active_admin_ids().await
    }

    async fn find_project(&self, id: Uuid) -> AppResult<Option<Project>> {
        self.inner.find_project(id).await
    }

    async fn list_projects(&self, scope: ProjectScope) -> AppResult<Vec<Project>> {
        self.inner.list_projects(scope).await
    }

    async fn find_task(&self, id: Uuid) -> AppResult<Option<Task>> {
        self.inner.find_task(id).await
    }

    async fn list_tasks(&self, query: &TaskQuery) -> AppResult<Vec<Task>> {
        self.inner.list_tasks(query).await
    }

    async fn list_task_logs(&self, task_id: Uuid) -> AppResult<Vec<TaskLogEntry>> {
        self.inner.list_task_logs(task_id).await
    }

    async fn search_audit(
        &self,
        filter: &AuditFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditEntry>> {
        self.inner.search_audit(filter, page).await
    }

    async fn list_notifications(
        &self,
        recipient_id: Uuid,
        unread_only: bool,
        limit: u32,
    ) -> AppResult<Vec<Notification>> {
        self.inner
            .list_notifications(recipient_id, unread_only, limit)
            .await
    }

    async fn count_unread(&self, recipient_id: Uuid) -> AppResult<u64> {
        self.inner.count_unread(recipient_id).await
    }

    async fn mark_notification_read(
        &self,
        id: Uuid,
        recipient_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Notification>> {
        self.inner.mark_notification_read(id, recipient_id, at).await
    }

    async fn mark_all_read(&self, recipient_id: Uuid, at: DateTime<Utc>) -> AppResult<u64> {
        self.inner.mark_all_read(recipient_id, at).await
    }

    async fn insert_notification_once(
        &self,
        notification: &Notification,
        suppress_since: DateTime<Utc>,
    ) -> AppResult<bool> {
        self.inner
            .insert_notification_once(notification, suppress_since)
            .await
    }

    async fn commit(&self, unit: UnitOfWork) -> AppResult<()> {
        self.barrier.wait().await;
        self.inner.commit(unit).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
