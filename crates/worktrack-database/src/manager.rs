//! Store manager that dispatches to the configured backend.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use worktrack_core::config::{DatabaseConfig, DatabaseProvider};
use worktrack_core::result::AppResult;
use worktrack_core::types::pagination::{PageRequest, PageResponse};
use worktrack_entity::audit::{AuditEntry, AuditFilter};
use worktrack_entity::notification::Notification;
use worktrack_entity::project::Project;
use worktrack_entity::task::{Task, TaskLogEntry};
use worktrack_entity::user::User;

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::migration::run_migrations;
use crate::postgres::PgStore;
use crate::store::{ProjectScope, Store, TaskQuery};
use crate::unit_of_work::UnitOfWork;

/// Store handle shared by every request.
///
/// The backend is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct StoreManager {
    inner: Arc<dyn Store>,
}

impl StoreManager {
    /// Connect the configured backend, running migrations when enabled.
    pub async fn new(config: &DatabaseConfig) -> AppResult<Self> {
        let inner: Arc<dyn Store> = match config.provider {
            DatabaseProvider::Postgres => {
                info!("Initializing PostgreSQL store");
                let pool = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    run_migrations(pool.pool()).await?;
                }
                Arc::new(PgStore::new(pool))
            }
            DatabaseProvider::Memory => {
                info!("Initializing in-memory store; state is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };
        Ok(Self { inner })
    }

    /// Create a store manager from an existing backend (for testing).
    pub fn from_store(store: Arc<dyn Store>) -> Self {
        Self { inner: store }
    }

    /// A fresh in-memory store.
    pub fn memory() -> Self {
        Self::from_store(Arc::new(MemoryStore::new()))
    }

    /// Get a reference to the inner backend.
    pub fn store(&self) -> &dyn Store {
        self.inner.as_ref()
    }
}

#[async_trait]
impl Store for StoreManager {
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
        self.inner.commit(unit).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
