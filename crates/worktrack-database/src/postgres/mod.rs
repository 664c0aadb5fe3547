//! PostgreSQL store backend.

mod audit;
mod notification;
mod project;
mod task;
mod user;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::debug;
use uuid::Uuid;

use worktrack_core::error::{AppError, ErrorKind};
use worktrack_core::result::AppResult;
use worktrack_core::types::pagination::{PageRequest, PageResponse};
use worktrack_entity::audit::{AuditEntry, AuditFilter};
use worktrack_entity::notification::Notification;
use worktrack_entity::project::Project;
use worktrack_entity::task::{Task, TaskLogEntry};
use worktrack_entity::user::User;

use crate::connection::DatabasePool;
use crate::store::{ProjectScope, Store, TaskQuery};
use crate::unit_of_work::{Change, UnitOfWork};

pub use audit::AuditRepository;
pub use notification::NotificationRepository;
pub use project::ProjectRepository;
pub use task::TaskRepository;
pub use user::UserRepository;

/// Map a sqlx error from a write, turning constraint violations into
/// domain errors.
pub(crate) fn write_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        let code = e
            .as_database_error()
            .and_then(|d| d.code())
            .map(|c| c.into_owned());
        match code.as_deref() {
            Some("23505") => {
                AppError::with_source(ErrorKind::Conflict, format!("{context}: duplicate entry"), e)
            }
            Some("23503") => AppError::with_source(
                ErrorKind::NotFound,
                format!("{context}: referenced row no longer exists"),
                e,
            ),
            _ => AppError::with_source(ErrorKind::Database, context, e),
        }
    }
}

/// Turn a zero-row conditional write into a retryable conflict.
pub(crate) fn expect_one_row(rows: u64, what: &str) -> AppResult<()> {
    if rows == 0 {
        return Err(AppError::conflict(format!(
            "{what} was modified concurrently; reload and retry"
        )));
    }
    Ok(())
}

/// Store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
    users: UserRepository,
    projects: ProjectRepository,
    tasks: TaskRepository,
    audit: AuditRepository,
    notifications: NotificationRepository,
}

impl PgStore {
    /// Create a store over a connected pool.
    pub fn new(pool: DatabasePool) -> Self {
        let pool = pool.into_pool();
        Self {
            users: UserRepository::new(pool.clone()),
            projects: ProjectRepository::new(pool.clone()),
            tasks: TaskRepository::new(pool.clone()),
            audit: AuditRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool.clone()),
            pool,
        }
    }

    async fn apply(conn: &mut PgConnection, change: &Change) -> AppResult<()> {
        match change {
            Change::InsertUser(user) => UserRepository::insert(conn, user).await,
            Change::UpdateUser(user) => UserRepository::update(conn, user).await,
            Change::InsertProject(project) => ProjectRepository::insert(conn, project).await,
            Change::UpdateProject {
                project,
                expected_version,
            } => ProjectRepository::update(conn, project, *expected_version).await,
            Change::DeleteProject {
                id,
                expected_version,
            } => ProjectRepository::delete(conn, *id, *expected_version).await,
            Change::InsertTask(task) => TaskRepository::insert(conn, task).await,
            Change::UpdateTask {
                task,
                expected_version,
            } => TaskRepository::update(conn, task, *expected_version).await,
            Change::DeleteTask {
                id,
                expected_version,
            } => TaskRepository::delete(conn, *id, *expected_version).await,
            Change::AppendTaskLog(entry) => TaskRepository::append_log(conn, entry).await,
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        self.users.find_by_id(id).await
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.users.find_by_username(username).await
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.users.list().await
    }

    async fn active_admin_ids(&self) -> AppResult<Vec<Uuid>> {
        self.users.active_admin_ids().await
    }

    async fn find_project(&self, id: Uuid) -> AppResult<Option<Project>> {
        self.projects.find_by_id(id).await
    }

    async fn list_projects(&self, scope: ProjectScope) -> AppResult<Vec<Project>> {
        self.projects.list(scope).await
    }

    async fn find_task(&self, id: Uuid) -> AppResult<Option<Task>> {
        self.tasks.find_by_id(id).await
    }

    async fn list_tasks(&self, query: &TaskQuery) -> AppResult<Vec<Task>> {
        self.tasks.list(query).await
    }

    async fn list_task_logs(&self, task_id: Uuid) -> AppResult<Vec<TaskLogEntry>> {
        self.tasks.list_logs(task_id).await
    }

    async fn search_audit(
        &self,
        filter: &AuditFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditEntry>> {
        self.audit.search(filter, page).await
    }

    async fn list_notifications(
        &self,
        recipient_id: Uuid,
        unread_only: bool,
        limit: u32,
    ) -> AppResult<Vec<Notification>> {
        self.notifications
            .list(recipient_id, unread_only, limit)
            .await
    }

    async fn count_unread(&self, recipient_id: Uuid) -> AppResult<u64> {
        self.notifications.count_unread(recipient_id).await
    }

    async fn mark_notification_read(
        &self,
        id: Uuid,
        recipient_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Notification>> {
        self.notifications.mark_read(id, recipient_id, at).await
    }

    async fn mark_all_read(&self, recipient_id: Uuid, at: DateTime<Utc>) -> AppResult<u64> {
        self.notifications.mark_all_read(recipient_id, at).await
    }

    async fn insert_notification_once(
        &self,
        notification: &Notification,
        suppress_since: DateTime<Utc>,
    ) -> AppResult<bool> {
        self.notifications
            .insert_once(notification, suppress_since)
            .await
    }

    async fn commit(&self, unit: UnitOfWork) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        for change in &unit.changes {
            Self::apply(&mut tx, change).await?;
        }
        for entry in &unit.audit {
            AuditRepository::insert(&mut tx, entry).await?;
        }
        for notification in &unit.notifications {
            NotificationRepository::insert(&mut tx, notification).await?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;

        debug!(
            changes = unit.changes.len(),
            audit = unit.audit.len(),
            notifications = unit.notifications.len(),
            "Committed unit of work"
        );
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }
}
