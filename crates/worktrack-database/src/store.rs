//! The persistence port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use worktrack_core::result::AppResult;
use worktrack_core::types::pagination::{PageRequest, PageResponse};
use worktrack_entity::audit::{AuditEntry, AuditFilter};
use worktrack_entity::notification::Notification;
use worktrack_entity::project::Project;
use worktrack_entity::task::{Task, TaskLogEntry, TaskStatus};
use worktrack_entity::user::User;

use crate::unit_of_work::UnitOfWork;

/// Which projects a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectScope {
    /// Every project.
    All,
    /// Projects the user manages or belongs to.
    Involving(Uuid),
}

/// Which tasks a listing covers before filters apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskScope {
    /// Every task.
    All,
    /// Tasks inside the given projects plus tasks assigned to the user.
    ProjectsOrAssignee {
        /// Candidate projects.
        project_ids: Vec<Uuid>,
        /// The user whose assignments are included.
        user_id: Uuid,
    },
    /// Tasks assigned to the user.
    Assignee(Uuid),
}

/// Task listing criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    /// Visibility scope.
    pub scope: TaskScope,
    /// Restrict to one project.
    pub project_id: Option<Uuid>,
    /// Restrict to one status.
    pub status: Option<TaskStatus>,
}

impl TaskQuery {
    /// A query over `scope` without filters.
    pub fn new(scope: TaskScope) -> Self {
        Self {
            scope,
            project_id: None,
            status: None,
        }
    }

    /// Check whether a task satisfies the scope and filters.
    pub fn matches(&self, task: &Task) -> bool {
        let in_scope = match &self.scope {
            TaskScope::All => true,
            TaskScope::ProjectsOrAssignee {
                project_ids,
                user_id,
            } => project_ids.contains(&task.project_id) || task.is_assignee(*user_id),
            TaskScope::Assignee(user_id) => task.is_assignee(*user_id),
        };
        in_scope
            && self.project_id.is_none_or(|id| task.project_id == id)
            && self.status.is_none_or(|s| task.status == s)
    }
}

/// Storage backend for all WorkTrack state.
///
/// Reads are individual queries. Every write except inbox bookkeeping and
/// due-soon alerts goes through [`Store::commit`], which applies a whole
/// [`UnitOfWork`] atomically or not at all.
#[async_trait]
pub trait Store: Send + Sync + std::fmt::Debug + 'static {
    /// Find a user by ID.
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by login name.
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// List every user, oldest first.
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// IDs of every active admin.
    async fn active_admin_ids(&self) -> AppResult<Vec<Uuid>>;

    /// Find a project by ID.
    async fn find_project(&self, id: Uuid) -> AppResult<Option<Project>>;

    /// List projects in scope, newest first.
    async fn list_projects(&self, scope: ProjectScope) -> AppResult<Vec<Project>>;

    /// Find a task by ID.
    async fn find_task(&self, id: Uuid) -> AppResult<Option<Task>>;

    /// List tasks matching the query, newest first.
    async fn list_tasks(&self, query: &TaskQuery) -> AppResult<Vec<Task>>;

    /// The progress chain of a task, oldest first.
    async fn list_task_logs(&self, task_id: Uuid) -> AppResult<Vec<TaskLogEntry>>;

    /// Search the audit log, newest first.
    async fn search_audit(
        &self,
        filter: &AuditFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditEntry>>;

    /// A recipient's notifications, newest first.
    async fn list_notifications(
        &self,
        recipient_id: Uuid,
        unread_only: bool,
        limit: u32,
    ) -> AppResult<Vec<Notification>>;

    /// Number of unread notifications for a recipient.
    async fn count_unread(&self, recipient_id: Uuid) -> AppResult<u64>;

    /// Mark one notification read. `None` when it does not exist or belongs
    /// to someone else.
    async fn mark_notification_read(
        &self,
        id: Uuid,
        recipient_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Notification>>;

    /// Mark every unread notification of a recipient read; returns how many.
    async fn mark_all_read(&self, recipient_id: Uuid, at: DateTime<Utc>) -> AppResult<u64>;

    /// Insert a keyed notification unless one with the same
    /// `(recipient, task, kind, dedup_key)` exists, or one of the same kind
    /// for the same recipient and task was created after `suppress_since`.
    ///
    /// Returns `true` when the row was inserted. The check and the insert
    /// are one atomic step.
    async fn insert_notification_once(
        &self,
        notification: &Notification,
        suppress_since: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Apply a unit of work atomically.
    async fn commit(&self, unit: UnitOfWork) -> AppResult<()>;

    /// Check backend connectivity.
    async fn health_check(&self) -> AppResult<bool>;
}
