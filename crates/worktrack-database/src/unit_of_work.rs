//! Request-scoped write batch.

use worktrack_entity::audit::NewAuditEntry;
use worktrack_entity::notification::Notification;
use worktrack_entity::project::Project;
use worktrack_entity::task::{Task, TaskLogEntry};
use worktrack_entity::user::User;
use uuid::Uuid;

/// One primary state change.
///
/// Updates and deletes carry the version read at the start of the request;
/// the store rejects the whole unit with `Conflict` when it no longer
/// matches.
#[derive(Debug, Clone)]
pub enum Change {
    /// Create a user.
    InsertUser(User),
    /// Replace a user.
    UpdateUser(User),
    /// Create a project.
    InsertProject(Project),
    /// Replace a project; `project.version` is the new version.
    UpdateProject {
        /// New state.
        project: Project,
        /// Version the caller read.
        expected_version: i64,
    },
    /// Delete a project, its tasks and their logs.
    DeleteProject {
        /// Project ID.
        id: Uuid,
        /// Version the caller read.
        expected_version: i64,
    },
    /// Create a task.
    InsertTask(Task),
    /// Replace a task; `task.version` is the new version.
    UpdateTask {
        /// New state.
        task: Task,
        /// Version the caller read.
        expected_version: i64,
    },
    /// Delete a task and its log.
    DeleteTask {
        /// Task ID.
        id: Uuid,
        /// Version the caller read.
        expected_version: i64,
    },
    /// Append to a task's progress chain. The store assigns `seq`.
    AppendTaskLog(TaskLogEntry),
}

/// Primary changes plus their audit entries and notifications, committed
/// together.
#[derive(Debug, Clone, Default)]
pub struct UnitOfWork {
    /// Primary changes, applied in order.
    pub changes: Vec<Change>,
    /// Audit entries, appended in order.
    pub audit: Vec<NewAuditEntry>,
    /// Notifications to deliver.
    pub notifications: Vec<Notification>,
}

impl UnitOfWork {
    /// An empty unit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a primary change.
    pub fn change(&mut self, change: Change) -> &mut Self {
        self.changes.push(change);
        self
    }

    /// Queue an audit entry.
    pub fn audit(&mut self, entry: NewAuditEntry) -> &mut Self {
        self.audit.push(entry);
        self
    }

    /// Queue notifications.
    pub fn notify(&mut self, notifications: impl IntoIterator<Item = Notification>) -> &mut Self {
        self.notifications.extend(notifications);
        self
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.audit.is_empty() && self.notifications.is_empty()
    }
}
