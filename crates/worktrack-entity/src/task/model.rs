//! Task entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::priority::TaskPriority;
use super::status::TaskStatus;

/// A unit of work inside a project.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task identifier.
    pub id: Uuid,
    /// Owning project.
    pub project_id: Uuid,
    /// Task title.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Assignee, if any.
    pub assigned_to: Option<Uuid>,
    /// Workflow status.
    pub status: TaskStatus,
    /// Priority.
    pub priority: TaskPriority,
    /// Due date.
    pub deadline: Option<DateTime<Utc>>,
    /// Optimistic concurrency counter.
    pub version: i64,
    /// Who created the task.
    pub created_by: Uuid,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When the task was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Check if the user is the assignee.
    pub fn is_assignee(&self, user_id: Uuid) -> bool {
        self.assigned_to == Some(user_id)
    }

    /// Whether the deadline lies in `(now, now + window]` and the task is
    /// still open.
    pub fn is_due_within(&self, now: DateTime<Utc>, window: Duration) -> bool {
        if self.status.is_completed() {
            return false;
        }
        match self.deadline {
            Some(deadline) => deadline > now && deadline <= now + window,
            None => false,
        }
    }
}
