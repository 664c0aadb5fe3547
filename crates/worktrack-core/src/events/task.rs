//! Task-related domain events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to task operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TaskEvent {
    /// A task was created.
    Created {
        /// The task ID.
        task_id: Uuid,
        /// The owning project.
        project_id: Uuid,
        /// Task title.
        title: String,
        /// Manager of the owning project.
        manager_id: Uuid,
    },
    /// A task was assigned to a user.
    Assigned {
        /// The task ID.
        task_id: Uuid,
        /// The owning project.
        project_id: Uuid,
        /// Task title.
        title: String,
        /// The new assignee.
        assignee_id: Uuid,
    },
    /// Task fields other than status changed.
    Updated {
        /// The task ID.
        task_id: Uuid,
        /// The owning project.
        project_id: Uuid,
        /// Task title.
        title: String,
        /// Manager of the owning project.
        manager_id: Uuid,
        /// Current assignee.
        assignee_id: Option<Uuid>,
    },
    /// The task status changed.
    StatusChanged {
        /// The task ID.
        task_id: Uuid,
        /// The owning project.
        project_id: Uuid,
        /// Task title.
        title: String,
        /// Manager of the owning project.
        manager_id: Uuid,
        /// Current assignee.
        assignee_id: Option<Uuid>,
        /// Previous status (wire spelling).
        old_status: String,
        /// New status (wire spelling).
        new_status: String,
    },
    /// A task was deleted.
    Deleted {
        /// The task ID.
        task_id: Uuid,
        /// The owning project.
        project_id: Uuid,
        /// Task title.
        title: String,
        /// Manager of the owning project.
        manager_id: Uuid,
        /// Assignee at deletion time.
        assignee_id: Option<Uuid>,
    },
    /// A progress log entry was appended.
    LogAdded {
        /// The task ID.
        task_id: Uuid,
        /// The owning project.
        project_id: Uuid,
        /// Task title.
        title: String,
        /// Manager of the owning project.
        manager_id: Uuid,
        /// Reported completion, if given.
        progress_percent: Option<i32>,
    },
}

impl TaskEvent {
    /// The task this event concerns.
    pub fn task_id(&self) -> Uuid {
        match self {
            Self::Created { task_id, .. }
            | Self::Assigned { task_id, .. }
            | Self::Updated { task_id, .. }
            | Self::StatusChanged { task_id, .. }
            | Self::Deleted { task_id, .. }
            | Self::LogAdded { task_id, .. } => *task_id,
        }
    }

    /// The project owning the task.
    pub fn project_id(&self) -> Uuid {
        match self {
            Self::Created { project_id, .. }
            | Self::Assigned { project_id, .. }
            | Self::Updated { project_id, .. }
            | Self::StatusChanged { project_id, .. }
            | Self::Deleted { project_id, .. }
            | Self::LogAdded { project_id, .. } => *project_id,
        }
    }

    /// The task title at the time of the event.
    pub fn title(&self) -> &str {
        match self {
            Self::Created { title, .. }
            | Self::Assigned { title, .. }
            | Self::Updated { title, .. }
            | Self::StatusChanged { title, .. }
            | Self::Deleted { title, .. }
            | Self::LogAdded { title, .. } => title,
        }
    }
}
