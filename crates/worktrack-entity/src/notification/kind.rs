//! Notification kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use worktrack_core::AppError;

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TaskCreated,
    TaskAssigned,
    TaskUpdated,
    TaskStatusChanged,
    TaskDeleted,
    TaskLogAdded,
    ProjectCreated,
    ProjectUpdated,
    ProjectDeleted,
    ProjectMemberAdded,
    ProjectMemberRemoved,
    UserCreated,
    UserUpdated,
    UserDeleted,
    DueSoon,
}

impl NotificationKind {
    const ALL: [NotificationKind; 15] = [
        Self::TaskCreated,
        Self::TaskAssigned,
        Self::TaskUpdated,
        Self::TaskStatusChanged,
        Self::TaskDeleted,
        Self::TaskLogAdded,
        Self::ProjectCreated,
        Self::ProjectUpdated,
        Self::ProjectDeleted,
        Self::ProjectMemberAdded,
        Self::ProjectMemberRemoved,
        Self::UserCreated,
        Self::UserUpdated,
        Self::UserDeleted,
        Self::DueSoon,
    ];

    /// Return the stored spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskCreated => "task_created",
            Self::TaskAssigned => "task_assigned",
            Self::TaskUpdated => "task_updated",
            Self::TaskStatusChanged => "task_status_changed",
            Self::TaskDeleted => "task_deleted",
            Self::TaskLogAdded => "task_log_added",
            Self::ProjectCreated => "project_created",
            Self::ProjectUpdated => "project_updated",
            Self::ProjectDeleted => "project_deleted",
            Self::ProjectMemberAdded => "project_member_added",
            Self::ProjectMemberRemoved => "project_member_removed",
            Self::UserCreated => "user_created",
            Self::UserUpdated => "user_updated",
            Self::UserDeleted => "user_deleted",
            Self::DueSoon => "due_soon",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown notification kind: '{s}'")))
    }
}

impl TryFrom<String> for NotificationKind {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
