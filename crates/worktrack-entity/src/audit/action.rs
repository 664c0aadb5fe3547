//! Audit action enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use worktrack_core::AppError;

/// Every state-changing action that is recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    LoginSuccess,
    LoginFailed,
    UserCreated,
    UserUpdated,
    UserDeleted,
    ProjectCreated,
    ProjectUpdated,
    ProjectDeleted,
    ProjectMemberAdded,
    ProjectMemberRemoved,
    TaskCreated,
    TaskUpdated,
    TaskDeleted,
    TaskStatusChanged,
    TaskAssigned,
    TaskLogAdded,
}

impl AuditAction {
    /// All actions, in declaration order.
    pub const ALL: [AuditAction; 16] = [
        Self::LoginSuccess,
        Self::LoginFailed,
        Self::UserCreated,
        Self::UserUpdated,
        Self::UserDeleted,
        Self::ProjectCreated,
        Self::ProjectUpdated,
        Self::ProjectDeleted,
        Self::ProjectMemberAdded,
        Self::ProjectMemberRemoved,
        Self::TaskCreated,
        Self::TaskUpdated,
        Self::TaskDeleted,
        Self::TaskStatusChanged,
        Self::TaskAssigned,
        Self::TaskLogAdded,
    ];

    /// Return the stored spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoginSuccess => "LOGIN_SUCCESS",
            Self::LoginFailed => "LOGIN_FAILED",
            Self::UserCreated => "USER_CREATED",
            Self::UserUpdated => "USER_UPDATED",
            Self::UserDeleted => "USER_DELETED",
            Self::ProjectCreated => "PROJECT_CREATED",
            Self::ProjectUpdated => "PROJECT_UPDATED",
            Self::ProjectDeleted => "PROJECT_DELETED",
            Self::ProjectMemberAdded => "PROJECT_MEMBER_ADDED",
            Self::ProjectMemberRemoved => "PROJECT_MEMBER_REMOVED",
            Self::TaskCreated => "TASK_CREATED",
            Self::TaskUpdated => "TASK_UPDATED",
            Self::TaskDeleted => "TASK_DELETED",
            Self::TaskStatusChanged => "TASK_STATUS_CHANGED",
            Self::TaskAssigned => "TASK_ASSIGNED",
            Self::TaskLogAdded => "TASK_LOG_ADDED",
        }
    }

    /// Whether this is one of the login actions shown in the activity view.
    pub fn is_login(&self) -> bool {
        matches!(self, Self::LoginSuccess | Self::LoginFailed)
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| AppError::invalid_field("action", format!("Unknown audit action: '{s}'")))
    }
}

impl TryFrom<String> for AuditAction {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
