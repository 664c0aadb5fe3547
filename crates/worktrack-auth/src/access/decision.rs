//! Access decision values.

use std::fmt;

use worktrack_core::error::AppError;

/// Why a related principal was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyReason {
    /// The action needs the owning manager.
    NotProjectManager,
    /// The action needs the task assignee.
    NotAssignee,
    /// The action needs project membership.
    NotAMember,
    /// Admins never mutate projects or tasks.
    AdminReadOnly,
    /// The role can never perform the action.
    RoleNotPermitted,
}

impl DenyReason {
    /// Stable text returned to clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotProjectManager => "not project manager",
            Self::NotAssignee => "not assignee",
            Self::NotAMember => "not a member",
            Self::AdminReadOnly => "admin cannot modify projects or tasks",
            Self::RoleNotPermitted => "role not permitted",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Proceed.
    Allow,
    /// Refuse with a reason; the caller knows the resource exists.
    Deny(DenyReason),
    /// Refuse as if the resource did not exist.
    Hidden,
}

impl Decision {
    /// Whether the action may proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Convert into a result; `resource` names the thing for the not-found
    /// message (e.g. `"Task"`).
    pub fn into_result(self, resource: &str) -> Result<(), AppError> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(reason) => Err(AppError::forbidden(reason.as_str())),
            Self::Hidden => Err(AppError::not_found(format!("{resource} not found"))),
        }
    }
}
