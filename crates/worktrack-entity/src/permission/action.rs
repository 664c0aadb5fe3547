//! Permission action definitions.

use serde::{Deserialize, Serialize};

/// Actions on a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectAction {
    /// View a project.
    Read,
    /// Create a project.
    Create,
    /// Change project metadata.
    Update,
    /// Delete a project with its tasks.
    Delete,
    /// Add or remove members.
    ManageMembers,
}

impl ProjectAction {
    /// Whether the action changes state.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::Read)
    }
}

/// Actions on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskAction {
    /// View a task.
    Read,
    /// Create a task in a project.
    Create,
    /// Change task fields.
    Update,
    /// Delete a task.
    Delete,
    /// Change the assignee.
    Assign,
    /// Change the workflow status.
    UpdateStatus,
    /// Append to the progress log.
    AppendLog,
    /// Read the progress log.
    ReadLog,
}

impl TaskAction {
    /// Whether the action only reads.
    pub fn is_read(&self) -> bool {
        matches!(self, Self::Read | Self::ReadLog)
    }
}

/// Actions on user accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    /// View accounts.
    Read,
    /// Create an account.
    Create,
    /// Change an account.
    Update,
    /// Deactivate an account.
    Delete,
}
