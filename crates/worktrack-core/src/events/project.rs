//! Project-related domain events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to project operations.
///
/// `member_ids` is always the member set after the change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProjectEvent {
    /// A project was created.
    Created {
        /// The project ID.
        project_id: Uuid,
        /// Project name.
        name: String,
        /// Owning manager.
        manager_id: Uuid,
        /// Initial members.
        member_ids: Vec<Uuid>,
    },
    /// Project metadata changed.
    Updated {
        /// The project ID.
        project_id: Uuid,
        /// Project name.
        name: String,
        /// Owning manager.
        manager_id: Uuid,
        /// Current members.
        member_ids: Vec<Uuid>,
    },
    /// A member joined the project.
    MemberAdded {
        /// The project ID.
        project_id: Uuid,
        /// Project name.
        name: String,
        /// Owning manager.
        manager_id: Uuid,
        /// Members including the new one.
        member_ids: Vec<Uuid>,
        /// The user that was added.
        member_id: Uuid,
    },
    /// A member left the project.
    MemberRemoved {
        /// The project ID.
        project_id: Uuid,
        /// Project name.
        name: String,
        /// Owning manager.
        manager_id: Uuid,
        /// Members without the removed one.
        member_ids: Vec<Uuid>,
        /// The user that was removed.
        member_id: Uuid,
    },
    /// A project and its tasks were deleted.
    Deleted {
        /// The project ID.
        project_id: Uuid,
        /// Project name.
        name: String,
        /// Owning manager.
        manager_id: Uuid,
        /// Members at deletion time.
        member_ids: Vec<Uuid>,
    },
}

impl ProjectEvent {
    /// The project this event concerns.
    pub fn project_id(&self) -> Uuid {
        match self {
            Self::Created { project_id, .. }
            | Self::Updated { project_id, .. }
            | Self::MemberAdded { project_id, .. }
            | Self::MemberRemoved { project_id, .. }
            | Self::Deleted { project_id, .. } => *project_id,
        }
    }

    /// Project name at the time of the event.
    pub fn name(&self) -> &str {
        match self {
            Self::Created { name, .. }
            | Self::Updated { name, .. }
            | Self::MemberAdded { name, .. }
            | Self::MemberRemoved { name, .. }
            | Self::Deleted { name, .. } => name,
        }
    }
}
