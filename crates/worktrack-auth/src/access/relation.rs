//! How a principal relates to a project.

use uuid::Uuid;

use worktrack_entity::project::Project;

/// Relationship of a user to a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectRelation {
    /// The user is the project's manager.
    Owner,
    /// The user is in the member set.
    Member,
    /// No relationship.
    None,
}

impl ProjectRelation {
    /// Resolve the relationship from the project's current state.
    pub fn of(project: &Project, user_id: Uuid) -> Self {
        if project.is_manager(user_id) {
            Self::Owner
        } else if project.is_member(user_id) {
            Self::Member
        } else {
            Self::None
        }
    }

    /// Whether there is any relationship.
    pub fn is_related(&self) -> bool {
        !matches!(self, Self::None)
    }
}
