//! Project entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::ProjectStatus;

/// A project owned by exactly one manager.
///
/// The manager is never part of `members`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique project identifier.
    pub id: Uuid,
    /// Project name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Owning manager.
    pub manager_id: Uuid,
    /// Member user IDs, unique.
    pub members: Vec<Uuid>,
    /// Lifecycle status.
    pub status: ProjectStatus,
    /// Optimistic concurrency counter.
    pub version: i64,
    /// Who created the project.
    pub created_by: Uuid,
    /// When the project was created.
    pub created_at: DateTime<Utc>,
    /// When the project was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Check if the user owns this project.
    pub fn is_manager(&self, user_id: Uuid) -> bool {
        self.manager_id == user_id
    }

    /// Check if the user is in the member set.
    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.members.contains(&user_id)
    }

    /// The manager followed by every member.
    pub fn participants(&self) -> Vec<Uuid> {
        let mut all = Vec::with_capacity(self.members.len() + 1);
        all.push(self.manager_id);
        all.extend(self.members.iter().copied());
        all
    }
}
