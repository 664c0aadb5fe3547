//! User-related domain events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to user administration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UserEvent {
    /// A new user was created.
    Created {
        /// The user ID.
        user_id: Uuid,
        /// The username.
        username: String,
        /// The assigned role.
        role: String,
    },
    /// A user was updated.
    Updated {
        /// The user ID.
        user_id: Uuid,
        /// The username.
        username: String,
        /// Fields that changed.
        changed_fields: Vec<String>,
    },
    /// A user was deactivated.
    Deleted {
        /// The user ID.
        user_id: Uuid,
        /// The username.
        username: String,
    },
}

impl UserEvent {
    /// The user this event concerns.
    pub fn user_id(&self) -> Uuid {
        match self {
            Self::Created { user_id, .. }
            | Self::Updated { user_id, .. }
            | Self::Deleted { user_id, .. } => *user_id,
        }
    }
}
