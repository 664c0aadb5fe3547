//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::principal::Principal;
use super::role::UserRole;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// Argon2 password hash.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Human-readable display name.
    pub display_name: Option<String>,
    /// User role.
    pub role: UserRole,
    /// Deactivated users cannot authenticate.
    pub is_active: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a new active user.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: None,
            password_hash: password_hash.into(),
            display_name: None,
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Project the user onto the authorization principal.
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            role: self.role,
            active: self.is_active,
        }
    }

    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
