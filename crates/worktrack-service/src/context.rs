//! Request context carrying the authenticated principal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use worktrack_entity::user::{Principal, User, UserRole};

/// Context for the current authenticated request.
///
/// Built by the auth extractor from the user as currently stored and passed
/// into service methods so that every operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated principal.
    pub principal: Principal,
    /// The username.
    pub username: String,
    /// IP address of the request origin.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context for a loaded user.
    pub fn for_user(user: &User, ip_address: String, user_agent: Option<String>) -> Self {
        Self {
            principal: user.principal(),
            username: user.username.clone(),
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }

    /// The acting user's ID.
    pub fn user_id(&self) -> Uuid {
        self.principal.id
    }

    /// The acting user's role.
    pub fn role(&self) -> UserRole {
        self.principal.role
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        self.principal.role.is_admin()
    }
}
