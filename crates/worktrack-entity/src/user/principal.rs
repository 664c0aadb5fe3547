//! The authenticated caller.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::UserRole;

/// Identity every access decision is made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// User ID.
    pub id: Uuid,
    /// Role as currently stored.
    pub role: UserRole,
    /// Inactive principals never reach the access evaluator.
    pub active: bool,
}

impl Principal {
    /// Create an active principal.
    pub fn new(id: Uuid, role: UserRole) -> Self {
        Self {
            id,
            role,
            active: true,
        }
    }
}
