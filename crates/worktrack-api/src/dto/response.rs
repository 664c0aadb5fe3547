//! Response DTOs.
//!
//! Entities serialize themselves; this module only holds the envelope and
//! the few shapes that are not entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use worktrack_entity::user::User;
use worktrack_service::user::LoginResult;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Login response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Access token.
    pub access_token: String,
    /// Token type, always `Bearer`.
    pub token_type: &'static str,
    /// Access token expiration.
    pub expires_at: DateTime<Utc>,
    /// The authenticated user.
    pub user: User,
}

impl From<LoginResult> for LoginResponse {
    fn from(result: LoginResult) -> Self {
        Self {
            access_token: result.token.access_token,
            token_type: "Bearer",
            expires_at: result.token.expires_at,
            user: result.user,
        }
    }
}

/// A bare count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    /// The count.
    pub count: u64,
}

/// Result of a bulk mark-read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkedResponse {
    /// Number of notifications marked read.
    pub marked: u64,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Server version.
    pub version: String,
    /// `connected` or `unavailable`.
    pub store: String,
}
