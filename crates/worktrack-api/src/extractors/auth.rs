//! `AuthUser` extractor: pulls the JWT from the Authorization header,
//! validates it and loads the current user.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tracing::debug;

use worktrack_core::error::AppError;
use worktrack_database::Store;
use worktrack_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated user context available in handlers.
///
/// Role and active flag come from the stored user, not the token, so a
/// role change or deactivation takes effect on the next request.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid Authorization header format"))?;

        let claims = state.jwt_decoder.decode(token)?;

        let user = state
            .store
            .find_user(claims.user_id())
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| {
                debug!(user_id = %claims.user_id(), "Token for unknown or inactive user");
                AppError::unauthorized("Unknown or inactive user")
            })?;

        let ip_address = client_ip(parts);
        let user_agent = parts
            .headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Ok(AuthUser(RequestContext::for_user(&user, ip_address, user_agent)))
    }
}

/// Best-effort client address from proxy headers.
pub fn client_ip(parts: &Parts) -> String {
    parts
        .headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
