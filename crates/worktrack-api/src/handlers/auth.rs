//! Auth handlers: login, me.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;

use worktrack_entity::user::User;

use crate::dto::request::LoginRequest;
use crate::dto::response::{ApiResponse, LoginResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidJson};
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .unwrap_or("unknown");

    let result = state
        .auth_service
        .login(&req.username, &req.password, ip)
        .await?;

    Ok(Json(ApiResponse::ok(result.into())))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.auth_service.me(&auth).await?;
    Ok(Json(ApiResponse::ok(user)))
}
