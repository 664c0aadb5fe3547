//! User administration handlers (admin only).

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use uuid::Uuid;

use worktrack_entity::user::User;

use crate::dto::request::{CreateUserRequest, UpdateUserRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{ApiPath, AuthUser, ValidJson};
use crate::state::AppState;

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    let users = state.admin_user_service.list(&auth).await?;
    Ok(Json(ApiResponse::ok(users)))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.admin_user_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let user = state.admin_user_service.create(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user))))
}

/// PUT /api/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.admin_user_service.update(&auth, id, req.into()).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.admin_user_service.deactivate(&auth, id).await?;
    Ok(Json(ApiResponse::ok(user)))
}
