//! Project handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use uuid::Uuid;

use worktrack_entity::project::Project;

use crate::dto::request::{CreateProjectRequest, UpdateProjectRequest, UserRefRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{ApiPath, AuthUser, ValidJson};
use crate::state::AppState;

/// GET /api/projects
pub async fn list_projects(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<Project>>>, ApiError> {
    let projects = state.project_service.list(&auth).await?;
    Ok(Json(ApiResponse::ok(projects)))
}

/// GET /api/projects/{id}
pub async fn get_project(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let project = state.project_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(project)))
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Project>>), ApiError> {
    let project = state.project_service.create(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(project))))
}

/// PUT /api/projects/{id}
pub async fn update_project(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<UpdateProjectRequest>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let project = state.project_service.update(&auth, id, req.into()).await?;
    Ok(Json(ApiResponse::ok(project)))
}

/// DELETE /api/projects/{id}
pub async fn delete_project(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let project = state.project_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(project)))
}

/// POST /api/projects/{id}/add-member
pub async fn add_member(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<UserRefRequest>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let project = state
        .project_service
        .add_member(&auth, id, req.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(project)))
}

/// DELETE /api/projects/{id}/remove-member/{user_id}
pub async fn remove_member(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((id, user_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let project = state
        .project_service
        .remove_member(&auth, id, user_id)
        .await?;
    Ok(Json(ApiResponse::ok(project)))
}
