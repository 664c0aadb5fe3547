//! Task handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use uuid::Uuid;

use worktrack_entity::task::Task;

use crate::dto::request::{
    CreateTaskRequest, StatusRequest, TaskListQuery, UpdateTaskRequest, UserRefRequest,
};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{ApiPath, ApiQuery, AuthUser, ValidJson};
use crate::state::AppState;

/// GET /api/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<TaskListQuery>,
) -> Result<Json<ApiResponse<Vec<Task>>>, ApiError> {
    let tasks = state.task_service.list(&auth, query.into()).await?;
    Ok(Json(ApiResponse::ok(tasks)))
}

/// GET /api/tasks/{id}
pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Task>>, ApiError> {
    let task = state.task_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(task)))
}

/// POST /api/tasks
///
/// Returns one task per assignee.
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<Task>>>), ApiError> {
    let tasks = state.task_service.create(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(tasks))))
}

/// PUT /api/tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<UpdateTaskRequest>,
) -> Result<Json<ApiResponse<Task>>, ApiError> {
    let task = state.task_service.update(&auth, id, req.into()).await?;
    Ok(Json(ApiResponse::ok(task)))
}

/// DELETE /api/tasks/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Task>>, ApiError> {
    let task = state.task_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(task)))
}

/// PATCH /api/tasks/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<StatusRequest>,
) -> Result<Json<ApiResponse<Task>>, ApiError> {
    let task = state
        .task_service
        .update_status(&auth, id, req.status)
        .await?;
    Ok(Json(ApiResponse::ok(task)))
}

/// PATCH /api/tasks/{id}/assign
pub async fn assign_task(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<UserRefRequest>,
) -> Result<Json<ApiResponse<Task>>, ApiError> {
    let task = state.task_service.assign(&auth, id, req.user_id).await?;
    Ok(Json(ApiResponse::ok(task)))
}
