//! Task progress log handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use uuid::Uuid;

use worktrack_entity::task::TaskLogEntry;

use crate::dto::request::AppendLogRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{ApiPath, AuthUser, ValidJson};
use crate::state::AppState;

/// GET /api/tasks/{id}/logs
pub async fn list_logs(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Vec<TaskLogEntry>>>, ApiError> {
    let logs = state.task_log_service.list(&auth, id).await?;
    Ok(Json(ApiResponse::ok(logs)))
}

/// POST /api/tasks/{id}/logs
pub async fn append_log(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<AppendLogRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TaskLogEntry>>), ApiError> {
    let entry = state.task_log_service.append(&auth, id, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(entry))))
}
