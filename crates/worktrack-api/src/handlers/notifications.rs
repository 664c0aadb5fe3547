//! Notification inbox handlers.

use axum::Json;
use axum::extract::State;
use uuid::Uuid;

use worktrack_entity::notification::Notification;
use worktrack_service::notification::InboxPage;

use crate::dto::request::InboxQuery;
use crate::dto::response::{ApiResponse, CountResponse, MarkedResponse};
use crate::error::ApiError;
use crate::extractors::{ApiPath, ApiQuery, AuthUser};
use crate::state::AppState;

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<InboxQuery>,
) -> Result<Json<ApiResponse<InboxPage>>, ApiError> {
    let page = state
        .notification_service
        .list(&auth, query.unread_only, query.limit)
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    let count = state.notification_service.unread_count(&auth).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

/// PATCH /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Notification>>, ApiError> {
    let notification = state.notification_service.mark_read(&auth, id).await?;
    Ok(Json(ApiResponse::ok(notification)))
}

/// PATCH /api/notifications/mark-all-read
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<MarkedResponse>>, ApiError> {
    let marked = state.notification_service.mark_all_read(&auth).await?;
    Ok(Json(ApiResponse::ok(MarkedResponse { marked })))
}
