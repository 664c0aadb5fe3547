//! Audit log handlers.

use axum::Json;
use axum::extract::State;

use worktrack_core::types::pagination::{PageRequest, PageResponse};
use worktrack_entity::audit::AuditEntry;

use crate::dto::request::AuditSearchQuery;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{ApiQuery, AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/activity-logs
pub async fn activity_logs(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<AuditEntry>>>, ApiError> {
    let page = state
        .audit_service
        .activity_logs(&auth, params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/admin/audit
pub async fn search_audit(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<AuditSearchQuery>,
) -> Result<Json<ApiResponse<PageResponse<AuditEntry>>>, ApiError> {
    let page = PageRequest::new(query.page.unwrap_or(1), query.page_size.unwrap_or(25));
    let result = state
        .audit_service
        .search(&auth, (&query).into(), page)
        .await?;
    Ok(Json(ApiResponse::ok(result)))
}
