//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::warn;

use worktrack_database::Store;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let connected = match state.store.health_check().await {
        Ok(ok) => ok,
        Err(e) => {
            warn!(error = %e, "Store health check failed");
            false
        }
    };

    let (status, label, store) = if connected {
        (StatusCode::OK, "ok", "connected")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unavailable")
    };

    (
        status,
        Json(ApiResponse::ok(HealthResponse {
            status: label.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            store: store.to_string(),
        })),
    )
}
