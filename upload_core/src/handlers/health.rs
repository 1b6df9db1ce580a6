//! Liveness and health handlers

use crate::{models::ApiResponse, AppState};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

pub const LIVENESS_MESSAGE: &str = "image upload service is running";

pub async fn handle_root() -> &'static str {
    LIVENESS_MESSAGE
}

pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let uptime_seconds = (chrono::Utc::now() - state.started_at).num_seconds();

    match state.file_manager.get_storage_stats().await {
        Ok(stats) => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({
                "status": "healthy",
                "app": state.app_name,
                "version": state.version,
                "timestamp": chrono::Utc::now().timestamp(),
                "uptime_seconds": uptime_seconds,
                "storage": {
                    "backend": state.file_manager.backend_name(),
                    "object_count": stats.object_count,
                    "total_bytes": stats.total_bytes,
                },
            }))),
        ),
        Err(e) => {
            tracing::warn!("Storage health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::error("storage unavailable".to_string())),
            )
        }
    }
}
