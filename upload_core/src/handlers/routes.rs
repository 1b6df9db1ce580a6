//! Route table for the upload service

use crate::{
    error::AppError,
    handlers::{files, health},
    AppState,
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

/// Slack on top of the file cap for multipart boundaries and part headers.
pub const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

pub fn create_routes(max_file_size: u64) -> Router<AppState> {
    let body_limit = usize::try_from(max_file_size.saturating_add(MULTIPART_OVERHEAD_BYTES))
        .unwrap_or(usize::MAX);

    Router::new()
        .route("/", get(health::handle_root))
        .route("/health", get(health::handle_health))
        .route(
            "/upload",
            post(files::upload_file).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/uploads/:key", get(files::serve_file))
        .fallback(handle_not_found)
}

async fn handle_not_found() -> AppError {
    AppError::NotFound("not found".to_string())
}
