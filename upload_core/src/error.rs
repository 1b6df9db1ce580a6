//! Application error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::files::{StoreError, ValidationError};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[source] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidKey(key) => {
                tracing::debug!("Rejected storage key {:?}", key);
                AppError::NotFound("file not found".to_string())
            }
            StoreError::NotFound(_) => AppError::NotFound("file not found".to_string()),
            StoreError::Io(e) => AppError::Storage(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(err) => {
                let status = if err.is_payload_too_large() {
                    StatusCode::PAYLOAD_TOO_LARGE
                } else {
                    StatusCode::BAD_REQUEST
                };
                tracing::debug!("Upload rejected: {:?}", err);
                (status, err.to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Storage(err) => {
                tracing::error!("Storage error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "storage error".to_string())
            }
            AppError::Other(err) => {
                tracing::error!("Unexpected error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::from(ValidationError::NoFileSelected), StatusCode::BAD_REQUEST),
            (
                AppError::from(ValidationError::PayloadTooLarge { size: 2, max_size: 1 }),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (AppError::from(StoreError::InvalidKey("../x".into())), StatusCode::NOT_FOUND),
            (AppError::from(StoreError::NotFound("x".into())), StatusCode::NOT_FOUND),
            (
                AppError::from(StoreError::Io(std::io::Error::other("disk full"))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_invalid_key_is_indistinguishable_from_missing() {
        let invalid = AppError::from(StoreError::InvalidKey("../../etc/passwd".into()));
        let missing = AppError::from(StoreError::NotFound("x.png".into()));

        assert_eq!(invalid.to_string(), missing.to_string());
    }
}
