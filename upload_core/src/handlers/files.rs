use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, Result},
    files::{FileUpload, ValidationError},
    AppState,
};

/// Name of the multipart field carrying the upload.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize, Deserialize)]
pub struct FileUploadResponse {
    pub message: String,
    pub url: String,
}

pub async fn upload_file(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<FileUploadResponse>)> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("Upload without a multipart body: {}", e);
        AppError::Validation(ValidationError::MissingFilePart)
    })?;

    let max_size = state.file_manager.validator().max_file_size();
    let mut file_upload: Option<FileUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, 0, max_size))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        // A part without a filename parameter is a plain form value, not a file.
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        let data = read_field_capped(field, max_size).await?;
        file_upload = Some(FileUpload::new(filename, data));
        break;
    }

    let upload = file_upload.ok_or(AppError::Validation(ValidationError::MissingFilePart))?;
    let object = state.file_manager.store_file(upload).await?;

    Ok((
        StatusCode::CREATED,
        Json(FileUploadResponse {
            message: "upload succeeded".to_string(),
            url: object.url(),
        }),
    ))
}

/// Buffers one multipart field, bailing out as soon as it grows past
/// `max_size` so an oversized body is never fully read.
async fn read_field_capped(mut field: Field<'_>, max_size: u64) -> Result<Vec<u8>> {
    let mut data = Vec::new();

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, data.len() as u64, max_size))?
    {
        let received = (data.len() + chunk.len()) as u64;
        if received > max_size {
            tracing::warn!("Aborting upload after {} bytes (max: {})", received, max_size);
            return Err(ValidationError::PayloadTooLarge { size: received, max_size }.into());
        }
        data.extend_from_slice(&chunk);
    }

    Ok(data)
}

fn multipart_error(err: MultipartError, received: u64, max_size: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ValidationError::PayloadTooLarge {
            size: received.max(max_size.saturating_add(1)),
            max_size,
        }
        .into();
    }

    AppError::BadRequest(format!("malformed multipart body: {}", err.body_text()))
}

pub async fn serve_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response> {
    let (key, data) = state.file_manager.get_file(&key).await?;

    let content_type = mime_guess::from_ext(key.extension()).first_or_octet_stream();

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type.as_ref())
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    // Stored objects are never rewritten.
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=31536000, immutable"),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );

    Ok((StatusCode::OK, headers, data).into_response())
}
