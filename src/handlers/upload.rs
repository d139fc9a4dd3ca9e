//! # Upload Handler
//!
//! Accepts a single multipart `file` field, checks type and size, and hands the
//! bytes to the configured [`ObjectStore`](crate::storage::ObjectStore).

use axum::{
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
    response::Json,
};

use crate::auth::AdminSession;
use crate::error::{ApiError, ErrorType};
use crate::handlers::types::UploadResponse;
use crate::server::AppState;
use crate::storage::{
    ALLOWED_CONTENT_TYPES, StorageError, UploadObject, is_allowed_content_type, object_name,
};

/// Multipart field carrying the file.
pub const FILE_FIELD: &str = "file";

fn no_file() -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", "No file provided")
}

/// Upload an image and return its public URL
#[utoipa::path(
    post,
    path = "/api/admin/upload",
    request_body(content_type = "multipart/form-data", description = "Form with a `file` field"),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "No file provided", body = ApiError),
        (status = 413, description = "File too large", body = ApiError),
        (status = 415, description = "Unsupported file type", body = ApiError),
        (status = 500, description = "Upload to storage failed", body = ApiError),
        (status = 503, description = "Storage not configured", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    session: AdminSession,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_FAILED",
            rejection.body_text(),
        )
    })?;
    let max_bytes = state.config.upload_max_bytes;

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        if !is_allowed_content_type(&content_type) {
            return Err(ApiError::from(ErrorType::UnsupportedMediaType).with_details(
                serde_json::json!({
                    "contentType": content_type,
                    "allowed": ALLOWED_CONTENT_TYPES,
                }),
            ));
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            if bytes.len() + chunk.len() > max_bytes {
                return Err(ApiError::from(ErrorType::PayloadTooLarge)
                    .with_details(serde_json::json!({ "maxBytes": max_bytes })));
            }
            bytes.extend_from_slice(&chunk);
        }
        if bytes.is_empty() {
            return Err(no_file());
        }

        let store = state.store.as_ref().ok_or(StorageError::NotConfigured)?;
        let object = UploadObject {
            name: object_name(&file_name),
            content_type,
            bytes,
        };
        let name = object.name.clone();
        let size = object.bytes.len();

        let url = store.upload(object).await?;
        tracing::info!(object = %name, size, admin = %session.0.email, "File uploaded");

        return Ok(Json(UploadResponse { url }));
    }

    Err(no_file())
}
