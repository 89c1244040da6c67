//! Image upload endpoint.

use axum::extract::{Multipart, State};
use serde::Serialize;

use super::{success, ApiResult};
use crate::auth::now_millis;
use crate::errors::AppError;
use crate::AppState;

/// Maximum accepted request body for uploads.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Public URL prefix under which uploads are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Result of a stored upload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub url: String,
    pub file_name: String,
    pub size: usize,
}

/// POST /api/admin/upload - Store the multipart `file` field as a public image.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<UploadResponse> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("image/") {
            return Err(AppError::Validation(
                "Only image uploads are allowed".to_string(),
            ));
        }

        let original = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }

        let file_name = format!("{}-{}", now_millis(), sanitize_file_name(&original));
        tokio::fs::create_dir_all(&state.config.upload_dir).await?;
        tokio::fs::write(state.config.upload_dir.join(&file_name), &bytes).await?;

        tracing::info!(file = %file_name, size = bytes.len(), "Stored upload");
        return success(UploadResponse {
            url: format!("{UPLOADS_URL_PREFIX}/{file_name}"),
            file_name,
            size: bytes.len(),
        });
    }

    Err(AppError::Validation("No file uploaded".to_string()))
}

/// Reduce a client-supplied name to `[a-z0-9._-]`, without path components.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
