//! Workbook upload endpoints.

use axum::extract::{Multipart, State};
use axum::response::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use bomline_utils::BomlineError;

use crate::handlers::ApiResult;
use crate::state::AppState;
use crate::storage::StoredFile;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_id: String,
    pub filename: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// Accept a multipart workbook upload and persist it.
pub async fn upload_workbook(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| BomlineError::validation("file", format!("upload error: {e}")))?
        .ok_or_else(|| BomlineError::validation("file", "no file provided"))?;

    let filename = field
        .file_name()
        .map(|s| s.to_string())
        .ok_or_else(|| BomlineError::validation("file", "missing filename"))?;

    let data = field
        .bytes()
        .await
        .map_err(|e| BomlineError::validation("file", format!("read error: {e}")))?;

    let stored = state.store.save(&filename, &data)?;

    Ok(Json(UploadResponse {
        file_id: stored.file_id,
        filename: stored.original_name,
        size_bytes: stored.file_size,
        uploaded_at: stored.uploaded_at,
    }))
}

#[derive(Debug, Serialize)]
pub struct UploadListResponse {
    pub files: Vec<StoredFile>,
}

/// List stored uploads, newest first.
pub async fn list_uploads(State(state): State<AppState>) -> ApiResult<Json<UploadListResponse>> {
    let files = state.store.list()?;
    Ok(Json(UploadListResponse { files }))
}
