//! Sheet analysis and preview endpoints.

use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::Deserialize;
use std::collections::HashMap;

use bomline_models::SheetAnalysis;
use bomline_utils::BomlineError;

use crate::handlers::ApiResult;
use crate::state::AppState;

const DEFAULT_PREVIEW_ROWS: usize = 10;

/// Analyze every sheet of a stored upload and recommend one.
pub async fn analyze_sheets(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> ApiResult<Json<SheetAnalysis>> {
    let stored = state
        .store
        .find(&file_id)?
        .ok_or_else(|| BomlineError::not_found(format!("upload '{file_id}'")))?;

    let analysis = state.extractor.analyze(&stored.stored_path)?;
    Ok(Json(analysis))
}

#[derive(Debug, Deserialize)]
pub struct PreviewParams {
    pub rows: Option<usize>,
}

/// First rows of one sheet, for the selection UI.
pub async fn preview_sheet(
    State(state): State<AppState>,
    Path((file_id, sheet_name)): Path<(String, String)>,
    Query(params): Query<PreviewParams>,
) -> ApiResult<Json<Vec<HashMap<String, String>>>> {
    let stored = state
        .store
        .find(&file_id)?
        .ok_or_else(|| BomlineError::not_found(format!("upload '{file_id}'")))?;

    let limit = params.rows.unwrap_or(DEFAULT_PREVIEW_ROWS);
    let rows = state
        .extractor
        .preview(&stored.stored_path, &sheet_name, limit)?;
    Ok(Json(rows))
}
