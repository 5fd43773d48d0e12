//! Reconciliation endpoint.

use axum::extract::{Path, State};
use axum::response::Json;
use serde::Deserialize;
use validator::Validate;

use bomline_models::CleaningReport;
use bomline_utils::{build_report, validate_model, BomlineError, ReconcilerConfig, RowReconciler};

use crate::handlers::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ReconcileRequest {
    #[validate(length(min = 1, max = 255, message = "Sheet name must be between 1 and 255 characters"))]
    pub sheet_name: String,
    /// Per-run overrides; defaults come from service configuration.
    pub key_pattern: Option<String>,
    pub numeric_tolerance: Option<f64>,
    pub tracked_fields: Option<Vec<String>>,
}

/// Run the full reconciliation pass over one sheet of a stored upload.
///
/// The caller gets either a complete report or a single fatal error,
/// never a partial mix; row-level anomalies are inside the report.
pub async fn reconcile_upload(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    Json(request): Json<ReconcileRequest>,
) -> ApiResult<Json<CleaningReport>> {
    validate_model(&request)?;

    let stored = state
        .store
        .find(&file_id)?
        .ok_or_else(|| BomlineError::not_found(format!("upload '{file_id}'")))?;

    let reference = state
        .reference
        .current()
        .ok_or_else(|| BomlineError::reference_load("reference table is not loaded"))?;

    let mut settings = state.config.reconciliation.clone();
    if let Some(pattern) = request.key_pattern {
        settings.key_pattern = pattern;
    }
    if let Some(tolerance) = request.numeric_tolerance {
        settings.numeric_tolerance = tolerance;
    }
    if let Some(tracked) = request.tracked_fields {
        settings.tracked_fields = Some(tracked);
    }
    let config = ReconcilerConfig::from_settings(&settings)?;

    let rows = state
        .extractor
        .extract_rows(&stored.stored_path, &request.sheet_name)?;
    let classifications = RowReconciler::new(reference, config).classify_all(&rows);
    let report = build_report(&classifications);

    tracing::info!(
        file_id = %file_id,
        sheet = %request.sheet_name,
        rows = report.total_rows,
        quality = report.quality_score,
        "reconciliation run completed"
    );

    Ok(Json(report))
}
