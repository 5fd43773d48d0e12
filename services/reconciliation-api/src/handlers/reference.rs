//! Reference table endpoints.

use axum::extract::State;
use axum::response::Json;
use serde::Serialize;

use bomline_utils::{ColumnMap, ReferenceLoader};

use crate::handlers::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ReferenceStatus {
    pub loaded: bool,
    pub entries: usize,
    pub attributes: Vec<String>,
    pub source: String,
}

pub async fn reference_status(State(state): State<AppState>) -> Json<ReferenceStatus> {
    let current = state.reference.current();
    Json(ReferenceStatus {
        loaded: current.is_some(),
        entries: current.as_ref().map(|t| t.len()).unwrap_or(0),
        attributes: current
            .map(|t| t.attribute_names().to_vec())
            .unwrap_or_default(),
        source: state.config.reference.path.display().to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub entries: usize,
}

/// Reload the reference table from its configured source. The swap is
/// atomic; in-flight runs keep the snapshot they started with.
pub async fn reload_reference(State(state): State<AppState>) -> ApiResult<Json<ReloadResponse>> {
    let loader = ReferenceLoader::new(ColumnMap::with_synonyms(
        &state.config.reconciliation.column_synonyms,
    ));
    let table = loader.load(&state.config.reference.path)?;
    let entries = state.reference.swap(table);

    tracing::info!(entries, "reference table reloaded");
    Ok(Json(ReloadResponse { entries }))
}
