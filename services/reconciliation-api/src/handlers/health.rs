use axum::extract::State;
use axum::response::Json;

use crate::state::AppState;

/// Service status plus reference-table availability.
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let reference = state.reference.current();
    Json(serde_json::json!({
        "status": "healthy",
        "service": "reconciliation-api",
        "version": env!("CARGO_PKG_VERSION"),
        "reference_table": {
            "loaded": reference.is_some(),
            "entries": reference.map(|t| t.len()).unwrap_or(0),
            "source": state.config.reference.path.display().to_string(),
        }
    }))
}
