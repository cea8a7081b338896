use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and embedding backend.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "skillgap-api",
        "embedding_backend": state.engine.provider_name(),
        "skill_match_mode": state.engine.extractor().mode(),
        "vocabulary_size": state.engine.extractor().vocabulary().len(),
    }))
}
