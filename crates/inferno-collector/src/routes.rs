use crate::error::Result;
use crate::state::AppState;
use crate::types::CollectResponse;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use tracing::debug;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "inferno-collector" }))
}

/// `GET /collect` (§6): the full variant list plus each variant's resource
/// handle.
pub async fn collect(State(state): State<Arc<AppState>>) -> Result<Json<CollectResponse>> {
    let doc = state.load()?;
    debug!(variants = doc.variants.len(), "collected variant state");
    Ok(Json(doc.into()))
}
