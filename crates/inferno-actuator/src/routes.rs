use crate::error::{Error, Result};
use crate::state::AppState;
use crate::types::{UpdateRequest, UpdateResponse};
use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "inferno-actuator" }))
}

/// `POST /update` (§6): accepts a desired allocation per variant plus its
/// resource handle, and applies it. Every allocation must carry a matching
/// handle — the controller always round-trips handles verbatim from
/// `/collect`, so a missing one means the caller is out of sync.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdateRequest>,
) -> Result<Json<UpdateResponse>> {
    for variant in request.allocations.keys() {
        if !request.handles.contains_key(variant) {
            warn!(%variant, "update rejected: no resource handle for variant");
            return Err(Error::MissingHandle(variant.clone()));
        }
    }

    state.apply(&request)?;
    info!(applied = request.allocations.len(), "applied desired allocations");
    Ok(Json(UpdateResponse { applied: request.allocations.len() }))
}
