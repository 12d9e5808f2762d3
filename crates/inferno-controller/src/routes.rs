use crate::cycle;
use crate::state::AppState;
use crate::types::CycleStatus;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "inferno-controller" }))
}

/// `GET /invoke` (§6): triggers an aperiodic cycle and waits for it to
/// finish, returning 200 on completion or a 4xx/5xx error body.
pub async fn invoke(State(state): State<Arc<AppState>>) -> Response {
    match cycle::run_cycle(state, CancellationToken::new()).await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "status": "completed" }))).into_response(),
        Err(e) => {
            (StatusCode::SERVICE_UNAVAILABLE, Json(serde_json::json!({ "error": e.to_string() }))).into_response()
        }
    }
}

/// `GET /metrics` (§6): `inferno_desired_replicas{variant_name=...}` in
/// Prometheus text exposition format.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [("content-type", "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// `GET /status` (§6 ambient): the last cycle's per-variant
/// accelerator/replica status, for operability.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<CycleStatus> {
    Json(state.status.read().await.clone())
}
