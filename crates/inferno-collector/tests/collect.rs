//! Thin integration test: spin up the router against a temp data
//! directory and hit `/collect`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

#[path = "../src/error.rs"]
mod error;
#[path = "../src/routes.rs"]
mod routes;
#[path = "../src/state.rs"]
mod state;
#[path = "../src/types.rs"]
mod types;

use state::AppState;
use std::sync::Arc;

fn app(data_path: &std::path::Path) -> axum::Router {
    let state = Arc::new(AppState::new(data_path));
    axum::Router::new()
        .route("/health", axum::routing::get(routes::health))
        .route("/collect", axum::routing::get(routes::collect))
        .with_state(state)
}

#[tokio::test]
async fn collect_returns_empty_payload_when_no_data_file_exists() {
    let dir = tempfile_dir();
    let response = app(&dir)
        .oneshot(Request::builder().uri("/collect").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["variants"], serde_json::json!([]));
}

#[tokio::test]
async fn collect_reports_variants_written_to_disk() {
    let dir = tempfile_dir();
    std::fs::write(
        dir.join("variants.json"),
        r#"{
            "variants": [{
                "name": "v1",
                "model": "m",
                "service_class": "gold",
                "load": {
                    "arrival_rate_per_min": 10.0,
                    "avg_input_tokens": 50.0,
                    "avg_output_tokens": 200.0,
                    "cov_arrival": 1.0,
                    "cov_service": 1.0
                }
            }],
            "handles": {
                "v1": { "uid": "u1", "name": "v1", "namespace": "default" }
            }
        }"#,
    )
    .unwrap();

    let response = app(&dir)
        .oneshot(Request::builder().uri("/collect").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["variants"][0]["name"], "v1");
    assert_eq!(json["handles"]["v1"]["namespace"], "default");
}

fn tempfile_dir() -> std::path::PathBuf {
    use std::sync::atomic::{AtomicUsize, Ordering};
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("inferno-collector-test-{}-{}", std::process::id(), n));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
