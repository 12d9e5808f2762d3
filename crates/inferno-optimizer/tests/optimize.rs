//! Thin integration test: spin up the router and hit `POST /optimize` with
//! scenario 1 from the spec (single variant, unlimited, zero load).

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

#[path = "../src/error.rs"]
mod error;
#[path = "../src/routes.rs"]
mod routes;
#[path = "../src/types.rs"]
mod types;

fn app() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(routes::health))
        .route("/optimize", axum::routing::post(routes::optimize))
}

#[tokio::test]
async fn optimize_single_variant_unlimited_zero_load() {
    let body = serde_json::json!({
        "accelerators": {
            "accelerators": [{
                "name": "A100",
                "accel_type": "A100",
                "memory_gb": 80.0,
                "memory_bandwidth_gbps": 2000.0,
                "cost_per_hour": 1.0,
                "power": { "idle_watts": 50.0, "mid_watts": 200.0, "full_watts": 400.0, "mid_util": 0.5 },
                "multiplicity": 1
            }],
            "capacity": {},
            "unlimited": true
        },
        "models": {
            "models": [{
                "name": "llama",
                "memory_gb": 40.0,
                "profiles": {
                    "A100": { "alpha": 20.0, "beta": 0.72, "gamma": 50.0, "delta": 0.05, "n_max": 4, "at_tokens": 200.0 }
                }
            }]
        },
        "classes": {
            "classes": [{
                "name": "gold",
                "priority": 0,
                "targets": {
                    "llama": { "itl_ms": 100.0, "ttft_ms": 500.0, "ttw_ms": 1000.0, "tps": null, "percentile": 0.95 }
                }
            }]
        },
        "variants": {
            "variants": [{
                "name": "v1",
                "model": "llama",
                "service_class": "gold",
                "current_replicas": 0,
                "current_accelerator": null,
                "load": {
                    "arrival_rate_per_min": 0.0,
                    "avg_input_tokens": 50.0,
                    "avg_output_tokens": 200.0,
                    "cov_arrival": 1.0,
                    "cov_service": 1.0
                },
                "min_replicas": 1,
                "batch_override": null
            }]
        },
        "options": { "Unlimited": true }
    });

    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/optimize")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let resp_body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&resp_body).unwrap();
    assert_eq!(json["allocations"]["v1"]["accelerator"], "A100");
    assert_eq!(json["allocations"]["v1"]["replicas"], 1);
    assert_eq!(json["allocations"]["v1"]["cost"], 1.0);
}
