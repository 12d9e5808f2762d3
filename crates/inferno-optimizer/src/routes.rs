use crate::error::Result;
use crate::types::OptimizeRequest;
use axum::Json;
use inferno_core::analyzer::AnalyzerConfig;
use inferno_core::model::System;
use inferno_core::optimizer::{self, OptimizerResult};
use inferno_core::solver::{GreedySolver, OptimizerOptions};
use tracing::info;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "inferno-optimizer" }))
}

/// `POST /optimize` (§2, §6 ambient): builds a `System` from the posted
/// catalogs, refreshes candidates and runs the greedy solver, returning the
/// same `OptimizerResult` the control loop computes in-process.
pub async fn optimize(Json(request): Json<OptimizeRequest>) -> Result<Json<OptimizerResult>> {
    let (accelerators, capacity) = request.accelerators.into_parts()?;
    let models = request.models.into_map()?;
    let classes = request.classes.into_map()?;
    let variants = request.variants.into_map()?;
    let options: OptimizerOptions = request.options.into();

    let mut system = System::new(accelerators, models, classes, variants, capacity);
    let analyzer_config = AnalyzerConfig {
        min_num_replicas: options.min_num_replicas,
        ..AnalyzerConfig::default()
    };
    let backend = GreedySolver::new(options);

    let result: OptimizerResult = optimizer::optimize(&mut system, &backend, &analyzer_config)?;
    info!(allocations = result.allocations.len(), "optimize request served");
    Ok(Json(result))
}
