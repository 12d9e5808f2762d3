//! The control loop cycle (§4.H): collect -> analyze -> optimize ->
//! arbitrate -> actuate, strictly ordered (§5), serialized by
//! `AppState::cycle_gate`.

use crate::config;
use crate::error::{Error, Result};
use crate::state::AppState;
use crate::types::{CollectResponse, CycleStatus, DesiredAllocation, UpdateRequest, UpdateResponse, VariantStatus};
use inferno_core::analyzer::AnalyzerConfig;
use inferno_core::model::{System, Variant};
use inferno_core::optimizer::{self, OptimizerResult};
use inferno_core::saturation::{self, ReplicaMetrics, VariantLoad};
use inferno_core::solver::GreedySolver;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Runs one full cycle against `state`, guarded by the single-cycle
/// exclusion gate. Returns `Ok(())` on a clean (possibly partial,
/// zero-variant) cycle; stage failures are logged, counted, and returned as
/// `Err` so the caller can decide how to surface them (`/invoke`'s HTTP
/// status, or simply "resume next tick" for the periodic path).
#[instrument(skip(state, cancel))]
pub async fn run_cycle(state: Arc<AppState>, cancel: CancellationToken) -> Result<()> {
    let _guard = state.cycle_gate.lock().await;
    let cycle = state.next_cycle_number();

    match run_cycle_inner(&state, cycle, &cancel).await {
        Ok(()) => Ok(()),
        Err(err) => {
            let stage = stage_of(&err);
            warn!(cycle, stage, error = %err, "cycle aborted");
            state.metrics.record_failure(stage);
            state.status.write().await.last_error = Some(err.to_string());
            Err(err)
        }
    }
}

fn stage_of(err: &Error) -> &'static str {
    match err {
        Error::ConfigInvalid(_) => "reload",
        Error::CollectorUnavailable(_) => "collect",
        Error::ActuatorFailed(_) => "actuate",
        Error::MetricsUnavailable(_) => "arbitrate",
        Error::Core(inferno_core::Error::OptimizerInfeasible)
        | Error::Core(inferno_core::Error::SolverNoSolution(_)) => "optimize",
        Error::Core(_) => "analyze",
    }
}

async fn run_cycle_inner(state: &Arc<AppState>, cycle: u64, cancel: &CancellationToken) -> Result<()> {
    // Step 1: optionally reload static configuration (dynamic mode only).
    if state.dynamic {
        match config::load_static(&state.data_path) {
            Ok(fresh) => state.catalogs.store(Arc::new(fresh)),
            Err(e) => warn!(cycle, error = %e, "dynamic config reload failed, keeping prior catalogs"),
        }
    }
    let catalogs = state.catalogs.load_full();

    // Step 2: reload capacity, always.
    let capacity = config::load_capacity(&state.data_path)?;

    // Step 3: collect variant states and live replica metrics.
    let collected = collect(state, cancel).await?;
    if collected.variants.is_empty() {
        info!(cycle, "collector returned zero variants, completing cycle with no metrics");
        return Ok(());
    }

    // Step 4: rebuild System, run candidate analysis, run optimizer.
    let mut variants = HashMap::new();
    for doc in &collected.variants {
        variants.insert(doc.name.clone(), Variant::from(doc.clone()));
    }
    let mut system = System::new(
        catalogs.accelerators.clone(),
        catalogs.models.clone(),
        catalogs.classes.clone(),
        variants,
        capacity,
    );

    let analyzer_config = AnalyzerConfig {
        min_num_replicas: catalogs.optimizer_options.min_num_replicas,
        ..AnalyzerConfig::default()
    };
    let backend = GreedySolver::new(catalogs.optimizer_options);
    let optimized: OptimizerResult = optimizer::optimize(&mut system, &backend, &analyzer_config)?;

    // Step 5: saturation analyzer -> arbitration -> final per-variant target.
    let model_targets: HashMap<String, u32> = optimized
        .allocations
        .iter()
        .map(|(name, candidate)| (name.clone(), candidate.replicas))
        .collect();

    let variant_loads = build_variant_loads(&system, &catalogs, &collected.replica_metrics);
    let prior_desired = state.prior_desired.read().await.clone();
    let arbitration = saturation::arbitrate(
        &variant_loads,
        &model_targets,
        &prior_desired,
        &catalogs.saturation_config,
    )?;

    // Step 6: actuate, then emit the external metric and update status.
    let mut allocations = HashMap::new();
    let mut variant_statuses = HashMap::new();
    for (name, result) in &arbitration {
        let Some(candidate) = system.variants().get(name).and_then(|v| v.chosen.as_ref()) else {
            warn!(cycle, variant = %name, "no chosen allocation; skipping actuation, retaining prior allocation");
            continue;
        };
        allocations.insert(
            name.clone(),
            DesiredAllocation {
                accelerator: candidate.accelerator.clone(),
                replicas: result.target_replicas,
                max_batch: candidate.effective_max_batch,
            },
        );
        variant_statuses.insert(
            name.clone(),
            VariantStatus {
                accelerator: Some(candidate.accelerator.clone()),
                replicas: result.target_replicas,
                safety_override: result.safety_override,
                capacity_only: result.capacity_only,
            },
        );
    }

    actuate(state, cancel, &allocations, &collected.handles).await?;

    for (name, status) in &variant_statuses {
        state.metrics.set_desired_replicas(name, status.replicas);
    }
    let mut new_prior = HashMap::new();
    for (name, status) in &variant_statuses {
        new_prior.insert(name.clone(), status.replicas);
    }
    *state.prior_desired.write().await = new_prior;
    *state.status.write().await = CycleStatus { cycle, variants: variant_statuses, last_error: None };

    info!(cycle, variants = allocations.len(), solve_ms = optimized.solve_duration_ms, "cycle complete");
    Ok(())
}

async fn collect(state: &Arc<AppState>, cancel: &CancellationToken) -> Result<CollectResponse> {
    let url = format!("{}/collect", state.collector_url);
    let request = state.http.get(&url).send();
    let response = with_timeout_and_cancel(state.rpc_timeout, cancel, request)
        .await
        .map_err(|e| Error::CollectorUnavailable(format!("{url}: {e}")))?
        .map_err(|e| Error::CollectorUnavailable(format!("{url}: {e}")))?;
    if !response.status().is_success() {
        return Err(Error::CollectorUnavailable(format!("{url}: status {}", response.status())));
    }
    response
        .json::<CollectResponse>()
        .await
        .map_err(|e| Error::CollectorUnavailable(format!("{url}: decoding response: {e}")))
}

async fn actuate(
    state: &Arc<AppState>,
    cancel: &CancellationToken,
    allocations: &HashMap<String, DesiredAllocation>,
    handles: &HashMap<String, crate::types::ResourceHandle>,
) -> Result<()> {
    if allocations.is_empty() {
        return Ok(());
    }
    let url = format!("{}/update", state.actuator_url);
    let body = UpdateRequest {
        allocations: allocations.clone(),
        handles: handles
            .iter()
            .filter(|(name, _)| allocations.contains_key(*name))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    };
    let request = state.http.post(&url).json(&body).send();
    let response = with_timeout_and_cancel(state.rpc_timeout, cancel, request)
        .await
        .map_err(|e| Error::ActuatorFailed(format!("{url}: {e}")))?
        .map_err(|e| Error::ActuatorFailed(format!("{url}: {e}")))?;
    if !response.status().is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::ActuatorFailed(format!("{url}: {body}")));
    }
    let applied: UpdateResponse = response
        .json()
        .await
        .map_err(|e| Error::ActuatorFailed(format!("{url}: decoding response: {e}")))?;
    if applied.applied != allocations.len() {
        warn!(expected = allocations.len(), applied = applied.applied, "actuator applied fewer allocations than requested");
    }
    Ok(())
}

/// Races a future against the RPC timeout and the cycle's cancellation
/// token (§5): cancellation and timeout both surface as an outer
/// `Err(String)`, the inner `Result` is the request's own outcome.
async fn with_timeout_and_cancel<T>(
    timeout: Duration,
    cancel: &CancellationToken,
    fut: impl std::future::Future<Output = reqwest::Result<T>>,
) -> std::result::Result<reqwest::Result<T>, String> {
    tokio::select! {
        res = tokio::time::timeout(timeout, fut) => res.map_err(|_| "timed out".to_string()),
        _ = cancel.cancelled() => Err("cancelled".to_string()),
    }
}

/// Builds the saturation analyzer's per-variant view: current replicas,
/// per-replica cost from the chosen (or, failing that, current) accelerator,
/// and the live replica metrics the collector reported for that variant.
fn build_variant_loads(
    system: &System,
    catalogs: &config::StaticCatalogs,
    replica_metrics: &HashMap<String, Vec<ReplicaMetrics>>,
) -> Vec<VariantLoad> {
    system
        .variants()
        .values()
        .map(|variant| {
            let accel_name = variant
                .chosen
                .as_ref()
                .map(|c| c.accelerator.clone())
                .or_else(|| variant.current_accelerator.clone());
            let cost_per_hour = accel_name
                .as_ref()
                .and_then(|name| catalogs.accelerators.get(name))
                .map(|a| a.cost_per_hour * a.multiplicity as f64)
                .unwrap_or(0.0);
            VariantLoad {
                variant: variant.name.clone(),
                model: variant.model.clone(),
                current_replicas: variant.current_replicas,
                cost_per_hour,
                min_replicas: variant.effective_min_replicas(catalogs.optimizer_options.min_num_replicas),
                replicas: replica_metrics.get(&variant.name).cloned().unwrap_or_default(),
            }
        })
        .collect()
}
