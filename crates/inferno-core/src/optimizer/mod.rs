//! Optimizer engine (component F): owns a `System` and a solver backend,
//! and turns one `optimize()` call into a full candidate-refresh plus
//! solve-and-diff cycle.

use crate::analyzer::AnalyzerConfig;
use crate::error::{Error, Result};
use crate::model::{CandidateAllocation, System};
use crate::solver::SolverBackend;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::instrument;

/// A variant's allocation before and after one `optimize()` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationDiff {
    pub variant: String,
    pub prior_accelerator: Option<String>,
    pub new_accelerator: String,
    pub prior_replicas: u32,
    pub new_replicas: i64,
    pub delta_replicas: i64,
    pub delta_cost: f64,
}

/// The full result of one optimizer pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimizerResult {
    pub allocations: HashMap<String, CandidateAllocation>,
    pub diffs: Vec<AllocationDiff>,
    pub accelerator_type_usage: HashMap<String, u64>,
    pub solve_duration_ms: f64,
}

/// Runs the engine's `optimize()` pass against `system` using `backend`,
/// refreshing candidates with `analyzer_config` first (§4.F).
///
/// This is a free function rather than a struct method bound to a stored
/// backend: the backend is a trait object chosen by the caller (the
/// control loop or the standalone optimizer service), and `System` already
/// carries everything else the engine needs.
#[instrument(skip(system, backend, analyzer_config))]
pub fn optimize(
    system: &mut System,
    backend: &dyn SolverBackend,
    analyzer_config: &AnalyzerConfig,
) -> Result<OptimizerResult> {
    let prior: HashMap<String, (Option<String>, u32)> = system
        .variants()
        .values()
        .map(|v| (v.name.clone(), (v.current_accelerator.clone(), v.current_replicas)))
        .collect();
    let prior_cost: HashMap<String, f64> = system
        .variants()
        .values()
        .map(|v| {
            let cost = v
                .current_accelerator
                .as_ref()
                .and_then(|name| system.accelerators().get(name))
                .map(|a| a.cost_per_hour * v.current_replicas as f64 * a.multiplicity as f64)
                .unwrap_or(0.0);
            (v.name.clone(), cost)
        })
        .collect();

    system.calculate(analyzer_config)?;

    let started = std::time::Instant::now();
    backend.solve(system)?;
    let solve_duration_ms = duration_ms(started.elapsed());

    let allocations = system.generate_solution();
    if allocations.is_empty() && !system.variants().is_empty() {
        return Err(Error::OptimizerInfeasible);
    }

    let mut diffs = Vec::new();
    for (name, chosen) in &allocations {
        let (prior_accel, prior_replicas) = prior.get(name).cloned().unwrap_or((None, 0));
        let delta_cost = chosen.cost - prior_cost.get(name).copied().unwrap_or(0.0);
        diffs.push(AllocationDiff {
            variant: name.clone(),
            prior_accelerator: prior_accel,
            new_accelerator: chosen.accelerator.clone(),
            prior_replicas,
            new_replicas: chosen.replicas as i64,
            delta_replicas: chosen.replicas as i64 - prior_replicas as i64,
            delta_cost,
        });
    }

    let accelerator_type_usage = system.allocate_by_type();

    Ok(OptimizerResult {
        allocations,
        diffs,
        accelerator_type_usage,
        solve_duration_ms,
    })
}

fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
