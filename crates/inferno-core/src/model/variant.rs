use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Observed load for a variant's current traffic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ObservedLoad {
    /// Arrival rate, requests/minute (converted to requests/ms via
    /// [`crate::units::per_min_to_per_ms`] on ingestion, see
    /// [`ObservedLoad::arrival_rate_per_ms`]).
    pub arrival_rate_per_min: f64,
    /// Average input (prompt) tokens per request.
    pub avg_input_tokens: f64,
    /// Average output tokens per request.
    pub avg_output_tokens: f64,
    /// Coefficient of variation of inter-arrival times.
    pub cov_arrival: f64,
    /// Coefficient of variation of service times.
    pub cov_service: f64,
}

impl ObservedLoad {
    /// Arrival rate in requests/ms, the unit the kernel and analyzer use.
    pub fn arrival_rate_per_ms(&self) -> f64 {
        crate::units::per_min_to_per_ms(self.arrival_rate_per_min)
    }
}

/// A single inference-server variant: a (model, service class) deployment to
/// be scaled, rebuilt each cycle from collected input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    /// Variant name (e.g. Kubernetes name/namespace joined).
    pub name: String,
    /// Bound model name.
    pub model: String,
    /// Service class name.
    pub service_class: String,
    /// Current replica count, as last actuated.
    pub current_replicas: u32,
    /// Current accelerator name, if already deployed.
    pub current_accelerator: Option<String>,
    /// Observed load for this cycle.
    pub load: ObservedLoad,
    /// Optional minimum replica floor; falls back to the system-wide
    /// `min_num_replicas` default when absent.
    pub min_replicas: Option<u32>,
    /// Optional operator override of the effective max batch size.
    pub batch_override: Option<u32>,

    /// Candidate allocations keyed by accelerator name, populated by
    /// `System::calculate()`. Absence of an accelerator key means that
    /// accelerator is infeasible for this variant.
    #[serde(default)]
    pub candidates: HashMap<String, CandidateAllocation>,
    /// The allocation chosen by the solver, if any.
    #[serde(default)]
    pub chosen: Option<CandidateAllocation>,
}

impl Variant {
    /// Effective minimum replica floor, falling back to the provided
    /// system-wide default (`OptimizerOptions::min_num_replicas`).
    pub fn effective_min_replicas(&self, system_default: u32) -> u32 {
        self.min_replicas.unwrap_or(system_default)
    }
}

/// A feasible (accelerator, replicas, batch) tuple meeting SLOs at the
/// variant's load, or a synthetic zero-load allocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateAllocation {
    /// Accelerator name this candidate runs on, resolved through the
    /// system catalog by name — never a live reference (design note:
    /// avoid Server/Allocation/Accelerator reference cycles).
    pub accelerator: String,
    /// Number of replicas this allocation requires.
    pub replicas: u32,
    /// Effective max batch size used to compute this allocation.
    pub effective_max_batch: u32,
    /// Total cost (per control period, or per hour — consistent with the
    /// accelerator's `cost_per_hour` unit).
    pub cost: f64,
    /// Value used for solver ranking (cost plus any transition penalty).
    pub value: f64,
    /// Expected inter-token latency, ms/token.
    pub expected_itl_ms: f64,
    /// Expected time-to-first-token, ms.
    pub expected_ttft_ms: f64,
    /// Expected queueing wait, ms.
    pub expected_wait_ms: f64,
    /// Server busy probability, in `[0, 1]`.
    pub rho: f64,
    /// Maximum sustainable arrival rate per replica, requests/ms (`lambda*`).
    pub max_sustainable_rate_per_ms: f64,
}

impl CandidateAllocation {
    /// Whether a replica under this allocation would be considered
    /// saturated given its current actual arrival rate and the configured
    /// saturation epsilon (§4.B: `actual lambda >= (1 - eps) * lambda*`).
    pub fn is_saturated(&self, actual_lambda_per_ms: f64, epsilon: f64) -> bool {
        actual_lambda_per_ms >= (1.0 - epsilon) * self.max_sustainable_rate_per_ms
    }
}
