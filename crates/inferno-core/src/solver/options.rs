use serde::{Deserialize, Serialize};

/// Policy governing the best-effort pass over variants the primary greedy
/// pass couldn't place (§4.D).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub enum SaturationPolicy {
    /// Leave unallocated variants unallocated.
    #[default]
    None,
    /// Within each priority band (lowest number first), repeatedly fit the
    /// cheapest remaining candidate until no more fit, then advance.
    PriorityExhaustive,
    /// Within each priority band, ticketed round-robin: one accelerator
    /// instance per variant per round, via its cheapest viable candidate.
    PriorityRoundRobin,
    /// Same as `PriorityRoundRobin` but ignoring priority bands.
    RoundRobin,
}

/// Knobs for the greedy solver (§4.D, §9).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OptimizerOptions {
    /// Treat accelerator capacity as infinite; each variant independently
    /// picks its minimum-value candidate.
    pub unlimited: bool,
    /// Best-effort policy applied to variants the primary pass couldn't
    /// place.
    pub saturation_policy: SaturationPolicy,
    /// Wire-format flag from the source config schema. The primary greedy
    /// pass always runs to completion as one regret-ordered set before any
    /// best-effort attempt, so there is no longer a choice of "band-by-band"
    /// interleaving for this crate to honor; kept only so existing
    /// `Unlimited`/options documents round-trip.
    pub delayed_best_effort: bool,
    /// Priority weight factor `w` in the regret key
    /// `delta * (1 + w / (1 + priority))`.
    pub priority_weight_factor: f64,
    /// Transition-penalty factor `kappa` for cross-accelerator moves.
    pub accel_penalty_factor: f64,
    /// Default SLO percentile assumed when a service class target doesn't
    /// specify one explicitly.
    pub slo_percentile: f64,
    /// System-wide minimum replica floor (`MIN_NUM_REPLICAS`); `0` opts
    /// into the alpha scale-to-zero behavior.
    pub min_num_replicas: u32,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self {
            unlimited: false,
            saturation_policy: SaturationPolicy::None,
            delayed_best_effort: true,
            priority_weight_factor: 1.0,
            accel_penalty_factor: 0.1,
            slo_percentile: 0.95,
            min_num_replicas: 1,
        }
    }
}
