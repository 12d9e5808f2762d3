use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A service class: a priority band with per-model SLO targets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceClass {
    /// Unique class name.
    pub name: String,
    /// Priority; lower number means higher priority.
    pub priority: u32,
    /// SLO targets keyed by model name. Invariant: at most one target per
    /// (class, model) pair, enforced by the map itself.
    pub targets: HashMap<String, SloTarget>,
}

/// SLO targets for one (service class, model) pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SloTarget {
    /// Inter-token latency ceiling, ms/token.
    pub itl_ms: f64,
    /// Time-to-first-token ceiling, ms.
    pub ttft_ms: f64,
    /// Request waiting-time ceiling, ms.
    pub ttw_ms: f64,
    /// Optional throughput floor, requests/sec.
    pub tps: Option<f64>,
    /// Percentile the wait-time ceiling is meant to bound, default `0.95`.
    #[serde(default = "default_percentile")]
    pub percentile: f64,
}

fn default_percentile() -> f64 {
    0.95
}

impl ServiceClass {
    /// Looks up the SLO target for a model, if any.
    pub fn target_for(&self, model: &str) -> Option<&SloTarget> {
        self.targets.get(model)
    }

    /// No structural invariant beyond what the `HashMap` already enforces
    /// (one target per model); kept for symmetry with the other catalog
    /// entities' `validate()`.
    pub fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl SloTarget {
    /// The SLO margin `M = -ln(1 - p)` that converts the wait-time
    /// percentile into a mean-based bound for the exponential-wait
    /// approximation (§4.B step 4, GLOSSARY).
    pub fn margin(&self) -> f64 {
        -(1.0 - self.percentile).ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_of_default_percentile_is_about_three() {
        let target = SloTarget {
            itl_ms: 100.0,
            ttft_ms: 500.0,
            ttw_ms: 1000.0,
            tps: None,
            percentile: 0.95,
        };
        assert!((target.margin() - 2.9957).abs() < 1e-3);
    }
}
