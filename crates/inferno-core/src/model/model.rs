use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A model's identity, memory footprint, and per-accelerator performance
/// profiles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Model {
    /// Unique model name.
    pub name: String,
    /// Memory footprint in GB.
    pub memory_gb: f64,
    /// Performance profile per accelerator name this model may run on.
    pub profiles: HashMap<String, PerfProfile>,
}

/// Decode/prefill performance coefficients for one (model, accelerator) pair.
///
/// `ITL = alpha + beta * batch` (ms/token during decode).
/// `TTFT = gamma + delta * tokens * batch` (ms).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PerfProfile {
    /// Decode intercept (ms/token).
    pub alpha: f64,
    /// Decode slope per unit batch (ms/token per batch unit).
    pub beta: f64,
    /// Prefill intercept (ms).
    pub gamma: f64,
    /// Prefill slope per (token * batch) unit (ms).
    pub delta: f64,
    /// Maximum batch size this profile was measured up to.
    pub n_max: u32,
    /// Token count at which `n_max` was measured.
    pub at_tokens: f64,
}

impl PerfProfile {
    /// Validates `alpha, beta, gamma, delta >= 0` and `n_max >= 1`.
    pub fn validate(&self, model: &str, accelerator: &str) -> Result<()> {
        let non_negative = [
            ("alpha", self.alpha),
            ("beta", self.beta),
            ("gamma", self.gamma),
            ("delta", self.delta),
        ];
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(Error::ConfigInvalid(format!(
                    "model {model:?} accelerator {accelerator:?}: {field} must be >= 0, got {value}"
                )));
            }
        }
        if self.n_max < 1 {
            return Err(Error::ConfigInvalid(format!(
                "model {model:?} accelerator {accelerator:?}: n_max must be >= 1"
            )));
        }
        Ok(())
    }

    /// Decode inter-token latency (ms/token) at a given batch size.
    pub fn itl_ms(&self, batch: f64) -> f64 {
        self.alpha + self.beta * batch
    }

    /// Prefill time-to-first-token (ms) for `tokens` prompt tokens served at
    /// `batch` concurrency.
    pub fn ttft_ms(&self, tokens: f64, batch: f64) -> f64 {
        self.gamma + self.delta * tokens * batch
    }
}

impl Model {
    /// Validates every profile attached to this model.
    pub fn validate(&self) -> Result<()> {
        for (accelerator, profile) in &self.profiles {
            profile.validate(&self.name, accelerator)?;
        }
        Ok(())
    }
}
