//! Saturation analyzer & arbitrator (component G): consumes live replica
//! metrics and arbitrates a final per-variant target against the
//! model-based optimizer's output.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Live metrics for a single replica pod.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReplicaMetrics {
    /// KV-cache utilization, in `[0, 1]`.
    pub kv_cache_usage: f64,
    /// Current request queue length.
    pub queue_length: u32,
}

/// Thresholds driving saturation detection and arbitration (§4.G).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SaturationConfig {
    /// A replica is saturated when `kv_cache_usage >= kv_cache_threshold`.
    pub kv_cache_threshold: f64,
    /// Scale-up triggers when average spare KV falls below this.
    pub kv_spare_trigger: f64,
    /// A replica is saturated when `queue_length >= queue_length_threshold`.
    pub queue_length_threshold: u32,
    /// Scale-up triggers when average spare queue headroom falls below this.
    pub queue_spare_trigger: f64,
}

impl Default for SaturationConfig {
    fn default() -> Self {
        Self {
            kv_cache_threshold: 0.9,
            kv_spare_trigger: 0.1,
            queue_length_threshold: 10,
            queue_spare_trigger: 2.0,
        }
    }
}

impl SaturationConfig {
    /// Validates the invariants from §4.G: thresholds in range and
    /// internally consistent.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.kv_cache_threshold) {
            return Err(Error::ConfigInvalid(format!(
                "kv_cache_threshold must be in [0,1], got {}",
                self.kv_cache_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.kv_spare_trigger) {
            return Err(Error::ConfigInvalid(format!(
                "kv_spare_trigger must be in [0,1], got {}",
                self.kv_spare_trigger
            )));
        }
        if self.kv_cache_threshold < self.kv_spare_trigger {
            return Err(Error::ConfigInvalid(
                "kv_cache_threshold must be >= kv_spare_trigger".to_string(),
            ));
        }
        if self.queue_spare_trigger < 0.0 {
            return Err(Error::ConfigInvalid(
                "queue_spare_trigger must be >= 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a single replica counts as saturated.
    pub fn is_saturated(&self, metrics: &ReplicaMetrics) -> bool {
        metrics.kv_cache_usage >= self.kv_cache_threshold
            || metrics.queue_length >= self.queue_length_threshold
    }

    fn spare_kv(&self, metrics: &ReplicaMetrics) -> f64 {
        1.0 - metrics.kv_cache_usage
    }

    fn spare_queue(&self, metrics: &ReplicaMetrics) -> f64 {
        (self.queue_length_threshold as f64 - metrics.queue_length as f64).max(0.0)
    }
}

/// One inference-server variant's standing for arbitration purposes: its
/// model, per-replica cost, current/prior-desired replica counts, and the
/// live metrics for its own replica pods.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariantLoad {
    pub variant: String,
    pub model: String,
    pub current_replicas: u32,
    pub cost_per_hour: f64,
    pub min_replicas: u32,
    pub replicas: Vec<ReplicaMetrics>,
}

/// Per-model aggregate computed across every replica of every variant
/// bound to that model (§4.G step 2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelAggregate {
    pub non_saturated_count: usize,
    pub avg_spare_kv: f64,
    pub avg_spare_queue: f64,
}

fn aggregate(config: &SaturationConfig, replicas: &[&ReplicaMetrics]) -> ModelAggregate {
    if replicas.is_empty() {
        return ModelAggregate { non_saturated_count: 0, avg_spare_kv: 1.0, avg_spare_queue: f64::INFINITY };
    }
    let n = replicas.len() as f64;
    let non_saturated_count = replicas.iter().filter(|r| !config.is_saturated(r)).count();
    let avg_spare_kv = replicas.iter().map(|r| config.spare_kv(r)).sum::<f64>() / n;
    let avg_spare_queue = replicas.iter().map(|r| config.spare_queue(r)).sum::<f64>() / n;
    ModelAggregate { non_saturated_count, avg_spare_kv, avg_spare_queue }
}

fn should_scale_up(config: &SaturationConfig, agg: &ModelAggregate) -> bool {
    agg.avg_spare_kv < config.kv_spare_trigger
        || agg.avg_spare_queue < config.queue_spare_trigger
        || agg.non_saturated_count == 0
}

/// Simulated scale-down safety (§4.G step 4): spreads the removed replica's
/// load evenly across the rest and checks no remaining replica crosses a
/// saturation threshold.
fn scale_down_safe(config: &SaturationConfig, replicas: &[&ReplicaMetrics], removed: &ReplicaMetrics) -> bool {
    let remaining: Vec<&&ReplicaMetrics> = replicas.iter().filter(|r| !std::ptr::eq(**r, removed)).collect();
    if remaining.is_empty() {
        return false;
    }
    let n = remaining.len() as f64;
    remaining.iter().all(|r| {
        let kv = r.kv_cache_usage + removed.kv_cache_usage / n;
        let queue = r.queue_length as f64 + removed.queue_length as f64 / n;
        kv < config.kv_cache_threshold && queue < config.queue_length_threshold as f64
    })
}

/// Final arbitration outcome for one variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ArbitrationResult {
    pub target_replicas: u32,
    /// Saturation vetoed a model-based scale-down: either live metrics want
    /// to scale up while the model wants down (rule 2), or both want down
    /// but the simulated removal was not `ScaleDownSafe` (rule 4).
    pub safety_override: bool,
    /// No model-based target was available; saturation alone decided.
    pub capacity_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
    Hold,
    /// Saturation wanted to remove a replica from this variant but the
    /// simulated removal (§4.G step 4) was not `ScaleDownSafe`. Distinct from
    /// `Hold` so a model-based scale-down is held at current rather than
    /// applied when the two disagree this way (rule 4).
    DownUnsafe,
}

fn direction(current: u32, target: u32) -> Direction {
    match target.cmp(&current) {
        std::cmp::Ordering::Greater => Direction::Up,
        std::cmp::Ordering::Less => Direction::Down,
        std::cmp::Ordering::Equal => Direction::Hold,
    }
}

/// Arbitrates every variant's final target replica count between the
/// model-based optimizer (`model_targets`, keyed by variant name — absent
/// entries run `CapacityOnly`) and live saturation pressure.
///
/// `prior_desired` holds an in-flight optimizer decision to preserve for
/// variants this round doesn't touch (§4.G step 5).
pub fn arbitrate(
    variants: &[VariantLoad],
    model_targets: &HashMap<String, u32>,
    prior_desired: &HashMap<String, u32>,
    config: &SaturationConfig,
) -> Result<HashMap<String, ArbitrationResult>> {
    config.validate()?;

    let mut by_model: HashMap<&str, Vec<&VariantLoad>> = HashMap::new();
    for v in variants {
        by_model.entry(v.model.as_str()).or_default().push(v);
    }

    let mut results = HashMap::new();

    for (_, members) in by_model {
        let pool: Vec<&ReplicaMetrics> = members.iter().flat_map(|v| v.replicas.iter()).collect();
        let agg = aggregate(config, &pool);
        let scale_up = should_scale_up(config, &agg);

        let up_target = members
            .iter()
            .min_by(|a, b| a.cost_per_hour.partial_cmp(&b.cost_per_hour).unwrap())
            .map(|v| v.variant.clone());

        let down_candidate = members
            .iter()
            .filter(|v| v.replicas.iter().any(|r| config.is_saturated(r)))
            .max_by(|a, b| a.cost_per_hour.partial_cmp(&b.cost_per_hour).unwrap())
            .map(|v| v.variant.clone());

        for v in &members {
            let preserved = prior_desired
                .get(&v.variant)
                .copied()
                .filter(|&d| d != v.current_replicas)
                .unwrap_or(v.current_replicas);

            let (capacity_target, capacity_dir) = if scale_up && up_target.as_deref() == Some(v.variant.as_str()) {
                (v.current_replicas + 1, Direction::Up)
            } else if !scale_up && down_candidate.as_deref() == Some(v.variant.as_str()) {
                let most_spare = v
                    .replicas
                    .iter()
                    .max_by(|a, b| config.spare_kv(a).partial_cmp(&config.spare_kv(b)).unwrap())
                    .copied()
                    .unwrap_or(ReplicaMetrics { kv_cache_usage: 0.0, queue_length: 0 });
                if scale_down_safe(config, &pool, &most_spare) {
                    (v.current_replicas.saturating_sub(1).max(v.min_replicas), Direction::Down)
                } else {
                    (preserved, Direction::DownUnsafe)
                }
            } else {
                (preserved, Direction::Hold)
            };

            let result = match model_targets.get(&v.variant) {
                None => ArbitrationResult { target_replicas: capacity_target, safety_override: false, capacity_only: true },
                Some(&model_target) => {
                    let model_dir = direction(v.current_replicas, model_target);
                    let (target, safety_override) = match (model_dir, capacity_dir) {
                        (Direction::Up, Direction::Up) => (model_target.max(capacity_target), false),
                        (Direction::Down, Direction::Up) => (v.current_replicas, true),
                        (Direction::Down, Direction::DownUnsafe) => (v.current_replicas, true),
                        (Direction::Down, Direction::Down) => (model_target, false),
                        (Direction::Up, _) => (model_target, false),
                        (Direction::Hold, Direction::Up) => (capacity_target, false),
                        (Direction::Hold, _) => (model_target, false),
                        _ => (model_target, false),
                    };
                    ArbitrationResult { target_replicas: target.max(v.min_replicas), safety_override, capacity_only: false }
                }
            };
            results.insert(v.variant.clone(), ArbitrationResult {
                target_replicas: result.target_replicas.max(v.min_replicas),
                ..result
            });
        }
    }

    Ok(results)
}
