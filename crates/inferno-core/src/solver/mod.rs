//! Allocation solver (component D): turns each variant's candidate set into
//! a single chosen allocation, subject to per-accelerator-type capacity.

mod backend;
mod best_effort;
mod greedy;
mod options;
mod value;

pub use backend::{GreedySolver, SolverBackend};
pub use options::{OptimizerOptions, SaturationPolicy};
pub use value::{prior_allocation, value, PriorAllocation};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::AnalyzerConfig;
    use crate::model::{
        Accelerator, AcceleratorCapacity, Model, ObservedLoad, PerfProfile, PowerCurve,
        ServiceClass, SloTarget, System, Variant,
    };
    use std::collections::HashMap;

    fn accelerator(name: &str, cost: f64) -> Accelerator {
        Accelerator {
            name: name.to_string(),
            accel_type: name.to_string(),
            memory_gb: 80.0,
            memory_bandwidth_gbps: 2000.0,
            cost_per_hour: cost,
            power: PowerCurve { idle_watts: 50.0, mid_watts: 200.0, full_watts: 400.0, mid_util: 0.5 },
            multiplicity: 1,
        }
    }

    fn profile() -> PerfProfile {
        PerfProfile { alpha: 20.0, beta: 0.72, gamma: 50.0, delta: 0.05, n_max: 4, at_tokens: 200.0 }
    }

    fn model(name: &str) -> Model {
        let mut profiles = HashMap::new();
        profiles.insert("A100".to_string(), profile());
        profiles.insert("H100".to_string(), profile());
        Model { name: name.to_string(), memory_gb: 40.0, profiles }
    }

    fn class(name: &str, priority: u32) -> ServiceClass {
        let mut targets = HashMap::new();
        targets.insert(
            "m".to_string(),
            SloTarget { itl_ms: 100.0, ttft_ms: 500.0, ttw_ms: 1000.0, tps: None, percentile: 0.95 },
        );
        ServiceClass { name: name.to_string(), priority, targets }
    }

    fn variant(name: &str, model: &str, class: &str, rate_per_min: f64) -> Variant {
        Variant {
            name: name.to_string(),
            model: model.to_string(),
            service_class: class.to_string(),
            current_replicas: 0,
            current_accelerator: None,
            load: ObservedLoad {
                arrival_rate_per_min: rate_per_min,
                avg_input_tokens: 50.0,
                avg_output_tokens: 200.0,
                cov_arrival: 1.0,
                cov_service: 1.0,
            },
            min_replicas: None,
            batch_override: None,
            candidates: HashMap::new(),
            chosen: None,
        }
    }

    #[test]
    fn unlimited_mode_allocates_every_variant() {
        let mut system = System::new(
            HashMap::from([("A100".to_string(), accelerator("A100", 1.0))]),
            HashMap::from([("m".to_string(), model("m"))]),
            HashMap::from([("gold".to_string(), class("gold", 0))]),
            HashMap::from([("v1".to_string(), variant("v1", "m", "gold", 10.0))]),
            AcceleratorCapacity::new([], true),
        );
        system.calculate(&AnalyzerConfig::default()).unwrap();
        let solver = GreedySolver::new(OptimizerOptions { unlimited: true, ..Default::default() });
        solver.solve(&mut system).unwrap();
        assert!(system.variants()["v1"].chosen.is_some());
    }

    #[test]
    fn limited_mode_respects_capacity() {
        let mut system = System::new(
            HashMap::from([
                ("A100".to_string(), accelerator("A100", 1.0)),
                ("H100".to_string(), accelerator("H100", 2.0)),
            ]),
            HashMap::from([("m".to_string(), model("m"))]),
            HashMap::from([("gold".to_string(), class("gold", 0))]),
            HashMap::from([
                ("v1".to_string(), variant("v1", "m", "gold", 30.0)),
                ("v2".to_string(), variant("v2", "m", "gold", 30.0)),
            ]),
            AcceleratorCapacity::new([("A100".to_string(), 1), ("H100".to_string(), 1)], false),
        );
        system.calculate(&AnalyzerConfig::default()).unwrap();
        let solver = GreedySolver::new(OptimizerOptions {
            saturation_policy: SaturationPolicy::PriorityExhaustive,
            ..Default::default()
        });
        solver.solve(&mut system).unwrap();
        let totals = system.allocate_by_type();
        assert!(*totals.get("A100").unwrap_or(&0) <= 1);
        assert!(*totals.get("H100").unwrap_or(&0) <= 1);
    }

    #[test]
    fn none_policy_leaves_losers_unallocated() {
        let mut system = System::new(
            HashMap::from([("A100".to_string(), accelerator("A100", 1.0))]),
            HashMap::from([("m".to_string(), model("m"))]),
            HashMap::from([("gold".to_string(), class("gold", 0))]),
            HashMap::from([
                ("v1".to_string(), variant("v1", "m", "gold", 30.0)),
                ("v2".to_string(), variant("v2", "m", "gold", 30.0)),
            ]),
            AcceleratorCapacity::new([("A100".to_string(), 1)], false),
        );
        system.calculate(&AnalyzerConfig::default()).unwrap();
        let solver = GreedySolver::new(OptimizerOptions {
            saturation_policy: SaturationPolicy::None,
            ..Default::default()
        });
        solver.solve(&mut system).unwrap();
        let allocated = system.variants().values().filter(|v| v.chosen.is_some()).count();
        assert_eq!(allocated, 1);
    }
}
