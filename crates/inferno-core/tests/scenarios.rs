//! End-to-end scenarios against literal inputs, one per numbered case.

use inferno_core::analyzer::AnalyzerConfig;
use inferno_core::model::{
    Accelerator, AcceleratorCapacity, CandidateAllocation, Model, ObservedLoad, PerfProfile,
    PowerCurve, ServiceClass, SloTarget, System, Variant,
};
use inferno_core::saturation::{arbitrate, ReplicaMetrics, SaturationConfig, VariantLoad};
use inferno_core::solver::{GreedySolver, OptimizerOptions, SolverBackend};
use std::collections::HashMap;

fn flat_power() -> PowerCurve {
    PowerCurve { idle_watts: 50.0, mid_watts: 200.0, full_watts: 400.0, mid_util: 0.5 }
}

fn accelerator(name: &str, cost: f64) -> Accelerator {
    Accelerator {
        name: name.to_string(),
        accel_type: name.to_string(),
        memory_gb: 80.0,
        memory_bandwidth_gbps: 2000.0,
        cost_per_hour: cost,
        power: flat_power(),
        multiplicity: 1,
    }
}

fn candidate(accelerator: &str, replicas: u32, cost: f64) -> CandidateAllocation {
    CandidateAllocation {
        accelerator: accelerator.to_string(),
        replicas,
        effective_max_batch: 4,
        cost,
        value: cost,
        expected_itl_ms: 20.0,
        expected_ttft_ms: 50.0,
        expected_wait_ms: 1.0,
        rho: 0.5,
        max_sustainable_rate_per_ms: 1.0,
    }
}

/// Scenario 1: single variant, unlimited capacity, zero load.
#[test]
fn scenario_1_single_variant_unlimited_zero_load() {
    let mut profiles = HashMap::new();
    profiles.insert("A100".to_string(), PerfProfile { alpha: 20.0, beta: 0.72, gamma: 50.0, delta: 0.05, n_max: 4, at_tokens: 200.0 });
    let model = Model { name: "m".to_string(), memory_gb: 10.0, profiles };
    let mut targets = HashMap::new();
    targets.insert("m".to_string(), SloTarget { itl_ms: 100.0, ttft_ms: 500.0, ttw_ms: 1000.0, tps: None, percentile: 0.95 });
    let class = ServiceClass { name: "gold".to_string(), priority: 0, targets };
    let variant = Variant {
        name: "v".to_string(),
        model: "m".to_string(),
        service_class: "gold".to_string(),
        current_replicas: 0,
        current_accelerator: None,
        load: ObservedLoad { arrival_rate_per_min: 0.0, avg_input_tokens: 50.0, avg_output_tokens: 200.0, cov_arrival: 1.0, cov_service: 1.0 },
        min_replicas: Some(1),
        batch_override: None,
        candidates: HashMap::new(),
        chosen: None,
    };
    let mut system = System::new(
        HashMap::from([("A100".to_string(), accelerator("A100", 1.0))]),
        HashMap::from([("m".to_string(), model)]),
        HashMap::from([("gold".to_string(), class)]),
        HashMap::from([("v".to_string(), variant)]),
        AcceleratorCapacity::new([], true),
    );
    system.calculate(&AnalyzerConfig::default()).unwrap();
    let solver = GreedySolver::new(OptimizerOptions { unlimited: true, ..Default::default() });
    solver.solve(&mut system).unwrap();
    let chosen = system.variants()["v"].chosen.as_ref().unwrap();
    assert_eq!(chosen.accelerator, "A100");
    assert_eq!(chosen.replicas, 1);
    assert_eq!(chosen.cost, 1.0);
}

/// Scenario 2: single variant at 120 req/min against a real performance profile.
#[test]
fn scenario_2_loaded_variant_meets_itl_slo() {
    let mut profiles = HashMap::new();
    profiles.insert("A100".to_string(), PerfProfile { alpha: 20.0, beta: 0.72, gamma: 50.0, delta: 0.05, n_max: 4, at_tokens: 200.0 });
    let model = Model { name: "m".to_string(), memory_gb: 10.0, profiles };
    let mut targets = HashMap::new();
    targets.insert("m".to_string(), SloTarget { itl_ms: 100.0, ttft_ms: 500.0, ttw_ms: 1000.0, tps: None, percentile: 0.95 });
    let class = ServiceClass { name: "gold".to_string(), priority: 0, targets };
    let variant = Variant {
        name: "v".to_string(),
        model: "m".to_string(),
        service_class: "gold".to_string(),
        current_replicas: 0,
        current_accelerator: None,
        load: ObservedLoad { arrival_rate_per_min: 120.0, avg_input_tokens: 50.0, avg_output_tokens: 200.0, cov_arrival: 1.0, cov_service: 1.0 },
        min_replicas: Some(1),
        batch_override: None,
        candidates: HashMap::new(),
        chosen: None,
    };
    let mut system = System::new(
        HashMap::from([("A100".to_string(), accelerator("A100", 1.0))]),
        HashMap::from([("m".to_string(), model)]),
        HashMap::from([("gold".to_string(), class)]),
        HashMap::from([("v".to_string(), variant)]),
        AcceleratorCapacity::new([], true),
    );
    system.calculate(&AnalyzerConfig::default()).unwrap();
    let solver = GreedySolver::new(OptimizerOptions { unlimited: true, ..Default::default() });
    solver.solve(&mut system).unwrap();
    let chosen = system.variants()["v"].chosen.as_ref().unwrap();
    assert!(chosen.replicas >= 1);
    assert!(chosen.expected_itl_ms <= 100.0);
}

/// Scenario 3: two variants both preferring A100, one shared A100 slot and
/// one shared H100 slot. The larger regret (v2's 10-to-25 gap) should win
/// the A100 slot, leaving v1 on H100 for a total cost of 30, not 35.
#[test]
fn scenario_3_regret_ordering_picks_cheaper_total() {
    let mut system = bare_system_with_candidates(&[
        ("v1", 0, &[("A100", candidate("A100", 1, 10.0)), ("H100", candidate("H100", 1, 20.0))]),
        ("v2", 0, &[("A100", candidate("A100", 1, 10.0)), ("H100", candidate("H100", 1, 25.0))]),
    ], &[("A100", 1), ("H100", 1)]);

    let solver = GreedySolver::new(OptimizerOptions::default());
    solver.solve(&mut system).unwrap();

    let v1 = system.variants()["v1"].chosen.as_ref().unwrap();
    let v2 = system.variants()["v2"].chosen.as_ref().unwrap();
    assert_eq!(v2.accelerator, "A100");
    assert_eq!(v1.accelerator, "H100");
    assert_eq!(v1.cost + v2.cost, 30.0);
}

/// Scenario 4: priority override for the last A100 slot.
#[test]
fn scenario_4_priority_override_wins_last_slot() {
    let mut system = bare_system_with_candidates(&[
        ("p1", 0, &[("A100", candidate("A100", 1, 10.0)), ("H100", candidate("H100", 1, 30.0))]),
        ("p2", 2, &[("A100", candidate("A100", 1, 10.0)), ("H100", candidate("H100", 1, 11.0))]),
    ], &[("A100", 1), ("H100", 1)]);

    let solver = GreedySolver::new(OptimizerOptions { priority_weight_factor: 1.0, ..Default::default() });
    solver.solve(&mut system).unwrap();

    let p1 = system.variants()["p1"].chosen.as_ref().unwrap();
    assert_eq!(p1.accelerator, "A100");
}

/// With the priority weight factor zeroed out, regret alone should decide
/// who gets the scarce accelerator first, regardless of which variant has
/// the higher-priority service class: a single global regret ordering, not
/// priority bands processed in a fixed priority-number order.
#[test]
fn scenario_7_zero_weight_lets_larger_regret_win_across_priorities() {
    let mut system = bare_system_with_candidates(
        &[
            ("hipri_small_delta", 0, &[("A100", candidate("A100", 1, 10.0)), ("H100", candidate("H100", 1, 11.0))]),
            ("lopri_large_delta", 3, &[("A100", candidate("A100", 1, 10.0)), ("H100", candidate("H100", 1, 1000.0))]),
        ],
        &[("A100", 1), ("H100", 1)],
    );

    let solver = GreedySolver::new(OptimizerOptions { priority_weight_factor: 0.0, ..Default::default() });
    solver.solve(&mut system).unwrap();

    let hipri = system.variants()["hipri_small_delta"].chosen.as_ref().unwrap();
    let lopri = system.variants()["lopri_large_delta"].chosen.as_ref().unwrap();
    assert_eq!(lopri.accelerator, "A100", "larger regret should claim the scarce accelerator first");
    assert_eq!(hipri.accelerator, "H100");
}

/// Scenario 5: live metrics veto a model-based scale-down.
#[test]
fn scenario_5_saturation_vetoes_scale_down() {
    let variants = vec![VariantLoad {
        variant: "v".to_string(),
        model: "m".to_string(),
        current_replicas: 3,
        cost_per_hour: 1.0,
        min_replicas: 1,
        replicas: vec![
            ReplicaMetrics { kv_cache_usage: 0.98, queue_length: 0 },
            ReplicaMetrics { kv_cache_usage: 0.98, queue_length: 0 },
            ReplicaMetrics { kv_cache_usage: 0.98, queue_length: 0 },
        ],
    }];
    let mut model_targets = HashMap::new();
    model_targets.insert("v".to_string(), 2);
    let config = SaturationConfig {
        kv_cache_threshold: 0.95,
        kv_spare_trigger: 0.10,
        queue_length_threshold: 10,
        queue_spare_trigger: 2.0,
    };
    let result = arbitrate(&variants, &model_targets, &HashMap::new(), &config).unwrap();
    let r = &result["v"];
    assert_eq!(r.target_replicas, 3);
    assert!(r.safety_override);
}

/// Scenario 6: model-based analysis absent, live KV pressure on every
/// replica scales up the cheapest variant under `CapacityOnly`.
#[test]
fn scenario_6_capacity_only_scales_up_cheapest() {
    let variants = vec![
        VariantLoad {
            variant: "cheap".to_string(),
            model: "m".to_string(),
            current_replicas: 1,
            cost_per_hour: 1.0,
            min_replicas: 1,
            replicas: vec![ReplicaMetrics { kv_cache_usage: 0.9, queue_length: 0 }],
        },
        VariantLoad {
            variant: "pricey".to_string(),
            model: "m".to_string(),
            current_replicas: 1,
            cost_per_hour: 4.0,
            min_replicas: 1,
            replicas: vec![ReplicaMetrics { kv_cache_usage: 0.9, queue_length: 0 }],
        },
    ];
    let config = SaturationConfig {
        kv_cache_threshold: 0.9,
        kv_spare_trigger: 0.10,
        queue_length_threshold: 10,
        queue_spare_trigger: 2.0,
    };
    let result = arbitrate(&variants, &HashMap::new(), &HashMap::new(), &config).unwrap();
    assert_eq!(result["cheap"].target_replicas, 2);
    assert!(result["cheap"].capacity_only);
    assert_eq!(result["pricey"].target_replicas, 1);
}

/// Builds a `System` with pre-populated candidate sets (bypassing
/// `calculate()`) so solver scenarios can use the spec's literal costs
/// instead of deriving them from a performance profile.
type VariantFixture<'a> = (&'a str, u32, &'a [(&'a str, CandidateAllocation)]);

fn bare_system_with_candidates(variants: &[VariantFixture], capacity: &[(&str, u64)]) -> System {
    let mut accelerators = HashMap::new();
    for (_, _, candidates) in variants {
        for (accel_name, _) in *candidates {
            accelerators.entry(accel_name.to_string()).or_insert_with(|| accelerator(accel_name, 0.0));
        }
    }
    let mut classes = HashMap::new();
    let mut variant_map = HashMap::new();
    for (name, priority, candidates) in variants {
        let class_name = format!("class-{priority}");
        classes.entry(class_name.clone()).or_insert_with(|| ServiceClass {
            name: class_name.clone(),
            priority: *priority,
            targets: HashMap::new(),
        });
        let mut cmap = HashMap::new();
        for (accel_name, candidate) in *candidates {
            cmap.insert(accel_name.to_string(), candidate.clone());
        }
        variant_map.insert(
            name.to_string(),
            Variant {
                name: name.to_string(),
                model: "m".to_string(),
                service_class: class_name,
                current_replicas: 0,
                current_accelerator: None,
                load: ObservedLoad { arrival_rate_per_min: 60.0, avg_input_tokens: 50.0, avg_output_tokens: 200.0, cov_arrival: 1.0, cov_service: 1.0 },
                min_replicas: Some(1),
                batch_override: None,
                candidates: cmap,
                chosen: None,
            },
        );
    }
    let capacity = AcceleratorCapacity::new(capacity.iter().map(|(t, c)| (t.to_string(), *c)), false);
    System::new(accelerators, HashMap::new(), classes, variant_map, capacity)
}
