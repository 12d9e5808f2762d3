use super::{Accelerator, AcceleratorCapacity, CandidateAllocation, Model, ServiceClass, Variant};
use crate::analyzer::{self, AnalyzerConfig};
use crate::error::{Error, Result};
use std::collections::HashMap;

/// The system catalog (component C): accelerators, models, service classes,
/// variants and per-type capacity. Owns every entity except the live
/// per-cycle collector/actuator RPC payloads.
#[derive(Debug, Clone, Default)]
pub struct System {
    accelerators: HashMap<String, Accelerator>,
    models: HashMap<String, Model>,
    classes: HashMap<String, ServiceClass>,
    variants: HashMap<String, Variant>,
    capacity: AcceleratorCapacity,
}

impl System {
    /// Builds a system from already-validated catalogs.
    pub fn new(
        accelerators: HashMap<String, Accelerator>,
        models: HashMap<String, Model>,
        classes: HashMap<String, ServiceClass>,
        variants: HashMap<String, Variant>,
        capacity: AcceleratorCapacity,
    ) -> Self {
        Self {
            accelerators,
            models,
            classes,
            variants,
            capacity,
        }
    }

    /// Read-only accelerator catalog.
    pub fn accelerators(&self) -> &HashMap<String, Accelerator> {
        &self.accelerators
    }

    /// Read-only model catalog.
    pub fn models(&self) -> &HashMap<String, Model> {
        &self.models
    }

    /// Read-only service class catalog.
    pub fn classes(&self) -> &HashMap<String, ServiceClass> {
        &self.classes
    }

    /// Read-only variant map.
    pub fn variants(&self) -> &HashMap<String, Variant> {
        &self.variants
    }

    /// Mutable variant map, used by the solver to record chosen allocations.
    pub fn variants_mut(&mut self) -> &mut HashMap<String, Variant> {
        &mut self.variants
    }

    /// Read-only capacity map.
    pub fn capacity(&self) -> &AcceleratorCapacity {
        &self.capacity
    }

    /// Mutable capacity map; mutated only inside a solver invocation.
    pub fn capacity_mut(&mut self) -> &mut AcceleratorCapacity {
        &mut self.capacity
    }

    /// Recomputes every variant's candidate set (component B via E).
    /// Afterward, every variant has a (possibly empty) candidate map keyed
    /// by accelerator name; an absent key means that accelerator is
    /// infeasible for that variant.
    pub fn calculate(&mut self, config: &AnalyzerConfig) -> Result<()> {
        let models = self.models.clone();
        let classes = self.classes.clone();
        let accelerators = self.accelerators.clone();

        for variant in self.variants.values_mut() {
            let model = models.get(&variant.model).ok_or_else(|| {
                Error::ConfigInvalid(format!(
                    "variant {:?} references unknown model {:?}",
                    variant.name, variant.model
                ))
            })?;
            let class = classes.get(&variant.service_class).ok_or_else(|| {
                Error::ConfigInvalid(format!(
                    "variant {:?} references unknown service class {:?}",
                    variant.name, variant.service_class
                ))
            })?;
            variant.candidates =
                analyzer::candidates_for(variant, model, class, &accelerators, config);
        }
        Ok(())
    }

    /// Serializes the chosen allocation per variant.
    pub fn generate_solution(&self) -> HashMap<String, CandidateAllocation> {
        self.variants
            .iter()
            .filter_map(|(name, variant)| variant.chosen.clone().map(|c| (name.clone(), c)))
            .collect()
    }

    /// Sums consumed accelerator units by type, across every variant's
    /// chosen allocation (`replicas * multiplicity`).
    pub fn allocate_by_type(&self) -> HashMap<String, u64> {
        let mut totals: HashMap<String, u64> = HashMap::new();
        for variant in self.variants.values() {
            let Some(chosen) = &variant.chosen else {
                continue;
            };
            let Some(accelerator) = self.accelerators.get(&chosen.accelerator) else {
                continue;
            };
            let units = chosen.replicas as u64 * accelerator.multiplicity as u64;
            *totals.entry(accelerator.accel_type.clone()).or_insert(0) += units;
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ObservedLoad, PerfProfile, PowerCurve, SloTarget};

    fn build_system() -> System {
        let accelerator = Accelerator {
            name: "A100".to_string(),
            accel_type: "A100".to_string(),
            memory_gb: 80.0,
            memory_bandwidth_gbps: 2000.0,
            cost_per_hour: 1.0,
            power: PowerCurve {
                idle_watts: 50.0,
                mid_watts: 200.0,
                full_watts: 400.0,
                mid_util: 0.5,
            },
            multiplicity: 1,
        };
        let mut profiles = HashMap::new();
        profiles.insert(
            "A100".to_string(),
            PerfProfile {
                alpha: 20.0,
                beta: 0.72,
                gamma: 50.0,
                delta: 0.05,
                n_max: 4,
                at_tokens: 200.0,
            },
        );
        let model = Model {
            name: "llama".to_string(),
            memory_gb: 40.0,
            profiles,
        };
        let mut targets = HashMap::new();
        targets.insert(
            "llama".to_string(),
            SloTarget {
                itl_ms: 100.0,
                ttft_ms: 500.0,
                ttw_ms: 1000.0,
                tps: None,
                percentile: 0.95,
            },
        );
        let class = ServiceClass {
            name: "gold".to_string(),
            priority: 0,
            targets,
        };
        let variant = Variant {
            name: "v1".to_string(),
            model: "llama".to_string(),
            service_class: "gold".to_string(),
            current_replicas: 1,
            current_accelerator: Some("A100".to_string()),
            load: ObservedLoad {
                arrival_rate_per_min: 0.0,
                avg_input_tokens: 50.0,
                avg_output_tokens: 200.0,
                cov_arrival: 1.0,
                cov_service: 1.0,
            },
            min_replicas: Some(1),
            batch_override: None,
            candidates: HashMap::new(),
            chosen: None,
        };
        System::new(
            HashMap::from([("A100".to_string(), accelerator)]),
            HashMap::from([("llama".to_string(), model)]),
            HashMap::from([("gold".to_string(), class)]),
            HashMap::from([("v1".to_string(), variant)]),
            AcceleratorCapacity::new([("A100".to_string(), 4)], false),
        )
    }

    #[test]
    fn calculate_populates_candidates() {
        let mut system = build_system();
        system.calculate(&AnalyzerConfig::default()).unwrap();
        let variant = &system.variants()["v1"];
        assert!(variant.candidates.contains_key("A100"));
    }

    #[test]
    fn allocate_by_type_sums_chosen_allocations() {
        let mut system = build_system();
        system.calculate(&AnalyzerConfig::default()).unwrap();
        let candidate = system.variants()["v1"].candidates["A100"].clone();
        system.variants_mut().get_mut("v1").unwrap().chosen = Some(candidate);
        let totals = system.allocate_by_type();
        assert_eq!(totals.get("A100"), Some(&1));
    }
}
