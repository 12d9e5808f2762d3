//! Configuration-document DTOs (§6): the JSON/YAML shapes accepted for the
//! five catalog documents, kept separate from the domain model so the
//! domain types carry no wire-format concerns beyond plain `serde` derives.
//! This module defines shapes only; reading bytes off disk is a binary
//! crate's job; `serde_json`/`serde_yaml` deserialize into the same structs
//! either way.

use crate::error::{Error, Result};
use crate::model::{Accelerator, AcceleratorCapacity, Model, ServiceClass, Variant};
use crate::solver::{OptimizerOptions, SaturationPolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Accelerator catalog document: specs plus per-type capacity counts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AcceleratorCatalogDoc {
    pub accelerators: Vec<Accelerator>,
    #[serde(default)]
    pub capacity: HashMap<String, u64>,
    #[serde(default)]
    pub unlimited: bool,
}

impl AcceleratorCatalogDoc {
    /// Validates every accelerator and turns the document into the catalog
    /// map plus capacity `System::new` expects.
    pub fn into_parts(self) -> Result<(HashMap<String, Accelerator>, AcceleratorCapacity)> {
        let mut map = HashMap::new();
        for accelerator in self.accelerators {
            accelerator.validate()?;
            map.insert(accelerator.name.clone(), accelerator);
        }
        Ok((map, AcceleratorCapacity::new(self.capacity, self.unlimited)))
    }
}

/// Model catalog document: one entry per model, each already carrying its
/// per-accelerator performance profiles (§3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ModelCatalogDoc {
    pub models: Vec<Model>,
}

impl ModelCatalogDoc {
    pub fn into_map(self) -> Result<HashMap<String, Model>> {
        let mut map = HashMap::new();
        for model in self.models {
            model.validate()?;
            map.insert(model.name.clone(), model);
        }
        Ok(map)
    }
}

/// Service class catalog document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ServiceClassCatalogDoc {
    pub classes: Vec<ServiceClass>,
}

impl ServiceClassCatalogDoc {
    pub fn into_map(self) -> Result<HashMap<String, ServiceClass>> {
        let mut map = HashMap::new();
        for class in self.classes {
            class.validate()?;
            map.insert(class.name.clone(), class);
        }
        Ok(map)
    }
}

/// Variant list document: the collector's view of each variant, before
/// `System::calculate()` has populated its derived candidate set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariantDoc {
    pub name: String,
    pub model: String,
    pub service_class: String,
    #[serde(default)]
    pub current_replicas: u32,
    #[serde(default)]
    pub current_accelerator: Option<String>,
    pub load: crate::model::ObservedLoad,
    #[serde(default)]
    pub min_replicas: Option<u32>,
    #[serde(default)]
    pub batch_override: Option<u32>,
}

impl From<VariantDoc> for Variant {
    fn from(doc: VariantDoc) -> Self {
        Variant {
            name: doc.name,
            model: doc.model,
            service_class: doc.service_class,
            current_replicas: doc.current_replicas,
            current_accelerator: doc.current_accelerator,
            load: doc.load,
            min_replicas: doc.min_replicas,
            batch_override: doc.batch_override,
            candidates: HashMap::new(),
            chosen: None,
        }
    }
}

/// Variant list document wrapper.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct VariantListDoc {
    pub variants: Vec<VariantDoc>,
}

impl VariantListDoc {
    pub fn into_map(self) -> Result<HashMap<String, Variant>> {
        let mut map = HashMap::new();
        for doc in self.variants {
            let name = doc.name.clone();
            if map.insert(name.clone(), Variant::from(doc)).is_some() {
                return Err(Error::ConfigInvalid(format!("duplicate variant name {name:?}")));
            }
        }
        Ok(map)
    }
}

/// Optimizer options document (§6), using the field names the original
/// system's configuration documents use rather than this crate's internal
/// snake_case field names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OptimizerOptionsDoc {
    #[serde(rename = "Unlimited")]
    pub unlimited: bool,
    #[serde(rename = "SaturationPolicy")]
    pub saturation_policy: SaturationPolicy,
    #[serde(rename = "DelayedBestEffort")]
    pub delayed_best_effort: bool,
    #[serde(rename = "PriorityWeightFactor")]
    pub priority_weight_factor: f64,
    #[serde(rename = "AccelPenaltyFactor")]
    pub accel_penalty_factor: f64,
    #[serde(rename = "SLOPercentile")]
    pub slo_percentile: f64,
    #[serde(rename = "MinNumReplicas")]
    pub min_num_replicas: u32,
}

impl Default for OptimizerOptionsDoc {
    fn default() -> Self {
        OptimizerOptions::default().into()
    }
}

impl From<OptimizerOptions> for OptimizerOptionsDoc {
    fn from(o: OptimizerOptions) -> Self {
        Self {
            unlimited: o.unlimited,
            saturation_policy: o.saturation_policy,
            delayed_best_effort: o.delayed_best_effort,
            priority_weight_factor: o.priority_weight_factor,
            accel_penalty_factor: o.accel_penalty_factor,
            slo_percentile: o.slo_percentile,
            min_num_replicas: o.min_num_replicas,
        }
    }
}

impl From<OptimizerOptionsDoc> for OptimizerOptions {
    fn from(d: OptimizerOptionsDoc) -> Self {
        Self {
            unlimited: d.unlimited,
            saturation_policy: d.saturation_policy,
            delayed_best_effort: d.delayed_best_effort,
            priority_weight_factor: d.priority_weight_factor,
            accel_penalty_factor: d.accel_penalty_factor,
            slo_percentile: d.slo_percentile,
            min_num_replicas: d.min_num_replicas,
        }
    }
}
