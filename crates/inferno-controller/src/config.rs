//! Static configuration loading (§6, §4.H step 1-2): the catalogs and
//! option documents a control loop either reads once at startup, or
//! reloads every cycle in dynamic mode. Accelerator *capacity* is reloaded
//! every cycle regardless of dynamic mode (§4.H step 2), since it tracks
//! live fleet headroom rather than a slowly-changing catalog.

use crate::error::{Error, Result};
use inferno_core::config::{AcceleratorCatalogDoc, ModelCatalogDoc, OptimizerOptionsDoc, ServiceClassCatalogDoc};
use inferno_core::model::{Accelerator, AcceleratorCapacity, Model, ServiceClass};
use inferno_core::saturation::SaturationConfig;
use inferno_core::solver::OptimizerOptions;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Everything loaded from `data_path` except live capacity counts.
#[derive(Debug, Clone)]
pub struct StaticCatalogs {
    pub accelerators: HashMap<String, Accelerator>,
    pub models: HashMap<String, Model>,
    pub classes: HashMap<String, ServiceClass>,
    pub optimizer_options: OptimizerOptions,
    pub saturation_config: SaturationConfig,
}

/// Capacity document: `{type -> count}` plus an unlimited escape hatch,
/// reloaded every cycle (§4.H step 2).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CapacityDoc {
    #[serde(default)]
    pub capacity: HashMap<String, u64>,
    #[serde(default)]
    pub unlimited: bool,
}

/// Reads the accelerator/model/class catalogs, optimizer options and
/// saturation thresholds from `dir`. A missing accelerator, model or class
/// document is an empty catalog, not an error, mirroring the collector's
/// "absent data is empty, not a failure" stance; optimizer options and
/// saturation thresholds fall back to their documented defaults. Accelerator
/// *capacity* is intentionally not read here; see [`load_capacity`].
pub fn load_static(dir: &Path) -> Result<StaticCatalogs> {
    let accel_doc: AcceleratorCatalogDoc = read_optional(dir, "accelerators")?;
    let (accelerators, _) = accel_doc.into_parts().map_err(core_invalid)?;

    let model_doc: ModelCatalogDoc = read_optional(dir, "models")?;
    let models = model_doc.into_map().map_err(core_invalid)?;

    let class_doc: ServiceClassCatalogDoc = read_optional(dir, "classes")?;
    let classes = class_doc.into_map().map_err(core_invalid)?;

    let options_doc: OptimizerOptionsDoc = read_optional(dir, "options")?;
    let optimizer_options: OptimizerOptions = options_doc.into();

    let saturation_config: SaturationConfig = read_optional(dir, "saturation")?;
    saturation_config.validate().map_err(core_invalid)?;

    Ok(StaticCatalogs { accelerators, models, classes, optimizer_options, saturation_config })
}

/// Reloads accelerator-type capacity (§4.H step 2), independent of whether
/// the control loop is running in dynamic mode.
pub fn load_capacity(dir: &Path) -> Result<AcceleratorCapacity> {
    let doc: CapacityDoc = read_optional(dir, "capacity")?;
    Ok(AcceleratorCapacity::new(doc.capacity, doc.unlimited))
}

fn core_invalid(e: inferno_core::Error) -> Error {
    Error::ConfigInvalid(e.to_string())
}

fn read_optional<T: DeserializeOwned + Default>(dir: &Path, stem: &str) -> Result<T> {
    for ext in ["json", "yaml", "yml"] {
        let path = dir.join(format!("{stem}.{ext}"));
        if !path.exists() {
            continue;
        }
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| Error::ConfigInvalid(format!("reading {}: {e}", path.display())))?;
        return if ext == "json" {
            serde_json::from_str(&raw).map_err(|e| Error::ConfigInvalid(format!("parsing {}: {e}", path.display())))
        } else {
            serde_yaml::from_str(&raw).map_err(|e| Error::ConfigInvalid(format!("parsing {}: {e}", path.display())))
        };
    }
    Ok(T::default())
}
