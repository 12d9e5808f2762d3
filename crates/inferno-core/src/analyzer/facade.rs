//! Model-analyzer facade (component E): collects a feasible candidate per
//! accelerator a variant's model is profiled for, omitting (not erroring on)
//! accelerators that turn out infeasible. Used by `System::calculate()` and
//! by the live arbitration path.

use super::allocation::{self, AnalyzerConfig};
use crate::model::{Accelerator, CandidateAllocation, Model, ServiceClass, Variant};
use std::collections::HashMap;
use tracing::debug;

/// Provenance tag attached to every candidate this facade produces,
/// distinguishing it from allocations a different backend might synthesize.
pub const PROVENANCE: &str = "markovian analysis";

/// Computes the full candidate set for `variant`: one entry per accelerator
/// name present in its model's performance profiles, skipping any that are
/// infeasible (missing profile data was already implied by profile
/// membership; SLO/queue infeasibility and a missing catalog entry are both
/// logged and omitted).
pub fn candidates_for(
    variant: &Variant,
    model: &Model,
    service_class: &ServiceClass,
    accelerators: &HashMap<String, Accelerator>,
    config: &AnalyzerConfig,
) -> HashMap<String, CandidateAllocation> {
    let mut candidates = HashMap::new();
    for accel_name in model.profiles.keys() {
        let Some(accelerator) = accelerators.get(accel_name) else {
            debug!(variant = %variant.name, accelerator = %accel_name, "accelerator not in catalog, omitting");
            continue;
        };
        match allocation::analyze(variant, accelerator, model, service_class, config) {
            Ok(candidate) => {
                candidates.insert(accel_name.clone(), candidate);
            }
            Err(err) => {
                debug!(variant = %variant.name, accelerator = %accel_name, error = %err, "accelerator infeasible for variant, omitting");
            }
        }
    }
    candidates
}
