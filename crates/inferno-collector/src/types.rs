//! Wire types for the collector's `/collect` response (§6).

use inferno_core::config::VariantDoc;
use inferno_core::saturation::ReplicaMetrics;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque handle the controller round-trips verbatim to the actuator; the
/// core never inspects it (§9 supplement).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceHandle {
    pub uid: String,
    pub name: String,
    pub namespace: String,
}

/// On-disk document a collector deployment maintains: the current variant
/// list, each variant's resource handle, and the live per-replica metrics
/// the saturation analyzer arbitrates with (§4.H step 3 collects "variant
/// states and live replica metrics" in one step) — re-read on every
/// `/collect` call so the response reflects whatever last touched the file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CollectorDoc {
    pub variants: Vec<VariantDoc>,
    #[serde(default)]
    pub handles: HashMap<String, ResourceHandle>,
    #[serde(default)]
    pub replica_metrics: HashMap<String, Vec<ReplicaMetrics>>,
}

/// `GET /collect` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectResponse {
    pub variants: Vec<VariantDoc>,
    pub handles: HashMap<String, ResourceHandle>,
    pub replica_metrics: HashMap<String, Vec<ReplicaMetrics>>,
}

impl From<CollectorDoc> for CollectResponse {
    fn from(doc: CollectorDoc) -> Self {
        Self { variants: doc.variants, handles: doc.handles, replica_metrics: doc.replica_metrics }
    }
}
