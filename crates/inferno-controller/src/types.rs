//! Wire types exchanged with the collector and actuator services (§6). A
//! thin mirror of those crates' own types, kept local so this crate has no
//! path dependency on two separate binary crates.

use inferno_core::config::VariantDoc;
use inferno_core::saturation::ReplicaMetrics;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceHandle {
    pub uid: String,
    pub name: String,
    pub namespace: String,
}

/// `GET /collect` response, as served by `inferno-collector`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectResponse {
    pub variants: Vec<VariantDoc>,
    pub handles: HashMap<String, ResourceHandle>,
    #[serde(default)]
    pub replica_metrics: HashMap<String, Vec<ReplicaMetrics>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DesiredAllocation {
    pub accelerator: String,
    pub replicas: u32,
    pub max_batch: u32,
}

/// `POST /update` request, as accepted by `inferno-actuator`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UpdateRequest {
    pub allocations: HashMap<String, DesiredAllocation>,
    #[serde(default)]
    pub handles: HashMap<String, ResourceHandle>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateResponse {
    pub applied: usize,
}

/// Per-variant status surfaced on `GET /status` (§6 ambient) after the most
/// recent cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariantStatus {
    pub accelerator: Option<String>,
    pub replicas: u32,
    pub safety_override: bool,
    pub capacity_only: bool,
}

/// The outcome of the most recently completed cycle, kept in memory for
/// `GET /status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CycleStatus {
    pub cycle: u64,
    pub variants: HashMap<String, VariantStatus>,
    pub last_error: Option<String>,
}
