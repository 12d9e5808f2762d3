//! Wire types for the actuator's `/update` request and response (§6).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque handle round-tripped verbatim from the collector; the actuator
/// never inspects it beyond writing it back out in the applied document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceHandle {
    pub uid: String,
    pub name: String,
    pub namespace: String,
}

/// Desired allocation for a single variant, as decided by the optimizer and
/// arbitrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DesiredAllocation {
    pub accelerator: String,
    pub replicas: u32,
    pub max_batch: u32,
}

/// `POST /update` request body: one desired allocation per variant, plus
/// each variant's resource handle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UpdateRequest {
    pub allocations: HashMap<String, DesiredAllocation>,
    #[serde(default)]
    pub handles: HashMap<String, ResourceHandle>,
}

/// `POST /update` success response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateResponse {
    pub applied: usize,
}
