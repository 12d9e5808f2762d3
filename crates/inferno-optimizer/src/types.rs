//! Wire types for the standalone optimizer's `POST /optimize` request (§6):
//! a full system snapshot plus optimizer options, the same payload the
//! control loop builds in-process before dispatching to the solver.

use inferno_core::config::{
    AcceleratorCatalogDoc, ModelCatalogDoc, OptimizerOptionsDoc, ServiceClassCatalogDoc,
    VariantListDoc,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimizeRequest {
    pub accelerators: AcceleratorCatalogDoc,
    pub models: ModelCatalogDoc,
    pub classes: ServiceClassCatalogDoc,
    pub variants: VariantListDoc,
    #[serde(default)]
    pub options: OptimizerOptionsDoc,
}
