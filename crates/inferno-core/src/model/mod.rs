//! The system's data model (component C): accelerators, models, service
//! classes, variants and the catalogs that own them.

mod accelerator;
mod model;
mod service_class;
mod system;
mod variant;

pub use accelerator::{Accelerator, AcceleratorCapacity, PowerCurve};
pub use model::{Model, PerfProfile};
pub use service_class::{ServiceClass, SloTarget};
pub use system::System;
pub use variant::{CandidateAllocation, ObservedLoad, Variant};
