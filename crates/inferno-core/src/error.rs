//! Error taxonomy for the analyzer, solver and system-model stages.
//!
//! Each variant corresponds to a row in the error-handling table of the
//! design spec. Control-loop-level failures (collector/actuator
//! unavailability, stale metrics) live one layer up, in `inferno-controller`,
//! since they concern RPCs this crate never makes.

use thiserror::Error;

/// Errors raised by the queueing kernel, allocation analyzer, system model,
/// solver and optimizer engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Configuration failed validation (accelerator/model/class catalogs,
    /// optimizer options, saturation thresholds).
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    /// No performance profile exists for a (model, accelerator) pair.
    #[error("no performance profile for model {model:?} on accelerator {accelerator:?}")]
    ProfileMissing {
        /// Model name.
        model: String,
        /// Accelerator name.
        accelerator: String,
    },

    /// No arrival rate in the search interval meets both the service-time
    /// and wait-time SLO ceilings.
    #[error("no feasible arrival rate meets the SLO for model {model:?} on accelerator {accelerator:?}")]
    SloInfeasible {
        /// Model name.
        model: String,
        /// Accelerator name.
        accelerator: String,
    },

    /// The state-dependent M/M/1/K chain has no valid steady state at the
    /// requested arrival rate (unstable, or probabilities fail to normalize).
    #[error("queueing kernel has no valid steady state at lambda={lambda}: {reason}")]
    QueueInfeasible {
        /// Arrival rate the kernel was asked to solve at.
        lambda: f64,
        /// Human-readable reason (e.g. "rho >= 1", "probabilities summed to 0.92").
        reason: String,
    },

    /// The solver could not produce any allocation for at least one variant.
    #[error("solver found no solution: {0}")]
    SolverNoSolution(String),

    /// The optimizer engine ran but no variant in the system received an
    /// allocation.
    #[error("optimizer produced no allocation for any variant")]
    OptimizerInfeasible,
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
