//! Control-loop error taxonomy (§7): the three stage failures that concern
//! RPCs this crate makes (`inferno_core::Error` already covers the
//! analyzer/solver/optimizer rows).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Static configuration failed validation; fatal at startup, retained
    /// state kept on a dynamic-mode reload failure.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    /// The collector could not be reached or returned an error.
    #[error("collector unavailable: {0}")]
    CollectorUnavailable(String),

    /// The actuator rejected or could not be reached for the update.
    #[error("actuator failed: {0}")]
    ActuatorFailed(String),

    /// Live replica metrics were absent or too old to arbitrate with. Not
    /// currently raised: a variant with no reported replicas degrades
    /// gracefully to `CapacityOnly` inside `saturation::arbitrate` rather
    /// than aborting the cycle. Kept for the row in the error table (§7)
    /// and for a future staleness check once metrics carry a timestamp.
    #[error("live metrics missing or stale: {0}")]
    #[allow(dead_code)]
    MetricsUnavailable(String),

    /// A core-library stage failed (analyzer, solver, optimizer, arbitrator).
    #[error(transparent)]
    Core(#[from] inferno_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
