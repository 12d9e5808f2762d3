//! Core domain logic for the Inferno autoscaling optimizer: the queueing
//! kernel, allocation analyzer, system model, greedy solver, optimizer
//! engine and saturation arbitrator. Free of file and network I/O; the
//! binary crates own configuration loading, CLI/env wiring and the REST
//! surface.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod model;
pub mod optimizer;
pub mod queue;
pub mod saturation;
pub mod solver;
pub mod units;

pub use error::{Error, Result};
