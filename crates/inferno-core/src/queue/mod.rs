//! State-dependent M/M/1/K queueing kernel (component A).
//!
//! Models one inference replica as a birth-death chain over the number of
//! requests currently in the system, `0..=k_max`. The service rate at state
//! `n` is state-dependent: `mu[n]` reflects the throughput of serving a
//! batch that currently holds `n` concurrent requests (up to the replica's
//! effective max batch size), which is how batched inference servers get
//! faster per request as load rises, up to a ceiling.

mod kernel;

pub use kernel::{QueueSolution, QueueingKernel};
