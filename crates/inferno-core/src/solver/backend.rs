use super::greedy;
use super::options::OptimizerOptions;
use crate::error::Result;
use crate::model::System;

/// Abstraction over allocation solvers (§4.D). `GreedySolver` is the only
/// implementation, but keeping the trait seam lets the optimizer engine
/// (component F) stay agnostic of solver internals.
pub trait SolverBackend {
    /// Assigns `system`'s variants a chosen allocation in place, given each
    /// variant's `candidates` map already populated by `System::calculate`.
    fn solve(&self, system: &mut System) -> Result<()>;
}

/// The greedy regret-ordered solver described in §4.D.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedySolver {
    pub options: OptimizerOptions,
}

impl GreedySolver {
    pub fn new(options: OptimizerOptions) -> Self {
        Self { options }
    }
}

impl SolverBackend for GreedySolver {
    fn solve(&self, system: &mut System) -> Result<()> {
        if self.options.unlimited || system.capacity().unlimited {
            greedy::solve_unlimited(system, &self.options)
        } else {
            greedy::solve_limited(system, &self.options)
        }
    }
}
