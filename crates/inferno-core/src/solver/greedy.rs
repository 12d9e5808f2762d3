//! Greedy solver (component D): chooses one allocation per variant from its
//! candidate set, respecting per-accelerator-type capacity in limited mode.

use super::best_effort;
use super::options::{OptimizerOptions, SaturationPolicy};
use super::value;
use crate::error::{Error, Result};
use crate::model::{Accelerator, AcceleratorCapacity, CandidateAllocation, System, Variant};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Per-entry state machine: `ReadyAt(i)` still has candidate `i` to try,
/// `Unfit` exhausted every candidate without fitting capacity, `Done` has a
/// fixed allocation. `ReadyAt(0)` is the initial state; `{Done, Unfit}` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum EntryState {
    ReadyAt(usize),
    Unfit,
    Done,
}

/// One variant competing for capacity: its sorted candidate list (ascending
/// by value) and a cursor into it.
#[derive(Debug, Clone)]
pub(super) struct Entry {
    pub variant: String,
    pub priority: u32,
    pub state: EntryState,
    /// `(accelerator name, candidate, value)` sorted ascending by value.
    pub candidates: Vec<(String, CandidateAllocation, f64)>,
}

impl Entry {
    fn new(variant: &Variant, priority: u32, values: Vec<(String, CandidateAllocation, f64)>) -> Self {
        let mut values = values;
        values.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(Ordering::Equal));
        Self {
            variant: variant.name.clone(),
            priority,
            state: EntryState::ReadyAt(0),
            candidates: values,
        }
    }

    /// `delta = value[cursor+1] - value[cursor]`, or `+inf` if there is no
    /// next candidate to compare against.
    fn delta(&self, cursor: usize) -> f64 {
        match self.candidates.get(cursor + 1) {
            Some((_, _, next)) => next - self.candidates[cursor].2,
            None => f64::INFINITY,
        }
    }

    fn current_value(&self, cursor: usize) -> f64 {
        self.candidates[cursor].2
    }

    /// Regret key: `delta * (1 + w / (1 + priority))`, descending priority
    /// in the pop order; ties broken by current-index value descending.
    fn key(&self, cursor: usize, w: f64) -> (f64, f64) {
        (self.delta(cursor) * (1.0 + w / (1.0 + self.priority as f64)), self.current_value(cursor))
    }
}

/// Builds one entry per variant with a non-empty candidate set, computing
/// each candidate's ranking value against the variant's prior allocation.
fn build_entries(
    system: &System,
    accelerators: &HashMap<String, Accelerator>,
    kappa: f64,
) -> Vec<Entry> {
    let mut entries = Vec::new();
    for variant in system.variants().values() {
        if variant.candidates.is_empty() {
            continue;
        }
        let priority = system
            .classes()
            .get(&variant.service_class)
            .map(|c| c.priority)
            .unwrap_or(u32::MAX);
        let prior = value::prior_allocation(variant, accelerators);
        let values: Vec<(String, CandidateAllocation, f64)> = variant
            .candidates
            .iter()
            .map(|(accel_name, candidate)| {
                let v = value::value(candidate, prior.as_ref(), kappa);
                (accel_name.clone(), candidate.clone(), v)
            })
            .collect();
        entries.push(Entry::new(variant, priority, values));
    }
    entries
}

/// Unlimited mode: every variant independently picks its minimum-value
/// candidate.
pub(super) fn solve_unlimited(system: &mut System, options: &OptimizerOptions) -> Result<()> {
    let accelerators = system.accelerators().clone();
    let entries = build_entries(system, &accelerators, options.accel_penalty_factor);
    for entry in entries {
        if let Some((_, best, _)) = entry.candidates.first() {
            let best = best.clone();
            system.variants_mut().get_mut(&entry.variant).unwrap().chosen = Some(best);
        }
    }
    ensure_some_allocation(system)
}

/// Limited mode: capacity-respecting greedy assignment with priority-aware
/// regret ordering, followed by a best-effort pass per `saturation_policy`.
///
/// Every variant's entry competes in a single regret-ordered set regardless
/// of priority: the `w/(1 + priority)` factor in `Entry::key` is what lets a
/// high-priority variant with a small Δ still outrank a low-priority variant
/// with a large one. Splitting entries into per-priority bands for this pass
/// would make that factor constant within each band and inert. Priority
/// bands are used only for the best-effort pass below, per `SaturationPolicy`.
pub(super) fn solve_limited(system: &mut System, options: &OptimizerOptions) -> Result<()> {
    let accelerators = system.accelerators().clone();
    let mut queue: Vec<Entry> = build_entries(system, &accelerators, options.accel_penalty_factor);
    let mut capacity = system.capacity().clone();

    queue.sort_by(|a, b| {
        let ka = a.key(cursor_of(a), options.priority_weight_factor);
        let kb = b.key(cursor_of(b), options.priority_weight_factor);
        ka.partial_cmp(&kb).unwrap_or(Ordering::Equal)
    });

    let mut unfit: Vec<Entry> = Vec::new();
    while let Some(mut entry) = queue.pop() {
        let EntryState::ReadyAt(cursor) = entry.state else {
            continue;
        };
        let (accel_name, candidate, _) = entry.candidates[cursor].clone();
        let accel_type = accelerators
            .get(&accel_name)
            .map(|a| a.accel_type.clone())
            .unwrap_or_else(|| accel_name.clone());
        let multiplicity = accelerators.get(&accel_name).map(|a| a.multiplicity).unwrap_or(1);
        let needed = candidate.replicas as u64 * multiplicity as u64;

        if capacity.remaining(&accel_type) >= needed {
            capacity.consume(&accel_type, needed);
            system.variants_mut().get_mut(&entry.variant).unwrap().chosen = Some(candidate);
            entry.state = EntryState::Done;
            continue;
        }

        if cursor + 1 < entry.candidates.len() {
            entry.state = EntryState::ReadyAt(cursor + 1);
            let key = entry.key(cursor + 1, options.priority_weight_factor);
            let pos = queue
                .binary_search_by(|e| {
                    e.key(cursor_of(e), options.priority_weight_factor)
                        .partial_cmp(&key)
                        .unwrap_or(Ordering::Equal)
                })
                .unwrap_or_else(|i| i);
            queue.insert(pos, entry);
        } else {
            entry.state = EntryState::Unfit;
            unfit.push(entry);
        }
    }

    run_best_effort(&mut unfit, system, &accelerators, &mut capacity, options.saturation_policy);

    *system.capacity_mut() = capacity;
    ensure_some_allocation(system)
}

/// Dispatches the best-effort pass over the primary pass's leftovers.
/// `PriorityExhaustive`/`PriorityRoundRobin` process one priority band at a
/// time (lowest number first); `None`/`RoundRobin` run over the whole unfit
/// set without regard to priority.
fn run_best_effort(
    unfit: &mut [Entry],
    system: &mut System,
    accelerators: &HashMap<String, Accelerator>,
    capacity: &mut AcceleratorCapacity,
    policy: SaturationPolicy,
) {
    match policy {
        SaturationPolicy::None | SaturationPolicy::RoundRobin => {
            best_effort::run(unfit, system, accelerators, capacity, policy);
        }
        SaturationPolicy::PriorityExhaustive | SaturationPolicy::PriorityRoundRobin => {
            let mut bands: Vec<u32> = unfit.iter().map(|e| e.priority).collect();
            bands.sort_unstable();
            bands.dedup();
            for band in bands {
                let mut band_unfit: Vec<Entry> =
                    unfit.iter().filter(|e| e.priority == band).cloned().collect();
                best_effort::run(&mut band_unfit, system, accelerators, capacity, policy);
            }
        }
    }
}

fn cursor_of(entry: &Entry) -> usize {
    match entry.state {
        EntryState::ReadyAt(i) => i,
        _ => 0,
    }
}

fn ensure_some_allocation(system: &System) -> Result<()> {
    if system.variants().values().any(|v| v.chosen.is_some()) || system.variants().is_empty() {
        Ok(())
    } else {
        Err(Error::SolverNoSolution(
            "no variant received an allocation".to_string(),
        ))
    }
}
