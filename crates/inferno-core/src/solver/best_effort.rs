//! Best-effort dispatch (§4.D): what happens to entries the primary greedy
//! pass could not fit into any candidate, keyed by `SaturationPolicy`.

use super::greedy::{Entry, EntryState};
use super::options::SaturationPolicy;
use crate::model::{Accelerator, AcceleratorCapacity, System};
use std::collections::HashMap;

/// Applies `policy` to the entries left in `unfit` after the primary pass,
/// mutating `system`'s chosen allocations and `capacity` in place.
pub(super) fn run(
    unfit: &mut [Entry],
    system: &mut System,
    accelerators: &HashMap<String, Accelerator>,
    capacity: &mut AcceleratorCapacity,
    policy: SaturationPolicy,
) {
    match policy {
        SaturationPolicy::None => {}
        SaturationPolicy::PriorityExhaustive => exhaustive(unfit, system, accelerators, capacity),
        SaturationPolicy::PriorityRoundRobin | SaturationPolicy::RoundRobin => {
            round_robin(unfit, system, accelerators, capacity)
        }
    }
}

/// Repeatedly scans the unfit set for the single cheapest candidate that
/// still fits, grants it, and repeats until nothing more fits. Entries
/// exhaust their own candidate list (not just the one tried by the primary
/// pass) before dropping out for good.
fn exhaustive(
    unfit: &mut [Entry],
    system: &mut System,
    accelerators: &HashMap<String, Accelerator>,
    capacity: &mut AcceleratorCapacity,
) {
    loop {
        let mut best: Option<(usize, usize, u64, String, f64)> = None;
        for (idx, entry) in unfit.iter().enumerate() {
            let EntryState::ReadyAt(cursor) = entry.state else {
                continue;
            };
            for (probe, (accel_name, candidate, value)) in entry.candidates.iter().enumerate().skip(cursor) {
                let accel_type = accelerators
                    .get(accel_name)
                    .map(|a| a.accel_type.clone())
                    .unwrap_or_else(|| accel_name.clone());
                let multiplicity = accelerators.get(accel_name).map(|a| a.multiplicity).unwrap_or(1);
                let needed = candidate.replicas as u64 * multiplicity as u64;
                if capacity.remaining(&accel_type) < needed {
                    continue;
                }
                if best.as_ref().map(|(.., v)| *value < *v).unwrap_or(true) {
                    best = Some((idx, probe, needed, accel_type, *value));
                }
                break;
            }
        }
        let Some((idx, probe, needed, accel_type, _)) = best else {
            break;
        };
        capacity.consume(&accel_type, needed);
        let candidate = unfit[idx].candidates[probe].1.clone();
        system.variants_mut().get_mut(&unfit[idx].variant).unwrap().chosen = Some(candidate);
        unfit[idx].state = EntryState::Done;
    }
}

fn entry_cursor_value(entry: &Entry) -> f64 {
    match entry.state {
        EntryState::ReadyAt(cursor) => entry.candidates[cursor].2,
        _ => f64::INFINITY,
    }
}

/// Ticketed round-robin: each still-unfit entry gets one chance per round to
/// grab its cheapest remaining viable candidate; entries that fail a round
/// keep their place for the next one until their candidate list is
/// exhausted. Order within a round follows increasing current value, so the
/// variant with the least costly option gets first pick.
fn round_robin(
    unfit: &mut [Entry],
    system: &mut System,
    accelerators: &HashMap<String, Accelerator>,
    capacity: &mut AcceleratorCapacity,
) {
    loop {
        let mut order: Vec<usize> = (0..unfit.len())
            .filter(|&i| matches!(unfit[i].state, EntryState::ReadyAt(_)))
            .collect();
        if order.is_empty() {
            break;
        }
        order.sort_by(|&a, &b| {
            let va = entry_cursor_value(&unfit[a]);
            let vb = entry_cursor_value(&unfit[b]);
            va.partial_cmp(&vb).unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut granted_any = false;
        for idx in order {
            let EntryState::ReadyAt(cursor) = unfit[idx].state else {
                continue;
            };
            let (accel_name, candidate, _) = unfit[idx].candidates[cursor].clone();
            let accel_type = accelerators
                .get(&accel_name)
                .map(|a| a.accel_type.clone())
                .unwrap_or_else(|| accel_name.clone());
            let multiplicity = accelerators.get(&accel_name).map(|a| a.multiplicity).unwrap_or(1);
            let needed = candidate.replicas as u64 * multiplicity as u64;

            if capacity.remaining(&accel_type) >= needed {
                capacity.consume(&accel_type, needed);
                system.variants_mut().get_mut(&unfit[idx].variant).unwrap().chosen = Some(candidate);
                unfit[idx].state = EntryState::Done;
                granted_any = true;
            } else if cursor + 1 < unfit[idx].candidates.len() {
                unfit[idx].state = EntryState::ReadyAt(cursor + 1);
            } else {
                unfit[idx].state = EntryState::Unfit;
            }
        }
        if !granted_any {
            break;
        }
    }
}
