use crate::model::{Accelerator, CandidateAllocation, Variant};
use std::collections::HashMap;

/// The prior allocation a variant is transitioning from, reconstructed from
/// its last-actuated accelerator/replica count rather than carried as a
/// live object (there is no candidate allocation left over from a previous
/// cycle; only the current accelerator/replica count is durable).
pub struct PriorAllocation {
    pub accelerator: String,
    pub replicas: u32,
    pub cost: f64,
}

/// Reconstructs a variant's prior allocation, if it has previously been
/// deployed.
pub fn prior_allocation(
    variant: &Variant,
    accelerators: &HashMap<String, Accelerator>,
) -> Option<PriorAllocation> {
    let accel_name = variant.current_accelerator.as_ref()?;
    let accelerator = accelerators.get(accel_name)?;
    if variant.current_replicas == 0 {
        return None;
    }
    Some(PriorAllocation {
        accelerator: accel_name.clone(),
        replicas: variant.current_replicas,
        cost: accelerator.cost_per_hour * variant.current_replicas as f64 * accelerator.multiplicity as f64,
    })
}

/// The value function (§4.D): `cost(a)` with no prior allocation, else
/// `cost(a) + transition_penalty`, where the penalty is zero for an
/// identical (accelerator, replicas) pair, `new_cost - old_cost` for the
/// same accelerator, or `kappa * (old_cost + new_cost) + (new_cost -
/// old_cost)` for a different accelerator.
pub fn value(candidate: &CandidateAllocation, prior: Option<&PriorAllocation>, kappa: f64) -> f64 {
    let Some(prior) = prior else {
        return candidate.cost;
    };
    let penalty = if candidate.accelerator == prior.accelerator && candidate.replicas == prior.replicas {
        0.0
    } else if candidate.accelerator == prior.accelerator {
        candidate.cost - prior.cost
    } else {
        kappa * (prior.cost + candidate.cost) + (candidate.cost - prior.cost)
    };
    candidate.cost + penalty
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(accelerator: &str, replicas: u32, cost: f64) -> CandidateAllocation {
        CandidateAllocation {
            accelerator: accelerator.to_string(),
            replicas,
            effective_max_batch: 4,
            cost,
            value: cost,
            expected_itl_ms: 10.0,
            expected_ttft_ms: 10.0,
            expected_wait_ms: 1.0,
            rho: 0.5,
            max_sustainable_rate_per_ms: 1.0,
        }
    }

    #[test]
    fn no_prior_is_just_cost() {
        let c = candidate("A100", 2, 20.0);
        assert_eq!(value(&c, None, 0.1), 20.0);
    }

    #[test]
    fn identical_allocation_has_no_penalty() {
        let prior = PriorAllocation { accelerator: "A100".into(), replicas: 2, cost: 20.0 };
        let c = candidate("A100", 2, 20.0);
        assert_eq!(value(&c, Some(&prior), 0.1), 20.0);
    }

    #[test]
    fn same_accelerator_penalty_is_cost_delta() {
        let prior = PriorAllocation { accelerator: "A100".into(), replicas: 2, cost: 20.0 };
        let c = candidate("A100", 3, 30.0);
        assert_eq!(value(&c, Some(&prior), 0.1), 30.0 + 10.0);
    }

    #[test]
    fn cross_accelerator_penalty_includes_kappa_term() {
        let prior = PriorAllocation { accelerator: "A100".into(), replicas: 2, cost: 20.0 };
        let c = candidate("H100", 2, 25.0);
        let expected = 25.0 + 0.1 * (20.0 + 25.0) + (25.0 - 20.0);
        assert!((value(&c, Some(&prior), 0.1) - expected).abs() < 1e-9);
    }
}
