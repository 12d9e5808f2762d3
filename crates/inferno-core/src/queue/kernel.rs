use crate::error::{Error, Result};

/// Numerical tolerance for steady-state probabilities summing to one, and for
/// treating a chain as stable.
const PROB_TOLERANCE: f64 = 1e-6;

/// A state-dependent M/M/1/K queue, constructed fresh for every `solve()`
/// call — never shared across threads or reused for a different batch of
/// service rates. Mirrors a local, per-invocation value, not a process-wide
/// singleton (design note: no shared queueing-model pointer).
#[derive(Debug, Clone)]
pub struct QueueingKernel {
    /// Per-state service rates `mu[0]` is unused, `mu[1..=n_max]` are the
    /// batch-dependent service rates (requests/ms) at occupancy `1..=n_max`.
    mu: Vec<f64>,
    /// Effective max batch size / maximum occupancy before batching effects
    /// stop improving throughput.
    n_max: usize,
    /// Maximum queue length (system capacity); arrivals beyond this are
    /// blocked. Defaults to `n_max` when not overridden.
    k_max: usize,
}

/// The result of solving the chain at a given arrival rate.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueSolution {
    /// Arrival rate the chain was solved at (requests/ms, per replica).
    pub lambda: f64,
    /// Probability the replica is busy (at least one request in system).
    pub rho: f64,
    /// Expected number of requests in the system.
    pub expected_in_system: f64,
    /// Expected number of requests waiting beyond the effective batch cap.
    pub expected_in_queue: f64,
    /// Expected sojourn time: total time from arrival to completion (ms).
    pub expected_sojourn_ms: f64,
    /// Expected wait time before a request is admitted into an active batch (ms).
    pub expected_wait_ms: f64,
    /// Steady-state occupancy distribution `pi[0..=k_max]`, exposed so
    /// callers (the allocation analyzer) can take batch-size-weighted
    /// averages of quantities the kernel itself doesn't know about, such as
    /// a model's per-token latency curve.
    pub occupancy: Vec<f64>,
}

impl QueueingKernel {
    /// Builds a kernel from per-state service rates `mu[1..=n_max]`
    /// (`mu[0]` is implicit and unused). `k_max` is the maximum queue
    /// length; pass `n_max` when the system has no separate waiting room
    /// beyond the batch cap.
    pub fn new(mu: Vec<f64>, n_max: usize, k_max: usize) -> Result<Self> {
        if mu.len() != n_max + 1 {
            return Err(Error::ConfigInvalid(format!(
                "expected {} service rates (mu[0..=n_max]), got {}",
                n_max + 1,
                mu.len()
            )));
        }
        if k_max < n_max {
            return Err(Error::ConfigInvalid(
                "k_max must be >= n_max".to_string(),
            ));
        }
        for (n, rate) in mu.iter().enumerate().skip(1) {
            if *rate <= 0.0 {
                return Err(Error::ConfigInvalid(format!(
                    "service rate at state {n} must be positive, got {rate}"
                )));
            }
        }
        Ok(Self { mu, n_max, k_max })
    }

    /// Service rate at occupancy `n`, clamped to the profiled range
    /// `1..=n_max` beyond which the batch cap holds throughput flat.
    fn mu_at(&self, n: usize) -> f64 {
        self.mu[n.min(self.n_max)]
    }

    /// The batch size actually in service when occupancy is `n`: `n`
    /// clamped to the effective max batch cap.
    pub fn batch_at(&self, n: usize) -> usize {
        n.min(self.n_max)
    }

    /// Maximum queue length this kernel was built with.
    pub fn k_max(&self) -> usize {
        self.k_max
    }

    /// Public accessor for the service rate at occupancy `n`, clamped to
    /// the profiled batch range. Used by callers (the allocation analyzer)
    /// to derive binary-search bounds without re-deriving them from a
    /// solved chain.
    pub fn batch_service_rate(&self, n: usize) -> f64 {
        self.mu_at(n)
    }

    /// Solves the chain for arrival rate `lambda` (requests/ms) shared
    /// evenly across `servers` identical, independently operating replicas.
    /// Returns per-replica statistics (by symmetry, every replica sees the
    /// same marginal distribution under even load sharing).
    pub fn solve(&self, lambda: f64, servers: usize) -> Result<QueueSolution> {
        if lambda <= 0.0 {
            return Err(Error::QueueInfeasible {
                lambda,
                reason: "arrival rate must be positive".to_string(),
            });
        }
        if servers == 0 {
            return Err(Error::ConfigInvalid("servers must be >= 1".to_string()));
        }
        let per_server_lambda = lambda / servers as f64;

        // Unnormalized steady-state weights: w[0] = 1, w[n] = w[n-1] * lambda / mu(n).
        let mut weights = vec![0.0_f64; self.k_max + 1];
        weights[0] = 1.0;
        for n in 1..=self.k_max {
            let mu_n = self.mu_at(n);
            if mu_n <= 0.0 {
                return Err(Error::QueueInfeasible {
                    lambda,
                    reason: format!("non-positive service rate at state {n}"),
                });
            }
            weights[n] = weights[n - 1] * per_server_lambda / mu_n;
        }

        let total: f64 = weights.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(Error::QueueInfeasible {
                lambda,
                reason: "steady-state weights failed to normalize".to_string(),
            });
        }
        let pi: Vec<f64> = weights.iter().map(|w| w / total).collect();

        let prob_sum: f64 = pi.iter().sum();
        if (prob_sum - 1.0).abs() > PROB_TOLERANCE {
            return Err(Error::QueueInfeasible {
                lambda,
                reason: format!("steady-state probabilities summed to {prob_sum}, not 1"),
            });
        }

        let rho = 1.0 - pi[0];
        if rho >= 1.0 {
            return Err(Error::QueueInfeasible {
                lambda,
                reason: format!("chain is unstable: rho = {rho}"),
            });
        }

        let expected_in_system: f64 = pi.iter().enumerate().map(|(n, p)| n as f64 * p).sum();
        let expected_in_queue: f64 = pi
            .iter()
            .enumerate()
            .map(|(n, p)| (n.saturating_sub(self.n_max)) as f64 * p)
            .sum();

        let blocking_prob = pi[self.k_max];
        let lambda_eff = per_server_lambda * (1.0 - blocking_prob);
        if lambda_eff <= 0.0 {
            return Err(Error::QueueInfeasible {
                lambda,
                reason: "effective throughput is zero".to_string(),
            });
        }

        let expected_sojourn_ms = expected_in_system / lambda_eff;
        let expected_wait_ms = expected_in_queue / lambda_eff;

        Ok(QueueSolution {
            lambda,
            rho,
            expected_in_system,
            expected_in_queue,
            expected_sojourn_ms,
            expected_wait_ms,
            occupancy: pi,
        })
    }
}
