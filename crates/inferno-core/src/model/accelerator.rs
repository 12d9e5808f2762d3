use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single accelerator specification: identity, memory, cost and power
/// behavior. Many accelerator *instances* may share a `accel_type` for
/// capacity accounting (§3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Accelerator {
    /// Unique accelerator name, e.g. `"A100-40GB"`.
    pub name: String,
    /// Accelerator type used for capacity accounting, e.g. `"A100"`.
    pub accel_type: String,
    /// Memory size in GB.
    pub memory_gb: f64,
    /// Memory bandwidth in GB/s.
    pub memory_bandwidth_gbps: f64,
    /// Cost per hour, per accelerator instance.
    pub cost_per_hour: f64,
    /// Piecewise-linear power curve.
    pub power: PowerCurve,
    /// Number of cards bundled in one accelerator instance.
    pub multiplicity: u32,
}

/// Idle/mid/full power draw with the utilization at which the curve bends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PowerCurve {
    /// Power draw (W) at zero utilization.
    pub idle_watts: f64,
    /// Power draw (W) at `mid_util`.
    pub mid_watts: f64,
    /// Power draw (W) at full utilization.
    pub full_watts: f64,
    /// Utilization, in `[0, 1]`, at which the curve inflects.
    pub mid_util: f64,
}

impl PowerCurve {
    /// Validates `0 <= mid_util <= 1` and `idle <= mid <= full`.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.mid_util) {
            return Err(Error::ConfigInvalid(format!(
                "power curve mid_util must be in [0,1], got {}",
                self.mid_util
            )));
        }
        if !(self.idle_watts <= self.mid_watts && self.mid_watts <= self.full_watts) {
            return Err(Error::ConfigInvalid(
                "power curve must satisfy idle <= mid <= full".to_string(),
            ));
        }
        Ok(())
    }

    /// Interpolates power draw at a given utilization in `[0, 1]`.
    pub fn power_at(&self, utilization: f64) -> f64 {
        let u = utilization.clamp(0.0, 1.0);
        if u <= self.mid_util {
            if self.mid_util == 0.0 {
                return self.mid_watts;
            }
            let frac = u / self.mid_util;
            self.idle_watts + frac * (self.mid_watts - self.idle_watts)
        } else {
            let span = 1.0 - self.mid_util;
            if span <= 0.0 {
                return self.full_watts;
            }
            let frac = (u - self.mid_util) / span;
            self.mid_watts + frac * (self.full_watts - self.mid_watts)
        }
    }
}

impl Accelerator {
    /// Validates the invariants from §3: `0 <= midUtil <= 1`,
    /// `idle <= mid <= full`.
    pub fn validate(&self) -> Result<()> {
        self.power.validate()?;
        if self.multiplicity == 0 {
            return Err(Error::ConfigInvalid(format!(
                "accelerator {:?} multiplicity must be >= 1",
                self.name
            )));
        }
        Ok(())
    }
}

/// Mapping from accelerator *type* to an available integer count. In
/// unlimited mode every lookup is treated as infinite regardless of what's
/// stored here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AcceleratorCapacity {
    by_type: HashMap<String, u64>,
    /// When true, `remaining()` always reports `u64::MAX`.
    pub unlimited: bool,
}

impl AcceleratorCapacity {
    /// Builds a capacity map from `(accel_type, count)` pairs.
    pub fn new(counts: impl IntoIterator<Item = (String, u64)>, unlimited: bool) -> Self {
        Self {
            by_type: counts.into_iter().collect(),
            unlimited,
        }
    }

    /// Remaining units of `accel_type`, `u64::MAX` in unlimited mode or when
    /// the type has no entry (per §4.C, absence of a capacity entry and
    /// unlimited mode are both treated as unconstrained).
    pub fn remaining(&self, accel_type: &str) -> u64 {
        if self.unlimited {
            return u64::MAX;
        }
        *self.by_type.get(accel_type).unwrap_or(&0)
    }

    /// Decrements `accel_type` capacity by `units`, saturating at zero.
    /// No-op in unlimited mode.
    pub fn consume(&mut self, accel_type: &str, units: u64) {
        if self.unlimited {
            return;
        }
        if let Some(count) = self.by_type.get_mut(accel_type) {
            *count = count.saturating_sub(units);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_curve_interpolates() {
        let curve = PowerCurve {
            idle_watts: 50.0,
            mid_watts: 150.0,
            full_watts: 300.0,
            mid_util: 0.5,
        };
        assert_eq!(curve.power_at(0.0), 50.0);
        assert_eq!(curve.power_at(0.5), 150.0);
        assert_eq!(curve.power_at(1.0), 300.0);
        assert!((curve.power_at(0.25) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn unlimited_capacity_ignores_map() {
        let cap = AcceleratorCapacity::new([("A100".to_string(), 0)], true);
        assert_eq!(cap.remaining("A100"), u64::MAX);
    }

    #[test]
    fn limited_capacity_consumes() {
        let mut cap = AcceleratorCapacity::new([("A100".to_string(), 4)], false);
        assert_eq!(cap.remaining("A100"), 4);
        cap.consume("A100", 3);
        assert_eq!(cap.remaining("A100"), 1);
        cap.consume("A100", 5);
        assert_eq!(cap.remaining("A100"), 0);
    }
}
