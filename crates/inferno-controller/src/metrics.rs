//! The external metric (§6): `inferno_desired_replicas{variant_name=...}`,
//! plus the ambient `inferno_cycle_failures_total{stage=...}` counter (§7).

use prometheus::{Encoder, GaugeVec, IntCounterVec, Opts, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    desired_replicas: GaugeVec,
    cycle_failures: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let desired_replicas = GaugeVec::new(
            Opts::new("inferno_desired_replicas", "Desired replica count for a variant, as decided by the autoscaler"),
            &["variant_name"],
        )
        .expect("static metric definition");
        registry
            .register(Box::new(desired_replicas.clone()))
            .expect("single registration");

        let cycle_failures = IntCounterVec::new(
            Opts::new("inferno_cycle_failures_total", "Control loop cycle failures by stage"),
            &["stage"],
        )
        .expect("static metric definition");
        registry
            .register(Box::new(cycle_failures.clone()))
            .expect("single registration");

        Self { registry, desired_replicas, cycle_failures }
    }

    /// Overwrites the gauge for `variant` atomically, per the ordering
    /// guarantee in §5: a cycle's value is visible only once actuation for
    /// that cycle has completed.
    pub fn set_desired_replicas(&self, variant: &str, replicas: u32) {
        self.desired_replicas.with_label_values(&[variant]).set(replicas as f64);
    }

    pub fn record_failure(&self, stage: &str) {
        self.cycle_failures.with_label_values(&[stage]).inc();
    }

    /// Renders the registry in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let families = self.registry.gather();
        let mut buf = Vec::new();
        TextEncoder::new().encode(&families, &mut buf).expect("encoding never fails for valid metrics");
        String::from_utf8(buf).expect("prometheus text format is valid utf8")
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
