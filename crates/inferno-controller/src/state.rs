use crate::config::StaticCatalogs;
use crate::metrics::Metrics;
use crate::types::CycleStatus;
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// Shared control-loop state. `catalogs` is swapped wholesale on every
/// dynamic-mode reload so readers never observe a half-updated catalog
/// (design note: no global mutable singleton, the `System` built from these
/// catalogs is an explicit per-cycle value).
pub struct AppState {
    pub data_path: PathBuf,
    pub dynamic: bool,
    pub collector_url: String,
    pub actuator_url: String,
    /// Base URL of the standalone `inferno-optimizer` service; unused by
    /// the in-process cycle (which runs `GreedySolver` directly) but kept
    /// configured so a future cycle can delegate to it without a CLI change.
    #[allow(dead_code)]
    pub optimizer_url: String,
    pub rpc_timeout: Duration,

    pub http: reqwest::Client,
    pub catalogs: ArcSwap<StaticCatalogs>,

    /// Single-cycle exclusion gate (§5): held for the duration of a cycle;
    /// a concurrent trigger waits rather than being rejected.
    pub cycle_gate: Mutex<()>,
    pub cycle_number: AtomicU64,
    pub status: RwLock<CycleStatus>,
    /// Prior cycle's final arbitrated target per variant (§4.G step 5: "or
    /// preserved prior desired count if it differs from current").
    pub prior_desired: RwLock<HashMap<String, u32>>,

    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        data_path: PathBuf,
        dynamic: bool,
        collector_url: String,
        actuator_url: String,
        optimizer_url: String,
        rpc_timeout: Duration,
        catalogs: StaticCatalogs,
    ) -> Self {
        Self {
            data_path,
            dynamic,
            collector_url,
            actuator_url,
            optimizer_url,
            rpc_timeout,
            http: reqwest::Client::new(),
            catalogs: ArcSwap::from_pointee(catalogs),
            cycle_gate: Mutex::new(()),
            cycle_number: AtomicU64::new(0),
            status: RwLock::new(CycleStatus::default()),
            prior_desired: RwLock::new(HashMap::new()),
            metrics: Metrics::new(),
        }
    }

    pub fn next_cycle_number(&self) -> u64 {
        self.cycle_number.fetch_add(1, Ordering::SeqCst) + 1
    }
}
