use clap::Parser;

/// Control loop service (§4.H): drives collect -> analyze -> optimize ->
/// arbitrate -> actuate cycles, both periodically and on demand.
#[derive(Debug, Parser)]
#[command(name = "inferno-controller", version, about)]
pub struct Cli {
    /// Host to bind to.
    #[arg(long, env = "INFERNO_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind to.
    #[arg(long, env = "INFERNO_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Directory holding the static catalogs (accelerators, models,
    /// classes, optimizer/saturation options). Reloaded every cycle only
    /// when `--dynamic` is set; read once at startup otherwise.
    #[arg(long, env = "INFERNO_DATA_PATH", default_value = "./data")]
    pub data_path: String,

    /// Seconds between periodic cycles; 0 disables the periodic path
    /// (aperiodic `/invoke` triggers still run).
    #[arg(long, env = "INFERNO_CONTROL_PERIOD", default_value_t = 60)]
    pub control_period: u64,

    /// Reload static configuration from `data_path` every cycle instead of
    /// once at startup.
    #[arg(long, env = "INFERNO_CONTROL_DYNAMIC", default_value_t = false)]
    pub dynamic: bool,

    /// Collector base URL.
    #[arg(long, env = "INFERNO_COLLECTOR_HOST", default_value = "http://127.0.0.1:8081")]
    pub collector_host: String,

    /// Actuator base URL.
    #[arg(long, env = "INFERNO_ACTUATOR_HOST", default_value = "http://127.0.0.1:8082")]
    pub actuator_host: String,

    /// Optimizer base URL.
    #[arg(long, env = "INFERNO_OPTIMIZER_HOST", default_value = "http://127.0.0.1:8083")]
    pub optimizer_host: String,

    /// Per-RPC timeout, in milliseconds, for Collector/Actuator/Optimizer calls.
    #[arg(long, env = "INFERNO_RPC_TIMEOUT_MS", default_value_t = 5_000)]
    pub rpc_timeout_ms: u64,
}
