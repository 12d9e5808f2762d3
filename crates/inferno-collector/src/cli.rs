use clap::Parser;

/// Collector service (§6): reports variant state and observed load for the
/// Inferno autoscaler.
#[derive(Debug, Parser)]
#[command(name = "inferno-collector", version, about)]
pub struct Cli {
    /// Host to bind to.
    #[arg(long, env = "INFERNO_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind to.
    #[arg(long, env = "INFERNO_PORT", default_value_t = 8081)]
    pub port: u16,

    /// Directory holding the collector's data document (`variants.json` or
    /// `variants.yaml`).
    #[arg(long, env = "INFERNO_DATA_PATH", default_value = "./data")]
    pub data_path: String,
}
