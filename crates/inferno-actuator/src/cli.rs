use clap::Parser;

/// Actuator service (§6): applies desired accelerator/replica allocations.
#[derive(Debug, Parser)]
#[command(name = "inferno-actuator", version, about)]
pub struct Cli {
    /// Host to bind to.
    #[arg(long, env = "INFERNO_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind to.
    #[arg(long, env = "INFERNO_PORT", default_value_t = 8082)]
    pub port: u16,

    /// Directory the actuator writes its last-applied document into
    /// (`applied.json`), so `/update` has somewhere durable to record what
    /// it was told to do.
    #[arg(long, env = "INFERNO_DATA_PATH", default_value = "./data")]
    pub data_path: String,
}
