use clap::Parser;

/// Standalone optimizer service (§2 ambient): wraps the optimizer engine
/// (component F) as its own REST API, independent of the control loop.
#[derive(Debug, Parser)]
#[command(name = "inferno-optimizer", version, about)]
pub struct Cli {
    /// Host to bind to.
    #[arg(long, env = "INFERNO_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind to.
    #[arg(long, env = "INFERNO_PORT", default_value_t = 8083)]
    pub port: u16,
}
