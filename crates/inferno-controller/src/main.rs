mod cli;
mod config;
mod cycle;
mod error;
mod metrics;
mod routes;
mod state;
mod types;

use clap::Parser;
use cli::Cli;
use state::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let data_path = PathBuf::from(&cli.data_path);
    let catalogs = match config::load_static(&data_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("initial configuration load failed: {e}");
            std::process::exit(1);
        }
    };

    let state = Arc::new(AppState::new(
        data_path,
        cli.dynamic,
        cli.collector_host.clone(),
        cli.actuator_host.clone(),
        cli.optimizer_host.clone(),
        Duration::from_millis(cli.rpc_timeout_ms),
        catalogs,
    ));

    let shutdown = CancellationToken::new();

    if cli.control_period > 0 {
        let periodic_state = state.clone();
        let periodic_shutdown = shutdown.clone();
        let period = Duration::from_secs(cli.control_period);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let _ = cycle::run_cycle(periodic_state.clone(), periodic_shutdown.clone()).await;
                    }
                    _ = periodic_shutdown.cancelled() => break,
                }
            }
        });
    }

    let app = axum::Router::new()
        .route("/health", axum::routing::get(routes::health))
        .route("/invoke", axum::routing::get(routes::invoke))
        .route("/metrics", axum::routing::get(routes::metrics))
        .route("/status", axum::routing::get(routes::status))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(%addr, period_s = cli.control_period, dynamic = cli.dynamic, "inferno-controller listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
    {
        eprintln!("server error: {e}");
        std::process::exit(1);
    }
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received, draining in-flight cycle");
    shutdown.cancel();
}
