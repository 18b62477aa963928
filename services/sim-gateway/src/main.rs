//! 1NCE SIM Dashboard Gateway
//!
//! Single-binary Rust service that:
//! 1. Authenticates against the management API (client-credentials grant,
//!    token cached in-process with an expiry safety margin)
//! 2. Listens for dashboard requests
//! 3. Answers with SIM fleet data normalized into stable row shapes

mod config;
mod error;
mod metrics;
mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use metrics_exporter_prometheus::PrometheusHandle;
use nce_client::ApiClient;

use crate::config::Config;

/// Shared application state accessible from all handlers
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<ApiClient>,
    pub prometheus: PrometheusHandle,
}

/// Build the axum router with all routes and shared state.
///
/// Applies a concurrency limit layer based on `max_connections` and the
/// per-request metrics middleware.
fn build_router(state: AppState, max_connections: usize) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/sims", get(routes::list_sims))
        .route("/sims/all", get(routes::list_all_sims))
        .route("/sims/{iccid}", get(routes::sim_details))
        .route("/sims/{iccid}/quota", get(routes::sim_quota))
        .route("/sims/{iccid}/usage", get(routes::sim_usage))
        .route("/sims/{iccid}/sms", get(routes::sim_sms))
        .route("/sims/{iccid}/events", get(routes::sim_events))
        .route("/sims-status-summary", get(routes::sims_status_summary))
        .route("/metrics", get(routes::metrics))
        .layer(axum::middleware::from_fn(metrics::track))
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_connections))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting nce-sim-gateway");

    // Install Prometheus metrics recorder before any metrics are emitted
    let prometheus = metrics::install_recorder();

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config_path = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        listen_addr = %config.server.listen_addr,
        base_url = %config.upstream.base_url,
        page_size = config.upstream.page_size,
        max_pages = config.upstream.max_pages,
        "configuration loaded"
    );

    let client = Arc::new(ApiClient::new(config.client_config()?));

    let state = AppState { client, prometheus };
    let app = build_router(state, config.server.max_connections);

    let listener = TcpListener::bind(config.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.server.listen_addr))?;

    info!(addr = %config.server.listen_addr, "accepting requests");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
