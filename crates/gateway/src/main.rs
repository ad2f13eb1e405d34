//! ScholarMap API Gateway
//!
//! Serves the map's data API. On startup an initial dataset is ingested when
//! `dataset.initial_path` is configured; otherwise the service starts empty
//! and waits for an upload.

use anyhow::Context;
use chrono::Datelike;
use metrics_exporter_prometheus::PrometheusHandle;
use scholarmap_common::{
    config::{AppConfig, ObservabilityConfig},
    metrics, DatasetStore, VERSION,
};
use scholarmap_gateway::{create_router, prometheus_builder, AppState};
use scholarmap_ingestion::{ingest_csv, IngestionOptions};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate()?;

    init_tracing(&config.observability);
    info!("Starting ScholarMap API Gateway v{}", VERSION);

    if config.upload.secret.is_none() {
        warn!("No upload secret configured, dataset uploads are disabled");
    }

    // Initialize metrics
    let prometheus = if config.observability.metrics_enabled {
        let handle = install_prometheus()?;
        metrics::register_metrics();
        Some(handle)
    } else {
        None
    };

    let store = Arc::new(DatasetStore::new());
    if let Some(path) = config.dataset.initial_path.clone() {
        let loader_config = config.clone();
        let loader_store = Arc::clone(&store);
        tokio::task::spawn_blocking(move || load_initial_dataset(&loader_config, &loader_store, &path))
            .await
            .context("initial dataset loader panicked")?;
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server.host/server.port")?;
    let shutdown_timeout = config.shutdown_timeout();

    // Create app state
    let mut state = AppState::new(config, store);
    if let Some(handle) = prometheus {
        state = state.with_metrics(handle);
    }

    // Build the router
    let app = create_router(state);

    // Start the server
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    if config.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn install_prometheus() -> anyhow::Result<PrometheusHandle> {
    prometheus_builder()
        .context("invalid histogram buckets")?
        .install_recorder()
        .context("failed to install Prometheus recorder")
}

/// Ingest the configured startup dataset. Failures are logged and the
/// service starts empty.
fn load_initial_dataset(config: &AppConfig, store: &DatasetStore, path: &str) {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(path = %path, error = %e, "Failed to read initial dataset");
            return;
        }
    };

    let options = IngestionOptions::from_config(config, chrono::Utc::now().year());
    let ingested = match ingest_csv(&bytes, &options) {
        Ok(ingested) => ingested,
        Err(e) => {
            error!(path = %path, error = %e, "Failed to ingest initial dataset");
            return;
        }
    };

    match store.begin_ingestion() {
        Ok(permit) => {
            let snapshot = store.publish(permit, ingested.model, Some(path.to_string()));
            metrics::record_dataset(
                snapshot.version,
                snapshot.model.paper_count(),
                snapshot.model.author_count(),
            );
            info!(
                path = %path,
                accepted = ingested.report.accepted,
                rejected = ingested.report.rejected,
                "Initial dataset loaded"
            );
        }
        Err(e) => warn!(error = %e, "Initial dataset skipped, an upload is already in progress"),
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout: std::time::Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }

    // Force exit if in-flight requests outlive the grace period
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        warn!("Shutdown timeout elapsed, exiting");
        std::process::exit(1);
    });
}
