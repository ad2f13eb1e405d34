//! ScholarMap offline ingestion
//!
//! Validates a dataset without starting the server:
//!
//! ```text
//! ingest <file.csv>
//! ```
//!
//! Prints the ingestion report as JSON on stdout. Row warnings and progress
//! go to the log on stderr.

use anyhow::{bail, Context};
use chrono::Datelike;
use scholarmap_common::{config::AppConfig, VERSION};
use scholarmap_ingestion::{ingest_csv, IngestionOptions};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration, using defaults: {e}");
        AppConfig::default()
    });

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let Some(path) = std::env::args().nth(1) else {
        bail!("usage: ingest <file.csv>");
    };

    info!("ScholarMap ingest v{} reading {}", VERSION, path);

    let bytes = std::fs::read(&path).with_context(|| format!("failed to read {path}"))?;
    let options = IngestionOptions::from_config(&config, chrono::Utc::now().year());

    let ingested = ingest_csv(&bytes, &options).map_err(|e| {
        error!(error = %e, "Ingestion failed");
        e
    })?;

    println!("{}", serde_json::to_string_pretty(&ingested.report)?);
    Ok(())
}
