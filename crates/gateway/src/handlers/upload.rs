//! Dataset upload handlers
//!
//! Both routes take a multipart form carrying the shared upload `secret`;
//! the upload route also takes the CSV as the `file` field. A successful
//! upload replaces the published dataset in one step.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use chrono::Datelike;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::time::Instant;

use crate::AppState;
use scholarmap_common::{
    config::AppConfig,
    errors::{AppError, Result},
    metrics, YearFilter,
};
use scholarmap_ingestion::{ingest_csv, IngestionOptions, IngestionReport};
use scholarmap_search::{QueryEngine, Stats};

const ALLOWED_EXTENSIONS: &[&str] = &["csv"];

#[derive(Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub stats: Stats,
    pub report: IngestionReport,
}

#[derive(Serialize)]
pub struct ValidateSecretResponse {
    pub valid: bool,
}

/// Uploaded file held in memory
struct UploadedFile {
    name: String,
    bytes: Vec<u8>,
}

/// Map multipart failures; `limit` is the configured file size limit
fn multipart_error(limit: usize) -> impl Fn(MultipartError) -> AppError + Copy {
    move |error| {
        if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
            // The body limit sits above the file limit, so the file is over it too
            AppError::PayloadTooLarge {
                size: limit.saturating_add(crate::MULTIPART_OVERHEAD_BYTES),
                limit,
                unit: "bytes",
            }
        } else {
            AppError::Validation {
                message: format!("Invalid multipart body: {}", error.body_text()),
                field: None,
            }
        }
    }
}

/// Compare secrets through fixed-length digests
fn verify_secret(config: &AppConfig, provided: Option<&str>) -> Result<()> {
    let Some(expected) = config.upload.secret.as_deref().filter(|s| !s.is_empty()) else {
        return Err(AppError::Unauthorized {
            message: "Uploads are disabled".to_string(),
        });
    };
    let provided = provided.unwrap_or_default();

    if Sha256::digest(expected.as_bytes()) == Sha256::digest(provided.as_bytes()) {
        Ok(())
    } else {
        Err(AppError::Unauthorized {
            message: "Invalid upload secret".to_string(),
        })
    }
}

fn check_extension(file_name: &str) -> Result<()> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(AppError::InvalidFileType {
            message: format!("Expected a .csv file, got '{}'", file_name),
        })
    }
}

async fn read_file(field: &mut axum::extract::multipart::Field<'_>, limit: usize) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error(limit))? {
        let size = bytes.len() + chunk.len();
        if size > limit {
            return Err(AppError::PayloadTooLarge {
                size,
                limit,
                unit: "bytes",
            });
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

async fn read_upload(field: &mut axum::extract::multipart::Field<'_>, limit: usize) -> Result<UploadedFile> {
    let name = field.file_name().unwrap_or_default().to_string();
    check_extension(&name)?;
    let bytes = read_file(field, limit).await?;
    Ok(UploadedFile { name, bytes })
}

/// Validate, ingest and publish a new dataset.
///
/// The secret is checked before any file problem is reported, so a caller
/// with the wrong secret always gets 401.
pub async fn upload_dataset(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<UploadResponse>> {
    let mut secret: Option<String> = None;
    let mut file: Option<Result<UploadedFile>> = None;

    let limit = state.config.upload.max_bytes;
    let body_error = multipart_error(limit);

    loop {
        let next = match multipart.next_field().await {
            Ok(next) => next,
            // A rejected file may leave the rest of the body unreadable
            Err(_) if matches!(file, Some(Err(_))) => break,
            Err(e) => return Err(body_error(e)),
        };
        let Some(mut field) = next else {
            break;
        };

        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "secret" => secret = Some(field.text().await.map_err(body_error)?),
            "file" => file = Some(read_upload(&mut field, limit).await),
            _ => {}
        }
    }

    verify_secret(&state.config, secret.as_deref())?;
    let file = file.ok_or_else(|| AppError::Validation {
        message: "Missing file".to_string(),
        field: Some("file".to_string()),
    })??;

    let permit = state.store.begin_ingestion()?;
    tracing::info!(file = %file.name, bytes = file.bytes.len(), "Dataset upload accepted");

    let options = IngestionOptions::from_config(&state.config, chrono::Utc::now().year());
    let start = Instant::now();
    let UploadedFile { name, bytes } = file;

    let outcome = tokio::task::spawn_blocking(move || ingest_csv(&bytes, &options))
        .await
        .map_err(|e| AppError::Internal {
            message: format!("Ingestion task failed: {}", e),
        })?;

    let ingested = match outcome {
        Ok(ingested) => ingested,
        Err(e) => {
            metrics::record_ingestion(start.elapsed().as_secs_f64(), 0, 0, false);
            return Err(e.into());
        }
    };
    metrics::record_ingestion(
        start.elapsed().as_secs_f64(),
        ingested.report.accepted,
        ingested.report.rejected,
        true,
    );

    let report = ingested.report;
    let snapshot = state.store.publish(permit, ingested.model, Some(name));
    metrics::record_dataset(
        snapshot.version,
        snapshot.model.paper_count(),
        snapshot.model.author_count(),
    );

    let stats = QueryEngine::new(&snapshot.model, YearFilter::All).stats();
    let message = format!(
        "Loaded {} papers from {} rows ({} skipped)",
        stats.total_papers, report.accepted, report.rejected
    );

    Ok(Json(UploadResponse {
        success: true,
        message,
        stats,
        report,
    }))
}

/// Check the upload secret without uploading anything
pub async fn validate_upload_secret(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ValidateSecretResponse>> {
    let body_error = multipart_error(state.config.upload.max_bytes);
    let mut secret: Option<String> = None;
    while let Some(field) = multipart.next_field().await.map_err(body_error)? {
        if field.name() == Some("secret") {
            secret = Some(field.text().await.map_err(body_error)?);
        }
    }

    verify_secret(&state.config, secret.as_deref())?;
    Ok(Json(ValidateSecretResponse { valid: true }))
}
