//! Health check handlers

use axum::{extract::State, http::header, response::IntoResponse, Json};
use serde::Serialize;

use crate::AppState;
use scholarmap_common::{
    errors::{AppError, Result},
    store::SnapshotInfo,
    VERSION,
};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub dataset: SnapshotInfo,
}

#[derive(Serialize)]
pub struct RootResponse {
    pub message: String,
}

/// Liveness probe - always returns healthy if server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: VERSION.to_string(),
    })
}

/// Readiness probe - reports the published dataset.
///
/// The service answers with an empty dataset before the first upload, so it
/// is always ready; `status` tells whether data has been loaded.
pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    let snapshot = state.store.snapshot();
    let status = if snapshot.version == 0 { "empty" } else { "ready" };

    Json(ReadyResponse {
        status: status.to_string(),
        dataset: snapshot.info(),
    })
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "ScholarMap API".to_string(),
    })
}

/// Prometheus scrape endpoint
pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let handle = state
        .metrics
        .as_ref()
        .ok_or_else(|| AppError::not_found("Metrics", "recorder"))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholarmap_common::{config::AppConfig, DatasetStore};
    use std::sync::Arc;

    #[test]
    fn test_health_reports_version() {
        let Json(body) = tokio_test::block_on(health());
        assert_eq!(body.status, "healthy");
        assert_eq!(body.version, VERSION);
    }

    #[test]
    fn test_ready_before_first_upload() {
        let state = AppState::new(AppConfig::default(), Arc::new(DatasetStore::new()));
        let Json(body) = tokio_test::block_on(ready(State(state)));
        assert_eq!(body.status, "empty");
        assert_eq!(body.dataset.version, 0);
    }
}
