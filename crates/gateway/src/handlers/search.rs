//! Search handler

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;
use std::time::Instant;
use validator::Validate;

use super::params::{SearchParams, YearParams};
use crate::AppState;
use scholarmap_common::{
    errors::{AppError, Result},
    metrics,
};
use scholarmap_search::SearchCountry;

/// Search response
#[derive(Serialize)]
pub struct SearchResponse {
    pub countries: Vec<SearchCountry>,
}

/// Substring search combined with the year filter
pub async fn search(
    State(state): State<AppState>,
    Query(search): Query<SearchParams>,
    Query(params): Query<YearParams>,
) -> Result<Json<SearchResponse>> {
    search.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: Some("q".to_string()),
    })?;
    let filter = params.into_filter()?;
    let query = search.q.unwrap_or_default();

    let start = Instant::now();
    let snapshot = state.store.snapshot();
    let index = state.search.index_for(&snapshot);
    let countries = index.search(&snapshot.model, &query, &filter);
    let elapsed = start.elapsed();

    metrics::record_search(elapsed.as_secs_f64(), !filter.is_all(), countries.len());

    tracing::debug!(
        query = %query,
        filter = %filter,
        results = countries.len(),
        latency_ms = elapsed.as_millis() as u64,
        "Search completed"
    );

    Ok(Json(SearchResponse { countries }))
}
