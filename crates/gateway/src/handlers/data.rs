//! Hierarchy view handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use std::time::Instant;

use super::params::YearParams;
use crate::AppState;
use scholarmap_common::{errors::Result, metrics};
use scholarmap_search::{AuthorDetail, CountryDetail, CountrySummary, QueryEngine, Stats, UniversityDetail};

#[derive(Serialize)]
pub struct CountriesResponse {
    pub countries: Vec<CountrySummary>,
}

#[derive(Serialize)]
pub struct CountryResponse {
    pub country: CountryDetail,
}

#[derive(Serialize)]
pub struct UniversityResponse {
    pub university: UniversityDetail,
}

#[derive(Serialize)]
pub struct AuthorResponse {
    pub author: AuthorDetail,
}

/// Run one query against the current snapshot and time it
fn run<T>(state: &AppState, params: YearParams, level: &str, query: impl FnOnce(&QueryEngine<'_>) -> Result<T>) -> Result<T> {
    let filter = params.into_filter()?;
    let snapshot = state.store.snapshot();
    let start = Instant::now();

    let engine = QueryEngine::new(&snapshot.model, filter);
    let result = query(&engine);

    metrics::record_query(start.elapsed().as_secs_f64(), level);
    result
}

/// Global totals
pub async fn stats(State(state): State<AppState>, Query(params): Query<YearParams>) -> Result<Json<Stats>> {
    run(&state, params, "stats", |engine| Ok(engine.stats())).map(Json)
}

/// Every country with its paper count
pub async fn countries(
    State(state): State<AppState>,
    Query(params): Query<YearParams>,
) -> Result<Json<CountriesResponse>> {
    let countries = run(&state, params, "countries", |engine| Ok(engine.countries()))?;
    Ok(Json(CountriesResponse { countries }))
}

pub async fn country(
    State(state): State<AppState>,
    Path(country_id): Path<String>,
    Query(params): Query<YearParams>,
) -> Result<Json<CountryResponse>> {
    let country = run(&state, params, "country", |engine| engine.country(&country_id))?;
    Ok(Json(CountryResponse { country }))
}

pub async fn university(
    State(state): State<AppState>,
    Path((country_id, university_id)): Path<(String, String)>,
    Query(params): Query<YearParams>,
) -> Result<Json<UniversityResponse>> {
    let university = run(&state, params, "university", |engine| {
        engine.university(&country_id, &university_id)
    })?;
    Ok(Json(UniversityResponse { university }))
}

pub async fn author(
    State(state): State<AppState>,
    Path((country_id, university_id, author_id)): Path<(String, String, String)>,
    Query(params): Query<YearParams>,
) -> Result<Json<AuthorResponse>> {
    let author = run(&state, params, "author", |engine| {
        engine.author(&country_id, &university_id, &author_id)
    })?;
    Ok(Json(AuthorResponse { author }))
}
