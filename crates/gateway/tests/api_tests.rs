//! Integration tests for the gateway API
//!
//! Tests cover:
//! - Health and readiness probes
//! - Hierarchy views with year filters
//! - Search and export
//! - Upload secret checks and dataset publication
//! - Error status mapping

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use scholarmap_common::{config::AppConfig, DatasetStore};
use scholarmap_gateway::{create_router, AppState};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot` method

const SECRET: &str = "open-sesame";
const BOUNDARY: &str = "scholarmap-test-boundary";

const DATASET: &str = "\
Title,Year,Source title,Cited by,DOI,Link,Author,Affiliation,Country
Net zero energy buildings,2025,Energy and Buildings,4,10.1/nzeb,https://x/1,Mohammad Reza Maghami,APU,Malaysia
Net zero energy buildings,2025,Energy and Buildings,4,10.1/nzeb,https://x/1,Ka Fei Thang,APU,Malaysia
Battery ageing,2021,Applied Energy,9,10.1/battery,https://x/2,Wei Zhang,Tsinghua University,China
";

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.upload.secret = Some(SECRET.to_string());
    config.upload.max_bytes = 64 * 1024;
    config.rate_limit.enabled = false;
    config
}

/// Test helper: app with an empty store
fn setup_app(config: AppConfig) -> (Router, Arc<DatasetStore>) {
    let store = Arc::new(DatasetStore::new());
    let state = AppState::new(config, Arc::clone(&store));
    (create_router(state), store)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

/// Test helper: multipart form with optional secret and file fields
fn multipart(uri: &str, secret: Option<&str>, file: Option<(&str, &str)>) -> Request<Body> {
    let mut body = String::new();
    if let Some(secret) = secret {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"secret\"\r\n\r\n{secret}\r\n"
        ));
    }
    if let Some((name, contents)) = file {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\
             Content-Type: text/csv\r\n\r\n{contents}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Test helper: app with `DATASET` already uploaded
async fn loaded_app() -> Router {
    let (app, _) = setup_app(test_config());
    let response = app
        .clone()
        .oneshot(multipart("/api/upload-dataset", Some(SECRET), Some(("scopus.csv", DATASET))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    app
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = setup_app(test_config());
    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_ready_reports_empty_dataset() {
    let (app, _) = setup_app(test_config());
    let response = app.oneshot(get("/ready")).await.unwrap();

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "empty");
    assert_eq!(body["dataset"]["version"], 0);
}

#[tokio::test]
async fn test_metrics_without_recorder_is_not_found() {
    let (app, _) = setup_app(test_config());
    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Read paths
// =============================================================================

#[tokio::test]
async fn test_stats_before_first_upload_are_zero() {
    let (app, _) = setup_app(test_config());
    let response = app.oneshot(get("/api/stats")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["totalPapers"], 0);
    assert_eq!(body["totalCountries"], 0);
    assert_eq!(body["totalCitations"], 0);
}

#[tokio::test]
async fn test_drill_down_after_upload() {
    let app = loaded_app().await;

    let body = extract_json(app.clone().oneshot(get("/api/stats")).await.unwrap().into_body()).await;
    assert_eq!(body["totalPapers"], 2);
    assert_eq!(body["totalAuthors"], 3);
    assert_eq!(body["totalCitations"], 13);

    let body = extract_json(
        app.clone()
            .oneshot(get("/api/data/countries?year=2025"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    let countries = body["countries"].as_array().unwrap();
    assert_eq!(countries.len(), 2);
    assert_eq!(countries[0]["name"], "Malaysia");
    assert_eq!(countries[0]["paperCount"], 1);
    assert_eq!(countries[1]["paperCount"], 0);

    let body = extract_json(app.clone().oneshot(get("/api/data/country/malaysia")).await.unwrap().into_body()).await;
    assert_eq!(body["country"]["universities"][0]["id"], "apu");
    assert_eq!(body["country"]["universities"][0]["authorCount"], 2);

    let body = extract_json(
        app.clone()
            .oneshot(get("/api/data/university/malaysia/apu"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    assert_eq!(body["university"]["country"], "Malaysia");
    let author_id = body["university"]["authors"][0]["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(get(&format!("/api/data/author/malaysia/apu/{author_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["author"]["papers"][0]["title"], "Net zero energy buildings");
}

#[tokio::test]
async fn test_unknown_country_is_not_found() {
    let app = loaded_app().await;
    let response = app.oneshot(get("/api/data/country/atlantis")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["message"], "Country not found");
}

#[tokio::test]
async fn test_year_param_errors() {
    let (app, _) = setup_app(test_config());

    let response = app
        .clone()
        .oneshot(get("/api/stats?start_year=2025&end_year=2021"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "INVALID_RANGE");

    let response = app.oneshot(get("/api/stats?start_year=2021")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_prunes_tree() {
    let app = loaded_app().await;
    let response = app.oneshot(get("/api/search?q=battery")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    let countries = body["countries"].as_array().unwrap();
    assert_eq!(countries.len(), 1);
    assert_eq!(countries[0]["name"], "China");
    assert_eq!(countries[0]["universities"][0]["authors"][0]["name"], "Wei Zhang");
}

#[tokio::test]
async fn test_export_csv() {
    let app = loaded_app().await;
    let response = app.clone().oneshot(get("/api/export/countries")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"countries_all.csv\""
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    let rows: Vec<&str> = csv.lines().skip(1).map(|l| l.split(',').next().unwrap()).collect();
    assert_eq!(rows, vec!["China", "Malaysia"]);

    let response = app.oneshot(get("/api/export/journals")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Upload
// =============================================================================

#[tokio::test]
async fn test_upload_publishes_new_version() {
    let (app, store) = setup_app(test_config());
    let response = app
        .oneshot(multipart("/api/upload-dataset", Some(SECRET), Some(("scopus.csv", DATASET))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["stats"]["totalPapers"], 2);
    assert_eq!(body["report"]["accepted"], 3);

    let snapshot = store.snapshot();
    assert_eq!(snapshot.version, 1);
    assert_eq!(snapshot.source.as_deref(), Some("scopus.csv"));
}

#[tokio::test]
async fn test_upload_with_wrong_secret_is_unauthorized() {
    let (app, store) = setup_app(test_config());
    let response = app
        .oneshot(multipart("/api/upload-dataset", Some("guess"), Some(("scopus.csv", DATASET))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(store.snapshot().version, 0);
}

#[tokio::test]
async fn test_upload_rejects_non_csv() {
    let (app, _) = setup_app(test_config());
    let response = app
        .oneshot(multipart("/api/upload-dataset", Some(SECRET), Some(("scopus.xlsx", DATASET))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_too_large() {
    let mut config = test_config();
    config.upload.max_bytes = 32;
    let (app, _) = setup_app(config);

    let response = app
        .oneshot(multipart("/api/upload-dataset", Some(SECRET), Some(("scopus.csv", DATASET))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_wrong_secret_reported_before_file_problems() {
    let mut config = test_config();
    config.upload.max_bytes = 32;
    let (app, _) = setup_app(config);

    let bad_type = app
        .clone()
        .oneshot(multipart("/api/upload-dataset", Some("guess"), Some(("scopus.xlsx", DATASET))))
        .await
        .unwrap();
    assert_eq!(bad_type.status(), StatusCode::UNAUTHORIZED);

    let too_large = app
        .oneshot(multipart("/api/upload-dataset", Some("guess"), Some(("scopus.csv", DATASET))))
        .await
        .unwrap();
    assert_eq!(too_large.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_during_ingestion_conflicts() {
    let (app, store) = setup_app(test_config());
    let _permit = store.begin_ingestion().unwrap();

    let response = app
        .oneshot(multipart("/api/upload-dataset", Some(SECRET), Some(("scopus.csv", DATASET))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(response.headers().contains_key(header::RETRY_AFTER));
}

#[tokio::test]
async fn test_upload_without_valid_rows_keeps_dataset() {
    let app = loaded_app().await;
    let response = app
        .clone()
        .oneshot(multipart(
            "/api/upload-dataset",
            Some(SECRET),
            Some(("empty.csv", "Title,Year,Author,Affiliation,Country\n,2025,X,APU,Malaysia\n")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(app.oneshot(get("/api/stats")).await.unwrap().into_body()).await;
    assert_eq!(body["totalPapers"], 2);
}

#[tokio::test]
async fn test_validate_upload_secret() {
    let (app, _) = setup_app(test_config());

    let response = app
        .clone()
        .oneshot(multipart("/api/validate-upload-secret", Some(SECRET), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extract_json(response.into_body()).await["valid"], true);

    let response = app
        .oneshot(multipart("/api/validate-upload-secret", Some("guess"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_secret_routes_are_rate_limited() {
    let mut config = test_config();
    config.rate_limit.enabled = true;
    config.rate_limit.requests_per_second = 1;
    config.rate_limit.burst = 1;
    let (app, _) = setup_app(config);

    let first = app
        .clone()
        .oneshot(multipart("/api/validate-upload-secret", Some("guess"), None))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::UNAUTHORIZED);

    let second = app
        .oneshot(multipart("/api/validate-upload-secret", Some("guess"), None))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
}
