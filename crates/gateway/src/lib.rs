//! ScholarMap API Gateway
//!
//! HTTP surface of the map service:
//! - Hierarchy views, search and export over the current dataset
//! - Secret-gated dataset upload
//! - Rate limiting on secret-checking routes
//! - Observability (logging, request ids, metrics)

pub mod handlers;
pub mod middleware;
pub mod state;

pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder};
use middleware::{metrics::track_requests, rate_limit::rate_limit};
use scholarmap_common::metrics::{ingestion_duration_metric, INGESTION_BUCKETS, LATENCY_BUCKETS};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

/// Multipart framing allowance on top of the file size limit
pub(crate) const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Prometheus exporter with latency buckets for reads and wider buckets for ingestion
pub fn prometheus_builder() -> Result<PrometheusBuilder, BuildError> {
    PrometheusBuilder::new()
        .set_buckets(LATENCY_BUCKETS)?
        .set_buckets_for_metric(Matcher::Full(ingestion_duration_metric()), INGESTION_BUCKETS)
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let origins = &state.config.server.cors_origins;
    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins.iter().filter_map(|o| o.parse().ok()))
    };
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // Secret-checking routes
    let mut upload_routes = Router::new()
        .route("/upload-dataset", post(handlers::upload::upload_dataset))
        .route("/validate-upload-secret", post(handlers::upload::validate_upload_secret))
        .layer(DefaultBodyLimit::max(
            state.config.upload.max_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
        ));
    if state.config.rate_limit.enabled {
        upload_routes = upload_routes.layer(from_fn_with_state(state.limiter.clone(), rate_limit));
    }

    // API routes
    let api_routes = Router::new()
        .route("/", get(handlers::health::root))
        .route("/stats", get(handlers::data::stats))
        .route("/data/countries", get(handlers::data::countries))
        .route("/data/country/{country_id}", get(handlers::data::country))
        .route(
            "/data/university/{country_id}/{university_id}",
            get(handlers::data::university),
        )
        .route(
            "/data/author/{country_id}/{university_id}/{author_id}",
            get(handlers::data::author),
        )
        .route("/search", get(handlers::search::search))
        .route("/export/{kind}", get(handlers::export::export))
        .merge(upload_routes);

    // Compose the app
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .route("/metrics", get(handlers::health::metrics))
        .nest("/api", api_routes)
        .layer(from_fn(track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}
