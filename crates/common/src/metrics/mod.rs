//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with SLO-aligned histograms
//! and standardized naming conventions.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all ScholarMap metrics
pub const METRICS_PREFIX: &str = "scholarmap";

/// SLO-aligned histogram buckets for request latency (in seconds)
/// Targets: P50 < 10ms, P99 < 100ms for in-memory reads
pub const LATENCY_BUCKETS: &[f64] = &[
    0.0005, // 0.5ms
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms - P50 target
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms - P99 target
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
];

/// Buckets for ingestion latency (whole-dataset rebuilds)
pub const INGESTION_BUCKETS: &[f64] = &[
    0.050, // 50ms
    0.100, // 100ms
    0.250, // 250ms
    0.500, // 500ms
    1.000, // 1s
    2.500, // 2.5s
    5.000, // 5s
    10.00, // 10s
    30.00, // 30s
];

/// Name of the ingestion duration histogram, which uses [`INGESTION_BUCKETS`]
pub fn ingestion_duration_metric() -> String {
    format!("{}_ingestion_duration_seconds", METRICS_PREFIX)
}

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Query metrics
    describe_histogram!(
        format!("{}_query_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Hierarchy query latency in seconds"
    );

    // Search metrics
    describe_counter!(
        format!("{}_search_queries_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of search queries"
    );

    describe_histogram!(
        format!("{}_search_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Search query latency in seconds"
    );

    describe_gauge!(
        format!("{}_search_results_count", METRICS_PREFIX),
        Unit::Count,
        "Number of countries returned from the last search"
    );

    // Ingestion metrics
    describe_counter!(
        format!("{}_ingestions_total", METRICS_PREFIX),
        Unit::Count,
        "Total dataset ingestions by outcome"
    );

    describe_counter!(
        format!("{}_rows_accepted_total", METRICS_PREFIX),
        Unit::Count,
        "Total ingested rows accepted"
    );

    describe_counter!(
        format!("{}_rows_rejected_total", METRICS_PREFIX),
        Unit::Count,
        "Total ingested rows rejected"
    );

    describe_histogram!(
        ingestion_duration_metric(),
        Unit::Seconds,
        "Dataset ingestion latency in seconds"
    );

    // Dataset metrics
    describe_gauge!(
        format!("{}_dataset_version", METRICS_PREFIX),
        Unit::Count,
        "Version of the currently published dataset"
    );

    describe_gauge!(
        format!("{}_dataset_papers", METRICS_PREFIX),
        Unit::Count,
        "Papers in the currently published dataset"
    );

    describe_gauge!(
        format!("{}_dataset_authors", METRICS_PREFIX),
        Unit::Count,
        "Authors in the currently published dataset"
    );

    // Export metrics
    describe_counter!(
        format!("{}_export_rows_total", METRICS_PREFIX),
        Unit::Count,
        "Total rows written by exports"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Helper to record hierarchy query metrics
pub fn record_query(duration_secs: f64, level: &str) {
    histogram!(
        format!("{}_query_duration_seconds", METRICS_PREFIX),
        "level" => level.to_string()
    )
    .record(duration_secs);
}

/// Helper to record search metrics
pub fn record_search(duration_secs: f64, filtered: bool, result_count: usize) {
    let mode = if filtered { "year_filtered" } else { "all_years" };

    counter!(
        format!("{}_search_queries_total", METRICS_PREFIX),
        "mode" => mode
    )
    .increment(1);

    histogram!(
        format!("{}_search_duration_seconds", METRICS_PREFIX),
        "mode" => mode
    )
    .record(duration_secs);

    gauge!(format!("{}_search_results_count", METRICS_PREFIX)).set(result_count as f64);
}

/// Helper to record ingestion metrics
pub fn record_ingestion(duration_secs: f64, accepted: usize, rejected: usize, success: bool) {
    let outcome = if success { "success" } else { "error" };

    counter!(
        format!("{}_ingestions_total", METRICS_PREFIX),
        "outcome" => outcome
    )
    .increment(1);

    counter!(format!("{}_rows_accepted_total", METRICS_PREFIX)).increment(accepted as u64);
    counter!(format!("{}_rows_rejected_total", METRICS_PREFIX)).increment(rejected as u64);

    histogram!(ingestion_duration_metric()).record(duration_secs);
}

/// Helper to record the shape of a newly published dataset
pub fn record_dataset(version: u64, papers: usize, authors: usize) {
    gauge!(format!("{}_dataset_version", METRICS_PREFIX)).set(version as f64);
    gauge!(format!("{}_dataset_papers", METRICS_PREFIX)).set(papers as f64);
    gauge!(format!("{}_dataset_authors", METRICS_PREFIX)).set(authors as f64);
}

/// Helper to record export metrics
pub fn record_export(kind: &str, rows: usize) {
    counter!(
        format!("{}_export_rows_total", METRICS_PREFIX),
        "kind" => kind.to_string()
    )
    .increment(rows as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets() {
        // Verify buckets are sorted and contain SLO targets
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }

        assert!(LATENCY_BUCKETS.contains(&0.010));
        assert!(LATENCY_BUCKETS.contains(&0.100));
    }

    #[test]
    fn test_ingestion_buckets_sorted() {
        assert!(INGESTION_BUCKETS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_request_metrics() {
        let metrics = RequestMetrics::start("GET", "/api/stats");
        metrics.finish(200);
        // No recorder installed; verify it runs without panic
    }
}
