//! Prometheus Metrics Definitions
//!
//! Defines all CloudCMS metrics with appropriate labels and types.
//! Exposes a /metrics endpoint for Prometheus scraping.

use std::time::Instant;

use axum::{http::StatusCode, response::IntoResponse};
use cloudcms_core::CmsResult;
use once_cell::sync::Lazy;
use prometheus::{
    register_counter, register_counter_vec, register_histogram_vec, Counter, CounterVec, Encoder,
    HistogramVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
/// Covers: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Store operation latency buckets (seconds)
const STORE_LATENCY_BUCKETS: &[f64] =
    &[0.0005, 0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5];

/// Global metrics instance - initialized once at startup
pub static METRICS: Lazy<ApiResult<CmsMetrics>> = Lazy::new(CmsMetrics::new);

/// Container for all CloudCMS metrics.
#[derive(Clone)]
pub struct CmsMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Store operation counter - labels: operation, kind, outcome
    pub store_operations_total: CounterVec,

    /// Store operation duration histogram - labels: operation, kind
    pub store_operation_duration_seconds: HistogramVec,

    /// Latest-value cache lookups - labels: key, result (hit/miss/error)
    pub cache_lookups_total: CounterVec,

    /// Requests refused because the operational status is not OK
    pub gate_rejections_total: Counter,
}

impl CmsMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "cloudcms_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_requests_total: {}", e)))?,

            http_request_duration_seconds: register_histogram_vec!(
                "cloudcms_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| {
                ApiError::internal_error(format!("Failed to register http_request_duration_seconds: {}", e))
            })?,

            store_operations_total: register_counter_vec!(
                "cloudcms_store_operations_total",
                "Total number of document store operations",
                &["operation", "kind", "outcome"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register store_operations_total: {}", e)))?,

            store_operation_duration_seconds: register_histogram_vec!(
                "cloudcms_store_operation_duration_seconds",
                "Document store operation duration in seconds",
                &["operation", "kind"],
                STORE_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| {
                ApiError::internal_error(format!("Failed to register store_operation_duration_seconds: {}", e))
            })?,

            cache_lookups_total: register_counter_vec!(
                "cloudcms_cache_lookups_total",
                "Latest-value cache lookups",
                &["key", "result"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register cache_lookups_total: {}", e)))?,

            gate_rejections_total: register_counter!(
                "cloudcms_gate_rejections_total",
                "Requests refused by the operational status gate"
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register gate_rejections_total: {}", e)))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record a document store operation.
    pub fn record_store_operation(&self, operation: &str, kind: &str, outcome: &str, duration_secs: f64) {
        self.store_operations_total
            .with_label_values(&[operation, kind, outcome])
            .inc();
        self.store_operation_duration_seconds
            .with_label_values(&[operation, kind])
            .observe(duration_secs);
    }

    /// Record a cache lookup outcome.
    pub fn record_cache_lookup(&self, key: &str, result: &str) {
        self.cache_lookups_total.with_label_values(&[key, result]).inc();
    }

    pub fn record_gate_rejection(&self) {
        self.gate_rejections_total.inc();
    }
}

// ============================================================================
// RECORDING HELPERS
// ============================================================================

/// Time a store call and record its outcome.
///
/// Over-quota failures get their own outcome label so capacity exhaustion
/// is visible separately from other errors.
pub async fn timed_store_op<T, F>(operation: &str, kind: &str, fut: F) -> CmsResult<T>
where
    F: std::future::Future<Output = CmsResult<T>>,
{
    let start = Instant::now();
    let result = fut.await;
    if let Ok(metrics) = METRICS.as_ref() {
        let outcome = match &result {
            Ok(_) => "success",
            Err(cloudcms_core::CmsError::Storage(e)) if e.is_over_quota() => "over_quota",
            Err(_) => "error",
        };
        metrics.record_store_operation(operation, kind, outcome, start.elapsed().as_secs_f64());
    }
    result
}

pub fn record_cache_lookup(key: &str, result: &str) {
    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_cache_lookup(key, result);
    }
}

pub fn record_gate_rejection() {
    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_gate_rejection();
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 500, description = "Failed to encode metrics"),
    ),
)]
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}
