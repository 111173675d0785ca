//! Health Check Endpoints
//!
//! - /health/live - Process alive check
//! - /health/ready - Store and cache probes
//!
//! No authentication required for health endpoints.

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use cloudcms_core::{ComponentHealth, HealthReport};

use crate::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Key probed on the cache. Never written.
const CACHE_PROBE_KEY: &str = "healthprobe";

/// GET /health/live - Process liveness check
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Process is alive", body = HealthReport),
    ),
)]
pub async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthReport::from_components(VERSION, Vec::new())))
}

/// GET /health/ready - Readiness check
///
/// The store is required; a failing cache only degrades the service since
/// every cache miss falls back to the store.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = HealthReport),
        (status = 503, description = "Service is not ready", body = HealthReport),
    ),
)]
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let store = match state.store.health_check().await {
        Ok(()) => ComponentHealth::healthy("store").with_latency(start.elapsed().as_millis() as u64),
        Err(e) => ComponentHealth::unhealthy("store", e.to_string()),
    };

    let start = Instant::now();
    let cache = match state.cache.get(CACHE_PROBE_KEY).await {
        Ok(_) => ComponentHealth::healthy("cache").with_latency(start.elapsed().as_millis() as u64),
        Err(e) => ComponentHealth::degraded("cache", e.to_string()),
    };

    let report = HealthReport::from_components(VERSION, vec![store, cache]);
    let status_code = if report.is_ready() {
        StatusCode::OK
    } else {
        tracing::warn!(status = ?report.status, "Readiness check failed");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(report))
}

/// Create health check router (no auth required)
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use axum::body::Body;
    use axum::http::Request;
    use cloudcms_core::HealthStatus;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_ready_with_in_memory_backends() {
        let app = create_router(AppState::in_memory(ApiConfig::default()));
        let response = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let report: HealthReport = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(report.status, HealthStatus::Healthy);
        assert_eq!(report.components.len(), 2);
    }

    #[tokio::test]
    async fn test_live_always_ok() {
        let app = create_router(AppState::in_memory(ApiConfig::default()));
        let response = app
            .oneshot(Request::builder().uri("/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
