//! Axum Middleware for HTTP Request Tracing and Metrics
//!
//! Wraps every request in a tracing span, records Prometheus metrics and
//! logs completion.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use tracing::{info_span, Instrument};

use super::metrics::METRICS;

/// Route label for requests that matched no route.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Route template for metrics and spans.
///
/// Uses the matched route (`/v1/chart/:id`), never the raw path, so label
/// cardinality is bounded by the route table.
pub fn route_label(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string())
}

/// Observability middleware for Axum.
///
/// Must be installed with `Router::layer` so the matched route is known.
pub async fn observability_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let route = route_label(&request);

    let span = info_span!(
        "http_request",
        http.method = %method,
        http.target = %path,
        http.route = %route,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    let status = response.status();

    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_http_request(
            method.as_str(),
            &route,
            status.as_u16(),
            duration.as_secs_f64(),
        );
    }

    tracing::info!(
        method = %method,
        path = %path,
        route = %route,
        status = status.as_u16(),
        duration_ms = duration.as_millis() as u64,
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware::from_fn, routing::get, Router};
    use tower::ServiceExt;

    async fn echo_route(request: Request, next: Next) -> Response {
        let route = route_label(&request);
        let mut response = next.run(request).await;
        if let Ok(value) = route.parse() {
            response.headers_mut().insert("x-route", value);
        }
        response
    }

    async fn route_for(uri: &str) -> String {
        let app = Router::new()
            .route("/v1/chart/:id", get(|| async { "ok" }))
            .layer(from_fn(echo_route));
        let response = app
            .oneshot(axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        response
            .headers()
            .get("x-route")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[tokio::test]
    async fn test_matched_route_is_the_template() {
        assert_eq!(route_for("/v1/chart/12345").await, "/v1/chart/:id");
    }

    #[tokio::test]
    async fn test_unmatched_paths_share_one_label() {
        assert_eq!(route_for("/random/abc123").await, UNMATCHED_ROUTE);
        assert_eq!(route_for("/v1/chart/1/extra").await, UNMATCHED_ROUTE);
    }
}
