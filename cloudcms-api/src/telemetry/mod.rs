//! CloudCMS Telemetry - Observability Infrastructure
//!
//! Structured logging and Prometheus metrics for the API layer.

pub mod metrics;
pub mod middleware;
pub mod tracer;

pub use metrics::{metrics_handler, CmsMetrics, METRICS};
pub use middleware::observability_middleware;
pub use tracer::init_tracing;
