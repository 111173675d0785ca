//! CloudCMS API - REST layer
//!
//! Axum façade over the CloudCMS document store: content entities with
//! soft delete and curation, append-only status and version records with
//! cache-accelerated "latest" lookups, curator registry and usage
//! telemetry. Shared-secret auth guards every versioned route; content and
//! telemetry routes additionally pass the operational status gate.

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;

// Re-export commonly used types
pub use auth::{authenticate, AuthConfig, SharedSecret};
pub use config::{ApiConfig, GeoHeaderNames};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use middleware::{auth_middleware, status_gate_middleware, AuthMiddlewareState};
pub use openapi::ApiDoc;
pub use routes::{create_api_router, CreatedId, SecureRouterBuilder};
pub use state::AppState;
