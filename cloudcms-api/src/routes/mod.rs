//! REST API Routes Module
//!
//! Route handlers organized by resource:
//! - Content entities (chart, gchart, usermetric), gated by operational status
//! - Telemetry, gated by operational status
//! - Curators, status and versions, never gated
//! - Health checks and metrics, unauthenticated
//! - CORS support for browser-based clients

pub mod content;
pub mod curator;
pub mod health;
pub mod params;
pub mod status;
pub mod telemetry;
pub mod version;

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use cloudcms_core::{ChartPayload, GChartPayload, UserMetricPayload};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;

use crate::auth::AuthConfig;
use crate::config::ApiConfig;
use crate::constants::API_PREFIX;
use crate::middleware::{auth_middleware, status_gate_middleware, AuthMiddlewareState};
use crate::openapi::ApiDoc;
use crate::state::AppState;
use crate::telemetry::{metrics_handler, observability_middleware};

/// Body of every create response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreatedId {
    pub id: i64,
}

// ============================================================================
// OPENAPI ENDPOINTS
// ============================================================================

/// Handler for /openapi.json endpoint.
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ============================================================================
// SECURE ROUTER BUILDER
// ============================================================================

/// Builder for the API router with auth and the status gate wired in.
///
/// Every route under `/v1` requires the shared secret. Content and
/// telemetry routes additionally pass the status gate. Health, metrics and
/// the OpenAPI document are public.
pub struct SecureRouterBuilder {
    state: AppState,
    auth_state: AuthMiddlewareState,
}

impl SecureRouterBuilder {
    pub fn new(state: AppState, auth_config: AuthConfig) -> Self {
        Self {
            state,
            auth_state: AuthMiddlewareState::new(auth_config),
        }
    }

    /// Routes that refuse traffic while the operational status is not OK.
    fn build_gated_routes(&self) -> Router {
        Router::new()
            .merge(content::create_router::<ChartPayload>(self.state.clone()))
            .merge(content::create_router::<GChartPayload>(self.state.clone()))
            .merge(content::create_router::<UserMetricPayload>(self.state.clone()))
            .merge(telemetry::create_router(self.state.clone()))
            .layer(from_fn_with_state(self.state.clone(), status_gate_middleware))
    }

    /// Routes that must stay reachable during an outage.
    fn build_open_routes(&self) -> Router {
        Router::new()
            .merge(curator::create_router(self.state.clone()))
            .merge(status::create_router(self.state.clone()))
            .merge(version::create_router(self.state.clone()))
    }

    /// Build the complete router.
    ///
    /// # Middleware Order (outer to inner)
    /// 1. CORS (outermost) - handles preflight requests
    /// 2. Observability - tracing and metrics
    /// 3. Auth (only on /v1/*) - validates the shared secret
    /// 4. Status gate (only on content and telemetry)
    pub fn build(self) -> Router {
        let api_routes = self
            .build_gated_routes()
            .merge(self.build_open_routes())
            .layer(from_fn_with_state(self.auth_state.clone(), auth_middleware));

        #[allow(unused_mut)]
        let mut router = Router::new()
            .nest(API_PREFIX, api_routes)
            // Health checks (no auth required)
            .nest("/health", health::create_router(self.state.clone()))
            // Metrics endpoint (no auth)
            .route("/metrics", get(metrics_handler))
            // OpenAPI document
            .route("/openapi.json", get(openapi_json));

        #[cfg(feature = "swagger-ui")]
        {
            use utoipa_swagger_ui::SwaggerUi;
            router = router.merge(SwaggerUi::new("/swagger-ui").url("/openapi.json", ApiDoc::openapi()));
        }

        let cors = build_cors_layer(&self.state.config);

        router.layer(from_fn(observability_middleware)).layer(cors)
    }
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// With no configured origins every origin is allowed.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: allowing all origins");
        cors.allow_origin(Any).allow_headers(Any).expose_headers(Any)
    } else {
        tracing::info!("CORS: allowing origins: {:?}", config.cors_origins);
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Create the complete API router.
///
/// - REST routes under /v1/* (shared-secret auth)
/// - Health checks at /health/* (public)
/// - Metrics at /metrics (public)
/// - OpenAPI document at /openapi.json
/// - Swagger UI at /swagger-ui (when the swagger-ui feature is enabled)
pub fn create_api_router(state: AppState, auth_config: AuthConfig) -> Router {
    SecureRouterBuilder::new(state, auth_config).build()
}
