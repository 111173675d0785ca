//! OpenAPI document for the CloudCMS API
//!
//! Generated with utoipa from route annotations and schema derives.
//! Content routes are generic over the payload kind and carry no path
//! annotations; their body schemas are registered as components.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::{ApiError, ErrorCode};
use crate::routes::{curator, health, status, telemetry, version, CreatedId};

use cloudcms_core::{
    ChartPayload, ComponentHealth, Curator, CuratorRecord, GChartPayload, HeaderOnly, HealthReport,
    HealthStatus, HeaderView, NewStatus, NewVersion, RecordTextView, StatusView, TelemetryUpsert,
    TelemetryView, UserMetricPayload, VersionView,
};

/// OpenAPI document for the CloudCMS API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "CloudCMS API",
        version = "0.4.0",
        description = "Content backend for shared charts, metrics, client versions and usage telemetry",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local Development")
    ),
    tags(
        (name = "Curators", description = "Users whose contributions are curated automatically"),
        (name = "Status", description = "Operational status history and admission gate source"),
        (name = "Versions", description = "Published client versions"),
        (name = "Telemetry", description = "Per-client usage counters"),
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Observability", description = "Prometheus metrics")
    ),
    paths(
        // === Curator Routes ===
        curator::create_curator,
        curator::list_curators,

        // === Status Routes ===
        status::create_status,
        status::list_status,
        status::latest_status,
        status::status_text,

        // === Version Routes ===
        version::create_version,
        version::list_versions,
        version::latest_version,
        version::version_text,

        // === Telemetry Routes ===
        telemetry::upsert_telemetry,
        telemetry::list_telemetry,

        // === Health Routes ===
        health::liveness,
        health::readiness,

        // === Metrics ===
        crate::telemetry::metrics::metrics_handler,
    ),
    components(
        schemas(
            ApiError,
            ErrorCode,
            CreatedId,
            HeaderView,
            HeaderOnly,
            ChartPayload,
            GChartPayload,
            UserMetricPayload,
            CuratorRecord,
            Curator,
            NewStatus,
            StatusView,
            NewVersion,
            VersionView,
            RecordTextView,
            TelemetryUpsert,
            TelemetryView,
            HealthReport,
            HealthStatus,
            ComponentHealth,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Registers the shared-secret scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            // The Authorization header must equal "Basic <secret>" verbatim.
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("Authorization"))),
            );
        }
    }
}

impl ApiDoc {
    /// Render the OpenAPI document as JSON.
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}
