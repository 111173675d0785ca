//! Usage Telemetry REST API Routes
//!
//! Geo attribution comes from request headers set by the fronting proxy;
//! the header names are configurable.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{HeaderMap, StatusCode},
    routing::put,
    Json, Router,
};
use cloudcms_core::{GeoOrigin, TelemetryListParams, TelemetryUpsert, TelemetryView};

use crate::config::GeoHeaderNames;
use crate::error::{ApiError, ApiResult};
use crate::services::telemetry;
use crate::state::AppState;

fn header_value(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Read the proxy geo headers. Missing headers become empty strings.
pub fn geo_origin(headers: &HeaderMap, names: &GeoHeaderNames) -> GeoOrigin {
    GeoOrigin {
        country: header_value(headers, &names.country),
        region: header_value(headers, &names.region),
        city: header_value(headers, &names.city),
        city_lat_long: header_value(headers, &names.city_lat_long),
    }
}

/// PUT /v1/telemetry - Count one or more uses for a client key
#[utoipa::path(
    put,
    path = "/v1/telemetry",
    tag = "Telemetry",
    request_body = TelemetryUpsert,
    responses(
        (status = 204, description = "Usage merged"),
        (status = 400, description = "Missing key or negative increment", body = ApiError),
        (status = 422, description = "Service status does not allow processing", body = ApiError),
    ),
    security(("basic_auth" = []))
)]
pub async fn upsert_telemetry(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<TelemetryUpsert>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(request) = body?;
    let origin = geo_origin(&headers, &state.config.geo_headers);
    telemetry::upsert(&state, &request, &origin).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/telemetry - List usage records by one filter
#[utoipa::path(
    get,
    path = "/v1/telemetry",
    tag = "Telemetry",
    params(TelemetryListParams),
    responses(
        (status = 200, description = "Usage records", body = Vec<TelemetryView>),
        (status = 400, description = "Malformed timestamp", body = ApiError),
        (status = 422, description = "Service status does not allow processing", body = ApiError),
    ),
    security(("basic_auth" = []))
)]
pub async fn list_telemetry(
    State(state): State<AppState>,
    Query(params): Query<TelemetryListParams>,
) -> ApiResult<Json<Vec<TelemetryView>>> {
    let filter = params.select()?;
    let records = telemetry::list(&state, &filter).await?;
    Ok(Json(records))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/telemetry", put(upsert_telemetry).get(list_telemetry))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_geo_origin_uses_configured_names() {
        let mut headers = HeaderMap::new();
        headers.insert("x-appengine-country", HeaderValue::from_static("DE"));
        headers.insert("x-appengine-city", HeaderValue::from_static("munich"));
        headers.insert("x-geo-region", HeaderValue::from_static("by"));

        let origin = geo_origin(&headers, &GeoHeaderNames::default());
        assert_eq!(origin.country, "DE");
        assert_eq!(origin.city, "munich");
        assert_eq!(origin.region, "");

        let names = GeoHeaderNames {
            region: "x-geo-region".to_string(),
            ..GeoHeaderNames::default()
        };
        assert_eq!(geo_origin(&headers, &names).region, "by");
    }
}
