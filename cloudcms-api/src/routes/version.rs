//! Client Version REST API Routes
//!
//! Same append-only shape as status. The list additionally answers "what
//! is newer than the version I have" via `?version=`.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use cloudcms_core::{
    lifecycle, version::VERSION_FIELD, wire, NewVersion, RecordTextView, ValidationError, VersionRecord,
    VersionView,
};
use serde::Deserialize;

use crate::constants::DATE_FROM_PARAM;
use crate::error::{ApiError, ApiResult};
use crate::routes::CreatedId;
use crate::services::latest;
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
#[serde(rename_all = "camelCase", default)]
pub struct VersionListParams {
    /// Lower bound on `changeDate`. Ignored when `version` is present.
    pub date_from: Option<String>,
    /// Only versions strictly greater than this number.
    pub version: Option<String>,
}

impl VersionListParams {
    fn above(&self) -> Result<Option<i64>, ValidationError> {
        match self.version.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(v) => v.parse::<i64>().map(Some).map_err(|_| ValidationError::InvalidValue {
                field: VERSION_FIELD.to_string(),
                reason: format!("'{v}' is not an integer"),
            }),
        }
    }
}

/// POST /v1/version - Publish a client version
#[utoipa::path(
    post,
    path = "/v1/version",
    tag = "Versions",
    request_body = NewVersion,
    responses(
        (status = 201, description = "Version recorded", body = CreatedId),
        (status = 400, description = "Unknown release type or malformed body", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("basic_auth" = []))
)]
pub async fn create_version(
    State(state): State<AppState>,
    body: Result<Json<NewVersion>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = body?;
    let (record, text) = request.into_record(lifecycle::stamp(state.clock.as_ref()))?;
    let id = latest::create(&state, &record, text).await?;
    Ok((StatusCode::CREATED, Json(CreatedId { id })))
}

/// GET /v1/version - Version history
#[utoipa::path(
    get,
    path = "/v1/version",
    tag = "Versions",
    params(VersionListParams),
    responses(
        (status = 200, description = "Versions, newest first", body = Vec<VersionView>),
        (status = 400, description = "Malformed parameter", body = ApiError),
    ),
    security(("basic_auth" = []))
)]
pub async fn list_versions(
    State(state): State<AppState>,
    Query(params): Query<VersionListParams>,
) -> ApiResult<Json<Vec<VersionView>>> {
    let store = state.store.as_ref();
    let versions = match params.above()? {
        Some(above) => latest::list_above::<VersionRecord>(store, VERSION_FIELD, above).await?,
        None => {
            let from = wire::parse_lower_bound(DATE_FROM_PARAM, params.date_from.as_deref())?;
            latest::list_since::<VersionRecord>(store, from).await?
        }
    };
    Ok(Json(versions))
}

/// GET /v1/version/latest - Newest published version
#[utoipa::path(
    get,
    path = "/v1/version/latest",
    tag = "Versions",
    responses(
        (status = 200, description = "Newest version", body = VersionView),
        (status = 404, description = "No version published yet", body = ApiError),
    ),
    security(("basic_auth" = []))
)]
pub async fn latest_version(State(state): State<AppState>) -> ApiResult<Json<VersionView>> {
    latest::latest::<VersionRecord>(state.store.as_ref(), state.cache.as_ref())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("No version published"))
}

/// GET /v1/versiontext/:id - Release notes attached to a version
#[utoipa::path(
    get,
    path = "/v1/versiontext/{id}",
    tag = "Versions",
    params(("id" = i64, Path, description = "Version record id")),
    responses(
        (status = 200, description = "Attached text", body = RecordTextView),
        (status = 404, description = "No text attached", body = ApiError),
    ),
    security(("basic_auth" = []))
)]
pub async fn version_text(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<RecordTextView>> {
    let id = wire::parse_id(&id)?;
    let text = latest::text::<VersionRecord>(state.store.as_ref(), id).await?;
    Ok(Json(text))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/version", get(list_versions).post(create_version))
        .route("/version/latest", get(latest_version))
        .route("/versiontext/:id", get(version_text))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_param_parsing() {
        let params = |v: Option<&str>| VersionListParams {
            date_from: None,
            version: v.map(str::to_string),
        };
        assert_eq!(params(None).above(), Ok(None));
        assert_eq!(params(Some("")).above(), Ok(None));
        assert_eq!(params(Some("12")).above(), Ok(Some(12)));
        assert!(params(Some("1.2")).above().is_err());
    }
}
