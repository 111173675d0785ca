//! Curator REST API Routes

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use cloudcms_core::{Curator, CuratorRecord};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::routes::CreatedId;
use crate::services::curator;
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
#[serde(rename_all = "camelCase", default)]
pub struct CuratorListParams {
    /// Only curators registered under this creator id.
    pub curator_id: Option<String>,
}

/// POST /v1/curator - Register a curator
#[utoipa::path(
    post,
    path = "/v1/curator",
    tag = "Curators",
    request_body = CuratorRecord,
    responses(
        (status = 201, description = "Curator registered", body = CreatedId),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("basic_auth" = []))
)]
pub async fn create_curator(
    State(state): State<AppState>,
    body: Result<Json<CuratorRecord>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(record) = body?;
    let id = curator::create(&state, &record).await?;
    Ok((StatusCode::CREATED, Json(CreatedId { id })))
}

/// GET /v1/curator - List curators
#[utoipa::path(
    get,
    path = "/v1/curator",
    tag = "Curators",
    params(CuratorListParams),
    responses(
        (status = 200, description = "Curators", body = Vec<Curator>),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("basic_auth" = []))
)]
pub async fn list_curators(
    State(state): State<AppState>,
    Query(params): Query<CuratorListParams>,
) -> ApiResult<Json<Vec<Curator>>> {
    let curators = curator::list(&state, params.curator_id.as_deref()).await?;
    Ok(Json(curators))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/curator", get(list_curators).post(create_curator))
        .with_state(state)
}
