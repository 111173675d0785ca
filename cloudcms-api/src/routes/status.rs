//! Operational Status REST API Routes
//!
//! Status records are append-only. These routes are never behind the
//! status gate, so an operator can always reopen a closed gate.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use cloudcms_core::{lifecycle, wire, NewStatus, RecordTextView, StatusRecord, StatusView};

use crate::error::{ApiError, ApiResult};
use crate::routes::params::DateFromParams;
use crate::routes::CreatedId;
use crate::services::latest;
use crate::state::AppState;

/// POST /v1/status - Append a status record
#[utoipa::path(
    post,
    path = "/v1/status",
    tag = "Status",
    request_body = NewStatus,
    responses(
        (status = 201, description = "Status recorded", body = CreatedId),
        (status = 400, description = "Unknown status code or malformed body", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("basic_auth" = []))
)]
pub async fn create_status(
    State(state): State<AppState>,
    body: Result<Json<NewStatus>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = body?;
    let (record, text) = request.into_record(lifecycle::stamp(state.clock.as_ref()))?;
    let id = latest::create(&state, &record, text).await?;
    Ok((StatusCode::CREATED, Json(CreatedId { id })))
}

/// GET /v1/status - Status history, newest first
#[utoipa::path(
    get,
    path = "/v1/status",
    tag = "Status",
    params(DateFromParams),
    responses(
        (status = 200, description = "Status records", body = Vec<StatusView>),
        (status = 400, description = "Malformed dateFrom", body = ApiError),
    ),
    security(("basic_auth" = []))
)]
pub async fn list_status(
    State(state): State<AppState>,
    Query(params): Query<DateFromParams>,
) -> ApiResult<Json<Vec<StatusView>>> {
    let records = latest::list_since::<StatusRecord>(state.store.as_ref(), params.lower_bound()?).await?;
    Ok(Json(records))
}

/// GET /v1/status/latest - Current operational status
#[utoipa::path(
    get,
    path = "/v1/status/latest",
    tag = "Status",
    responses(
        (status = 200, description = "Newest status record", body = StatusView),
        (status = 404, description = "No status recorded yet", body = ApiError),
    ),
    security(("basic_auth" = []))
)]
pub async fn latest_status(State(state): State<AppState>) -> ApiResult<Json<StatusView>> {
    latest::latest::<StatusRecord>(state.store.as_ref(), state.cache.as_ref())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("No status recorded"))
}

/// GET /v1/statustext/:id - Free text attached to a status record
#[utoipa::path(
    get,
    path = "/v1/statustext/{id}",
    tag = "Status",
    params(("id" = i64, Path, description = "Status record id")),
    responses(
        (status = 200, description = "Attached text", body = RecordTextView),
        (status = 404, description = "No text attached", body = ApiError),
    ),
    security(("basic_auth" = []))
)]
pub async fn status_text(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<RecordTextView>> {
    let id = wire::parse_id(&id)?;
    let text = latest::text::<StatusRecord>(state.store.as_ref(), id).await?;
    Ok(Json(text))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(list_status).post(create_status))
        .route("/status/latest", get(latest_status))
        .route("/statustext/:id", get(status_text))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_latest_is_404_until_first_record() {
        let app = create_router(AppState::in_memory(ApiConfig::default()));
        let (status, _) = send(app.clone(), Method::GET, "/status/latest", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let body = json!({ "status": 30, "changeDate": "2024-06-01T10:00:00Z", "text": "maintenance" });
        let (status, created) = send(app.clone(), Method::POST, "/status", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_i64().unwrap();

        let (status, latest) = send(app.clone(), Method::GET, "/status/latest", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(latest["status"], 30);
        assert_eq!(latest["changeDate"], "2024-06-01T10:00:00Z");

        let (status, text) = send(app, Method::GET, &format!("/statustext/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(text["text"], "maintenance");
    }

    #[tokio::test]
    async fn test_unknown_status_code_is_rejected() {
        let app = create_router(AppState::in_memory(ApiConfig::default()));
        let (status, error) = send(app, Method::POST, "/status", Some(json!({ "status": 15 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["code"], "VALIDATION_FAILED");
    }
}
