//! Content Entity REST API Routes
//!
//! One generic handler set serves chart, gchart and usermetric. The route
//! names derive from the payload's kind, so `/chart`, `/chartheader` and
//! `/chartcuration/:id` all come from [`create_router::<ChartPayload>`].

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use cloudcms_core::{wire, ContentDocument, Payload, Transition};

use crate::error::ApiResult;
use crate::routes::params::{DateFromParams, NewStatusParams};
use crate::routes::CreatedId;
use crate::services::content;
use crate::state::AppState;

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /v1/{kind} - Create an entity, returning its generated id
pub async fn create_content<P: Payload>(
    State(state): State<AppState>,
    body: Result<Json<ContentDocument<P>>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(document) = body?;
    let id = content::create(&state, document).await?;
    Ok((StatusCode::CREATED, Json(CreatedId { id })))
}

/// PUT /v1/{kind} - Replace an entity; the id travels in the header
pub async fn update_content<P: Payload>(
    State(state): State<AppState>,
    body: Result<Json<ContentDocument<P>>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(document) = body?;
    content::update(&state, document).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/{kind}/:id - Full entity
pub async fn get_content<P: Payload>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ContentDocument<P>>> {
    let id = wire::parse_id(&id)?;
    let document = content::get::<P>(&state, id).await?;
    Ok(Json(document))
}

/// DELETE /v1/{kind}/:id - Soft delete
pub async fn delete_content<P: Payload>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = wire::parse_id(&id)?;
    content::transition::<P>(&state, id, Transition::Deleted(true)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /v1/{kind}deletion/:id?newStatus= - Set the deleted flag
pub async fn set_deleted<P: Payload>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<NewStatusParams>,
) -> ApiResult<StatusCode> {
    let id = wire::parse_id(&id)?;
    let deleted = params.flag()?;
    content::transition::<P>(&state, id, Transition::Deleted(deleted)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /v1/{kind}curation/:id?newStatus= - Set the curated flag
pub async fn set_curated<P: Payload>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<NewStatusParams>,
) -> ApiResult<StatusCode> {
    let id = wire::parse_id(&id)?;
    let curated = params.flag()?;
    content::transition::<P>(&state, id, Transition::Curated(curated)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/{kind}header?dateFrom= - One page of headers, oldest first
pub async fn list_headers<P: Payload>(
    State(state): State<AppState>,
    Query(params): Query<DateFromParams>,
) -> ApiResult<impl IntoResponse> {
    let headers = content::headers::<P>(&state, params.lower_bound()?).await?;
    Ok(Json(headers))
}

/// GET /v1/{kind}header/count?dateFrom= - Bare integer count
pub async fn count_headers<P: Payload>(
    State(state): State<AppState>,
    Query(params): Query<DateFromParams>,
) -> ApiResult<Json<usize>> {
    let count = content::count::<P>(&state, params.lower_bound()?).await?;
    Ok(Json(count))
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the router for one content kind.
pub fn create_router<P: Payload>(state: AppState) -> Router {
    let name = P::KIND.route_name();

    Router::new()
        .route(
            &format!("/{name}"),
            axum::routing::post(create_content::<P>).put(update_content::<P>),
        )
        .route(
            &format!("/{name}/:id"),
            get(get_content::<P>).delete(delete_content::<P>),
        )
        .route(&format!("/{name}deletion/:id"), put(set_deleted::<P>))
        .route(&format!("/{name}curation/:id"), put(set_curated::<P>))
        .route(&format!("/{name}header"), get(list_headers::<P>))
        .route(&format!("/{name}header/count"), get(count_headers::<P>))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use cloudcms_core::{ChartPayload, UserMetricPayload};
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
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_create_then_get_chart() {
        let app = create_router::<ChartPayload>(AppState::in_memory(ApiConfig::default()));
        let body = json!({
            "header": { "name": "Power", "creatorId": "c-1" },
            "chartXML": "<chart/>"
        });

        let (status, created) = send(app.clone(), Method::POST, "/chart", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_i64().unwrap();
        assert!(id > 0);

        let (status, fetched) = send(app, Method::GET, &format!("/chart/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["header"]["id"], id);
        assert_eq!(fetched["header"]["name"], "Power");
        assert_eq!(fetched["chartXML"], "<chart/>");
        assert_eq!(fetched["header"]["deleted"], false);
    }

    #[tokio::test]
    async fn test_malformed_ids_and_flags_are_400() {
        let app = create_router::<UserMetricPayload>(AppState::in_memory(ApiConfig::default()));

        let (status, _) = send(app.clone(), Method::GET, "/usermetric/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(app.clone(), Method::GET, "/usermetric/0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(app.clone(), Method::PUT, "/usermetriccuration/1?newStatus=yes", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(app, Method::GET, "/usermetricheader?dateFrom=nope", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_without_id_is_400() {
        let app = create_router::<ChartPayload>(AppState::in_memory(ApiConfig::default()));
        let body = json!({ "header": { "name": "x" } });
        let (status, error) = send(app, Method::PUT, "/chart", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["code"], "MISSING_FIELD");
    }

    #[tokio::test]
    async fn test_unknown_id_is_404() {
        let app = create_router::<ChartPayload>(AppState::in_memory(ApiConfig::default()));
        let (status, _) = send(app, Method::GET, "/chart/77", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_json_is_400_not_422() {
        let app = create_router::<ChartPayload>(AppState::in_memory(ApiConfig::default()));
        let request = Request::builder()
            .method(Method::POST)
            .uri("/chart")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_count_is_bare_integer() {
        let app = create_router::<ChartPayload>(AppState::in_memory(ApiConfig::default()));
        for _ in 0..3 {
            let (status, _) = send(app.clone(), Method::POST, "/chart", Some(json!({}))).await;
            assert_eq!(status, StatusCode::CREATED);
        }
        let (status, count) = send(app, Method::GET, "/chartheader/count", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(count, json!(3));
    }
}
