//! Operational-status admission gate.
//!
//! Placed in front of content and telemetry routes only. A request is
//! rejected with 422 when the newest status record is not OK; when no
//! status can be resolved the request is admitted.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use cloudcms_core::{admit, Admission};

use crate::error::ApiError;
use crate::services::latest::current_status;
use crate::state::AppState;
use crate::telemetry::metrics::record_gate_rejection;

/// Admit or reject the request based on the current operational status.
pub async fn status_gate_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let status = current_status(state.store.as_ref(), state.cache.as_ref()).await;

    match admit(status) {
        Admission::Allow => next.run(request).await,
        Admission::Deny => {
            record_gate_rejection();
            tracing::warn!(
                status = ?status,
                method = %request.method(),
                path = %request.uri().path(),
                "Request rejected by status gate"
            );
            ApiError::gate_closed().into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::services::latest;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use chrono::{Duration, TimeZone, Utc};
    use cloudcms_core::{OperationalStatus, StatusRecord};
    use tower::ServiceExt;

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/gated", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(state, status_gate_middleware))
    }

    async fn call(state: AppState) -> Result<StatusCode, String> {
        let request = HttpRequest::builder()
            .uri("/gated")
            .body(Body::empty())
            .map_err(|e| e.to_string())?;
        let response = app(state).oneshot(request).await.map_err(|e| e.to_string())?;
        Ok(response.status())
    }

    async fn post_status(state: &AppState, status: OperationalStatus, hours: i64) -> Result<(), String> {
        let at = Utc
            .with_ymd_and_hms(2024, 5, 1, 0, 0, 0)
            .single()
            .ok_or("bad date")?
            + Duration::hours(hours);
        let record = StatusRecord { status, change_date: at };
        latest::create(state, &record, None).await.map_err(|e| e.to_string())?;
        Ok(())
    }

    #[tokio::test]
    async fn test_no_status_admits() -> Result<(), String> {
        let state = AppState::in_memory(ApiConfig::default());
        assert_eq!(call(state).await?, StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn test_outage_rejects_with_422() -> Result<(), String> {
        let state = AppState::in_memory(ApiConfig::default());
        post_status(&state, OperationalStatus::Ok, 0).await?;
        post_status(&state, OperationalStatus::Outage, 1).await?;
        assert_eq!(call(state).await?, StatusCode::UNPROCESSABLE_ENTITY);
        Ok(())
    }

    #[tokio::test]
    async fn test_partial_failure_rejects() -> Result<(), String> {
        let state = AppState::in_memory(ApiConfig::default());
        post_status(&state, OperationalStatus::PartialFailure, 0).await?;
        assert_eq!(call(state).await?, StatusCode::UNPROCESSABLE_ENTITY);
        Ok(())
    }

    #[tokio::test]
    async fn test_newest_ok_reopens() -> Result<(), String> {
        let state = AppState::in_memory(ApiConfig::default());
        post_status(&state, OperationalStatus::Outage, 0).await?;
        assert_eq!(call(state.clone()).await?, StatusCode::UNPROCESSABLE_ENTITY);
        post_status(&state, OperationalStatus::Ok, 1).await?;
        assert_eq!(call(state).await?, StatusCode::OK);
        Ok(())
    }
}
