//! Axum middleware enforcing the shared-secret credential.
//!
//! Rejects with 401 when the `Authorization` header does not match, and with
//! 500 when the server has no secret configured. Both carry the Basic
//! challenge header.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{authenticate, AuthConfig};
use crate::error::ApiError;

// ============================================================================
// MIDDLEWARE STATE
// ============================================================================

#[derive(Debug, Clone)]
pub struct AuthMiddlewareState {
    pub auth_config: Arc<AuthConfig>,
}

impl AuthMiddlewareState {
    pub fn new(auth_config: AuthConfig) -> Self {
        Self {
            auth_config: Arc::new(auth_config),
        }
    }
}

// ============================================================================
// MIDDLEWARE FUNCTION
// ============================================================================

/// Reject the request unless it carries the configured shared secret.
pub async fn auth_middleware(
    State(state): State<AuthMiddlewareState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthMiddlewareError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    if let Err(err) = authenticate(&state.auth_config, auth_header) {
        tracing::debug!(code = %err.code, path = %request.uri().path(), "Request rejected by auth");
        return Err(AuthMiddlewareError(err));
    }

    Ok(next.run(request).await)
}

// ============================================================================
// ERROR TYPE
// ============================================================================

/// Error type for authentication middleware.
#[derive(Debug)]
pub struct AuthMiddlewareError(pub ApiError);

impl IntoResponse for AuthMiddlewareError {
    fn into_response(self) -> Response {
        self.0.into_response()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    fn app(config: AuthConfig) -> Router {
        let state = AuthMiddlewareState::new(config);
        Router::new()
            .route("/protected", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(state, auth_middleware))
    }

    fn request(auth: Option<&str>) -> Result<HttpRequest<Body>, String> {
        let mut builder = HttpRequest::builder().uri("/protected");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).map_err(|e| e.to_string())
    }

    #[tokio::test]
    async fn test_valid_secret_passes() -> Result<(), String> {
        let response = app(AuthConfig::with_secret("open-sesame"))
            .oneshot(request(Some("Basic open-sesame"))?)
            .await
            .map_err(|e| e.to_string())?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn test_wrong_secret_is_unauthorized() -> Result<(), String> {
        let response = app(AuthConfig::with_secret("open-sesame"))
            .oneshot(request(Some("Basic nope"))?)
            .await
            .map_err(|e| e.to_string())?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).and_then(|v| v.to_str().ok()),
            Some("Basic realm=Protected Area")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() -> Result<(), String> {
        let response = app(AuthConfig::with_secret("open-sesame"))
            .oneshot(request(None)?)
            .await
            .map_err(|e| e.to_string())?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn test_unconfigured_secret_is_server_error() -> Result<(), String> {
        let response = app(AuthConfig::default())
            .oneshot(request(Some("Basic open-sesame"))?)
            .await
            .map_err(|e| e.to_string())?;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
        Ok(())
    }
}
