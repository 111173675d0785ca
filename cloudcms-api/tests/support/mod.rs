//! Shared harness for router-level tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::Duration;
use cloudcms_api::{create_api_router, ApiConfig, AppState, AuthConfig};
use cloudcms_core::SteppingClock;
use cloudcms_storage::{DocumentStore, InMemoryDocumentStore, InMemoryLatestCache, LatestValueCache};
use cloudcms_test_utils::fixtures::t0;
use serde_json::Value;
use tower::ServiceExt;

pub const SECRET: &str = "test-shared-secret";

pub fn auth_header() -> String {
    format!("Basic {SECRET}")
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Full router over in-memory backends, with a clock that advances one
/// minute per reading starting at `t0()`.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_backends(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(InMemoryLatestCache::new()),
        )
    }

    pub fn with_backends(store: Arc<dyn DocumentStore>, cache: Arc<dyn LatestValueCache>) -> Self {
        Self::build(store, cache, AuthConfig::with_secret(SECRET))
    }

    pub fn without_secret() -> Self {
        Self::build(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(InMemoryLatestCache::new()),
            AuthConfig::default(),
        )
    }

    fn build(store: Arc<dyn DocumentStore>, cache: Arc<dyn LatestValueCache>, auth: AuthConfig) -> Self {
        let clock = Arc::new(SteppingClock::new(t0(), Duration::minutes(1)));
        let state = AppState::new(store, cache, clock, ApiConfig::default());
        let router = create_api_router(state.clone(), auth);
        Self { router, state }
    }

    /// Authenticated request with an optional JSON body.
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        self.send_with(method, uri, body, &[("authorization", &auth_header())]).await
    }

    pub async fn send_with(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.dispatch(builder.body(body).expect("request")).await
    }

    pub async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.expect("infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse { status, headers, body }
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Option<Value>) -> TestResponse {
        self.send(Method::PUT, uri, body).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    /// Create an entity and return its id.
    pub async fn create(&self, uri: &str, body: Value) -> i64 {
        let response = self.post(uri, body).await;
        assert_eq!(response.status, StatusCode::CREATED, "{uri}: {}", response.body);
        response.body["id"].as_i64().expect("id")
    }

    /// Post a status record with the given code and change date.
    pub async fn set_status(&self, code: i64, change_date: &str) {
        self.create(
            "/v1/status",
            serde_json::json!({ "status": code, "changeDate": change_date }),
        )
        .await;
    }
}
