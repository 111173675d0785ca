//! Router-level tests for shared-secret auth and the error taxonomy as it
//! reaches clients.

mod support;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use cloudcms_core::StorageError;
use cloudcms_storage::{InMemoryDocumentStore, InMemoryLatestCache};
use cloudcms_test_utils::FailingStore;
use proptest::prelude::*;
use serde_json::json;
use support::TestApp;

const CHALLENGE: &str = "Basic realm=Protected Area";

#[tokio::test]
async fn test_wrong_secret_is_401_with_challenge() {
    let app = TestApp::new();
    for value in ["Basic wrong", "Bearer test-shared-secret", "test-shared-secret"] {
        let response = app.send_with(Method::GET, "/v1/status", None, &[("authorization", value)]).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{value}");
        assert_eq!(
            response.headers.get(header::WWW_AUTHENTICATE).and_then(|v| v.to_str().ok()),
            Some(CHALLENGE)
        );
        assert_eq!(response.body["message"], "Not Authorized");
    }

    let response = app.send_with(Method::GET, "/v1/chartheader", None, &[]).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_server_secret_is_500_with_challenge() {
    let app = TestApp::without_secret();
    let response = app.get("/v1/curator").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["message"], "Authorization configuration missing on Server");
    assert!(response.headers.contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn test_auth_runs_before_the_gate() {
    let app = TestApp::new();
    app.set_status(30, "2024-01-01T00:00:00Z").await;
    let response = app.send_with(Method::GET, "/v1/chartheader", None, &[]).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_over_quota_is_503() {
    let store = Arc::new(InMemoryDocumentStore::with_quota(2));
    let app = TestApp::with_backends(store, Arc::new(InMemoryLatestCache::new()));
    app.create("/v1/chart", json!({})).await;
    app.create("/v1/chart", json!({})).await;

    let response = app.post("/v1/chart", json!({})).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["message"], "503 - Over Quota");

    let response = app.post("/v1/status", json!({ "status": 10 })).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_generic_store_failure_is_400_with_store_message() {
    let store = Arc::new(FailingStore::failing_kinds(["versionentity"]));
    let app = TestApp::with_backends(store, Arc::new(InMemoryLatestCache::new()));
    let response = app.post("/v1/version", json!({ "version": 1, "releaseType": 10 })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["message"]
        .as_str()
        .unwrap_or_default()
        .contains("injected failure"));
}

#[tokio::test]
async fn test_store_over_quota_from_any_backend_is_503() {
    let store = Arc::new(FailingStore::with_error(StorageError::OverQuota {
        reason: "datastore quota".to_string(),
    }));
    let app = TestApp::with_backends(store, Arc::new(InMemoryLatestCache::new()));
    let response = app.get("/v1/curator").await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_invalid_json_is_400() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/version")
        .header(header::AUTHORIZATION, support::auth_header())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"version\": "))
        .expect("request");
    let response = app.dispatch(request).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.post("/v1/status", json!({ "status": "ten" })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Any header other than the exact credential is rejected.
    #[test]
    fn prop_only_exact_credential_passes(value in "[ -~]{0,40}") {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        let status = runtime.block_on(async {
            let app = TestApp::new();
            app.send_with(Method::GET, "/v1/curator", None, &[("authorization", value.as_str())])
                .await
                .status
        });
        if value == support::auth_header() {
            prop_assert_eq!(status, StatusCode::OK);
        } else {
            prop_assert_eq!(status, StatusCode::UNAUTHORIZED);
        }
    }
}
