//! Router-level tests for request metrics labelling.

mod support;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use support::TestApp;
use tower::ServiceExt;

async fn scrape(app: &TestApp) -> String {
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).expect("request"))
        .await
        .expect("infallible");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8_lossy(&bytes).into_owned()
}

#[tokio::test]
async fn test_http_metrics_are_labelled_by_route_template() {
    let app = TestApp::new();
    assert_eq!(app.get("/v1/chart/4711").await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/no/such/route/abc123xyz").await.status, StatusCode::NOT_FOUND);

    let exposition = scrape(&app).await;
    assert!(exposition.contains(r#"path="/v1/chart/:id""#), "{exposition}");
    assert!(exposition.contains(r#"path="unmatched""#));
    assert!(!exposition.contains("abc123xyz"));
}
