// tests/metrics.rs
//
// Installs the global Prometheus recorder, so everything lives in one test:
// a second install in the same process would fail.
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use sentiment_ledger::api::{self, AppState};
use sentiment_ledger::metrics::Metrics;

#[tokio::test]
async fn metrics_endpoint_contains_expected_series() {
    let m = Metrics::init().expect("install recorder once per test binary");
    assert!(Metrics::init().is_err(), "second install must fail");

    let app = api::router(AppState::with_defaults(), Some(m.handle.clone()));

    for text in ["great stuff", "awful stuff", "   "] {
        let req = Request::post("/analyze")
            .header("content-type", "application/json")
            .body(Body::from(json!({ "text": text }).to_string()))
            .unwrap();
        app.clone().oneshot(req).await.unwrap();
    }
    app.clone()
        .oneshot(Request::delete("/history").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let resp = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    // axum::body::to_bytes requires an explicit limit
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap(); // 1 MiB
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in [
        "sentiment_analyses_total",
        "label=\"Positive\"",
        "label=\"Negative\"",
        "sentiment_empty_input_rejections_total",
        "sentiment_ledger_clears_total",
        "sentiment_ledger_capacity",
    ] {
        assert!(text.contains(needle), "missing '{needle}' in:\n{text}");
    }
}

#[tokio::test]
async fn metrics_route_absent_without_handle() {
    let app = api::router(AppState::with_defaults(), None);
    let resp = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
