//! Integration tests for the /health and /metrics endpoints

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use groq_relay::{
    config::{ApiKey, Config},
    handlers::{self, AppState},
};
use std::sync::Arc;
use tower::ServiceExt;

fn create_test_state(key: Option<&str>) -> AppState {
    let config = Config::default().with_api_key(key.and_then(ApiKey::new));
    AppState::new(Arc::new(config)).expect("AppState::new should succeed")
}

#[tokio::test]
async fn test_health_endpoint_reports_configuration() {
    let app = handlers::router(create_test_state(Some("gsk_health")));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "OK");
    assert_eq!(json["credential_configured"], true);
    assert_eq!(json["policy"], "buffered");
    assert!(!String::from_utf8_lossy(&bytes).contains("gsk_health"));
}

#[tokio::test]
async fn test_metrics_endpoint_counts_missing_key_requests() {
    let app = handlers::router(create_test_state(None));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/groq")
                .body(Body::from(r#"{"messages": []}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let line = text
        .lines()
        .find(|l| l.starts_with("groq_relay_requests_total{") && l.contains(r#"outcome="missing_api_key""#))
        .unwrap_or_else(|| panic!("unexpected metrics output:\n{}", text));
    assert!(line.contains(r#"policy="buffered""#));
    assert!(line.ends_with(" 1"), "got: {}", line);
}
