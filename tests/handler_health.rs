mod common;

use axum::http::StatusCode;
use common::{InMemoryLinkRepository, TestAppBuilder, spawn_app};
use std::sync::Arc;

#[tokio::test]
async fn test_health_endpoint_success() {
    let app = spawn_app();

    let response = app.server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["rate_limit_store"]["status"], "ok");
    assert_eq!(json["checks"]["analytics_queue"]["message"], "Disabled");
}

#[tokio::test]
async fn test_health_reports_queue_capacity() {
    let (builder, _rx) = TestAppBuilder::new().with_analytics();
    let app = builder.build();

    let json = app.server.get("/health").await.json::<serde_json::Value>();

    assert_eq!(json["checks"]["analytics_queue"]["status"], "ok");
    assert_eq!(json["checks"]["analytics_queue"]["message"], "Capacity: 64");
}

#[tokio::test]
async fn test_health_degraded_when_database_down() {
    let app = TestAppBuilder::new()
        .links(Arc::new(InMemoryLinkRepository::unhealthy()))
        .build();

    let response = app.server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["database"]["status"], "error");
    assert_eq!(json["checks"]["database"]["message"], "Database unreachable");
}

#[tokio::test]
async fn test_health_degraded_when_analytics_worker_gone() {
    let (builder, rx) = TestAppBuilder::new().with_analytics();
    drop(rx);
    let app = builder.build();

    let response = app.server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response.json::<serde_json::Value>()["checks"]["analytics_queue"]["status"],
        "error"
    );
}
