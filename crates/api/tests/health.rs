//! Health endpoint, fallback routing and shared middleware behavior.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use bookings_api::render::PageRenderer;

use common::{body_json, build_test_app, build_test_app_with_renderer};

#[tokio::test]
async fn health_reports_storage_status() {
    let app = build_test_app();
    let mut client = app.client();

    let response = client.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["db_healthy"], true);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    app.repo.fail_queries(true);
    let body = body_json(client.get("/health").await).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["db_healthy"], false);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = build_test_app();
    let response = app.client().get("/no/such/page").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = build_test_app();
    let response = app.client().get("/about").await;
    assert_eq!(response.status(), StatusCode::OK);
    let id = response.headers().get("x-request-id").unwrap();
    assert!(!id.is_empty());
}

#[tokio::test]
async fn home_page_survives_storage_failure() {
    let app = build_test_app();
    app.repo.fail_queries(true);

    let response = app.client().get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = common::page_data(response).await;
    assert_eq!(data["error"], "Rooms cannot be listed right now");
}

#[tokio::test]
async fn missing_template_is_a_sanitized_500() {
    let app = build_test_app_with_renderer(Arc::new(PageRenderer::new(["home.page.tmpl"])));

    let response = app.client().get("/about").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INTERNAL_ERROR");
    assert_eq!(body["error"], "An internal error occurred");
}
