//! # Tests for Handlers
//!
//! Unit tests for the service-level handlers.

use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    extract::State,
    http::{Request, StatusCode},
    response::Json,
};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::ServiceExt;

use crate::config::AppConfig;
use crate::handlers::{healthz, readyz, root};
use crate::models::ServiceInfo;
use crate::server::{AppState, api_doc, create_app};
use crate::storage::MemoryStorage;

fn disconnected_state() -> AppState {
    AppState::new(
        AppConfig::default(),
        DatabaseConnection::default(),
        Arc::new(MemoryStorage::new("imoveis")),
        None,
    )
}

#[tokio::test]
async fn test_root_handler_returns_expected_service_info() {
    let Json(service_info) = root().await;

    assert_eq!(service_info.service, "fx-imoveis");
    assert_eq!(service_info.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_root_handler_returns_valid_json() {
    let Json(service_info) = root().await;

    let json_value: Value =
        serde_json::to_value(&service_info).expect("Failed to serialize ServiceInfo");

    assert_eq!(json_value["service"], "fx-imoveis");
    assert!(json_value.get("version").is_some());
}

#[test]
fn test_service_info_default() {
    let service_info = ServiceInfo::default();
    assert_eq!(service_info.service, "fx-imoveis");
}

#[tokio::test]
async fn test_healthz_is_always_ok() {
    let Json(status) = healthz().await;
    assert_eq!(status.status, "ok");
}

#[tokio::test]
async fn test_readyz_reports_unreachable_database() {
    let err = readyz(State(disconnected_state())).await.unwrap_err();

    assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(&*err.code, "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = create_app(disconnected_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let doc: Value = serde_json::from_slice(&body).unwrap();

    assert!(doc["paths"]["/api/properties"].is_object());
    assert!(doc["paths"]["/api/admin/properties/{id}/uploads"].is_object());
    assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());
    assert!(doc["paths"]["/api/admin/cache/images"]["get"].is_object());
    assert!(doc.get("servers").is_none());
}

#[test]
fn test_openapi_lists_public_base_url_as_server() {
    let config = AppConfig {
        public_base_url: Some("https://api.fxavier.com.br/".to_string()),
        ..Default::default()
    };

    let doc = serde_json::to_value(api_doc(&config)).unwrap();

    assert_eq!(doc["servers"][0]["url"], "https://api.fxavier.com.br");
}

#[tokio::test]
async fn test_admin_routes_require_session() {
    let app = create_app(disconnected_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/admin/properties")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_responses_carry_trace_id() {
    let app = create_app(disconnected_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .header("x-trace-id", "trace-abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-trace-id"], "trace-abc");
}
