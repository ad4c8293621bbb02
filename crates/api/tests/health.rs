//! Integration tests for the health check, the taxonomy endpoint and
//! general HTTP behaviour.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get, StubAnalyzer};
use sakenote_api::router::request_timeout;
use sqlx::PgPool;
use tower::ServiceExt;

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_check_returns_ok_with_json(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
    assert_eq!(json["ws_connections"], 0);
    assert_eq!(json["vision"]["model"], "gemini-flash-latest");
    assert_eq!(json["vision"]["server_key"], false);
    assert!(!json.to_string().contains("api_key"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_reports_server_ai_key(pool: PgPool) {
    let mut config = common::test_config();
    config.vision.api_key = Some("server-secret".into());
    let app = common::build_test_app_with(pool, config, Arc::new(StubAnalyzer::sake()));

    let json = body_json(get(app, "/health").await).await;
    assert_eq!(json["vision"]["server_key"], true);
    assert!(!json.to_string().contains("server-secret"));
}

#[test]
fn request_timeout_outlasts_label_analysis() {
    let mut config = common::test_config();
    config.request_timeout_secs = 30;
    config.vision.timeout_secs = 60;
    assert_eq!(request_timeout(&config), Duration::from_secs(75));

    config.request_timeout_secs = 120;
    assert_eq!(request_timeout(&config), Duration::from_secs(120));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_route_returns_404(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/this-route-does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn response_contains_x_request_id_header(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cors_preflight_allows_dev_origin(pool: PgPool) {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/beverages")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();
    let response = common::build_test_app(pool).oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "http://localhost:5173"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cors_exposes_request_id_to_browser(pool: PgPool) {
    let request = Request::builder()
        .uri("/health")
        .header("origin", "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = common::build_test_app(pool).oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get("access-control-expose-headers").unwrap(),
        "x-request-id"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn taxonomy_is_public_and_ordered(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/v1/taxonomy").await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    let keys: Vec<&str> = data["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["ワイン", "日本酒", "焼酎", "ビール", "その他"]);
    assert_eq!(data["categories"][1]["defaultType"], "純米大吟醸");
    assert_eq!(data["catchAll"], "その他");
    assert_eq!(data["allFilter"], "すべて");
    assert_eq!(data["sortOrders"][0], "dateDesc");
    assert_eq!(data["newRecord"]["category"], "ワイン");
    assert_eq!(data["newRecord"]["type"], "赤");
    assert_eq!(data["newRecord"]["rating"], 3.0);
}
