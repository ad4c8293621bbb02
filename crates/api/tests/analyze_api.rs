//! Integration tests for photo normalisation and label analysis.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    body_json, multipart_body, png_bytes, post_multipart_auth, put_json_auth, register_and_login,
    StubAnalyzer, StubReply,
};
use serde_json::json;
use sqlx::PgPool;

const ANALYZE: &str = "/api/v1/beverages/analyze";
const NORMALIZE: &str = "/api/v1/beverages/normalize";

fn config_with_server_key() -> sakenote_api::config::ServerConfig {
    let mut config = common::test_config();
    config.vision.api_key = Some("server-key".into());
    config
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_normalize_bounds_longest_edge(pool: PgPool) {
    let token = register_and_login(common::build_test_app(pool.clone()), "photog").await;

    let body = multipart_body(&png_bytes(2400, 1200), None);
    let response = post_multipart_auth(common::build_test_app(pool), NORMALIZE, body, &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["width"], 1200);
    assert_eq!(data["height"], 600);
    assert!(data["thumbnail"]
        .as_str()
        .unwrap()
        .starts_with("data:image/jpeg;base64,"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_normalize_keeps_small_images(pool: PgPool) {
    let token = register_and_login(common::build_test_app(pool.clone()), "smallpic").await;

    let body = multipart_body(&png_bytes(300, 400), None);
    let response = post_multipart_auth(common::build_test_app(pool), NORMALIZE, body, &token).await;

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["width"], 300);
    assert_eq!(data["height"], 400);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_normalize_rejects_non_image(pool: PgPool) {
    let token = register_and_login(common::build_test_app(pool.clone()), "notapic").await;

    let body = multipart_body(b"definitely not an image", None);
    let response = post_multipart_auth(common::build_test_app(pool), NORMALIZE, body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_IMAGE");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upload_over_limit_is_413(pool: PgPool) {
    let token = register_and_login(common::build_test_app(pool.clone()), "bigpic").await;

    let body = multipart_body(&vec![7u8; 300 * 1024], None);
    let response = post_multipart_auth(common::build_test_app(pool), NORMALIZE, body, &token).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_analyze_without_any_key_is_rejected(pool: PgPool) {
    let token = register_and_login(common::build_test_app(pool.clone()), "keyless").await;
    let analyzer = Arc::new(StubAnalyzer::sake());

    let body = multipart_body(&png_bytes(64, 64), None);
    let app = common::build_test_app_with(pool, common::test_config(), analyzer.clone());
    let response = post_multipart_auth(app, ANALYZE, body, &token).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["code"], "AI_KEY_MISSING");
    assert!(analyzer.keys_seen.lock().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_analyze_merges_onto_submitted_draft(pool: PgPool) {
    let token = register_and_login(common::build_test_app(pool.clone()), "analyst").await;
    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/user/settings/ai-key",
        json!({ "apiKey": "user-key-123456789" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let analyzer = Arc::new(StubAnalyzer::sake());
    let draft = json!({
        "category": "ワイン",
        "type": "白",
        "memo": "飲み会で",
        "shop": "酒のやまや",
        "rating": 4.5,
        "name": "unknown"
    });
    let body = multipart_body(&png_bytes(1600, 2000), Some(&draft));
    let app = common::build_test_app_with(pool, config_with_server_key(), analyzer.clone());
    let response = post_multipart_auth(app, ANALYZE, body, &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    let draft = &data["draft"];
    assert_eq!(draft["category"], "日本酒");
    assert_eq!(draft["type"], "純米大吟醸");
    assert_eq!(draft["name"], "獺祭 純米大吟醸 磨き二割三分");
    assert_eq!(draft["region"], "山口県");
    assert_eq!(draft["grape"], "N/A");
    assert_eq!(draft["vintage"], "");
    assert_eq!(draft["priceRange"], "5000円〜8000円");
    // Never touched by analysis.
    assert_eq!(draft["memo"], "飲み会で");
    assert_eq!(draft["shop"], "酒のやまや");
    assert_eq!(draft["rating"], 4.5);
    assert!(draft["thumbnail"]
        .as_str()
        .unwrap()
        .starts_with("data:image/jpeg;base64,"));
    assert_eq!(data["width"], 960);
    assert_eq!(data["height"], 1200);

    // The user's own key wins over the server-wide one.
    assert_eq!(
        *analyzer.keys_seen.lock().unwrap(),
        vec!["user-key-123456789".to_string()]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_analyze_falls_back_to_server_key(pool: PgPool) {
    let token = register_and_login(common::build_test_app(pool.clone()), "fallback").await;
    let analyzer = Arc::new(StubAnalyzer::sake());

    let body = multipart_body(&png_bytes(64, 64), None);
    let app = common::build_test_app_with(pool, config_with_server_key(), analyzer.clone());
    let response = post_multipart_auth(app, ANALYZE, body, &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let draft = body_json(response).await["data"]["draft"].clone();
    // No draft submitted: analysis lands on the empty form.
    assert_eq!(draft["category"], "日本酒");
    assert_eq!(draft["memo"], "");
    assert_eq!(draft["rating"], 3.0);
    assert_eq!(*analyzer.keys_seen.lock().unwrap(), vec!["server-key".to_string()]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_analyze_unknown_labels_fall_to_catch_all(pool: PgPool) {
    let token = register_and_login(common::build_test_app(pool.clone()), "mystery").await;
    let analyzer = Arc::new(StubAnalyzer::new(StubReply::Json(json!({
        "category": "kombucha",
        "name": "Fizzy",
        "priceRange": "¥800"
    }))));

    let body = multipart_body(&png_bytes(64, 64), None);
    let app = common::build_test_app_with(pool, config_with_server_key(), analyzer);
    let response = post_multipart_auth(app, ANALYZE, body, &token).await;

    let draft = body_json(response).await["data"]["draft"].clone();
    assert_eq!(draft["category"], "その他");
    assert_eq!(draft["type"], "ウイスキー");
    assert_eq!(draft["priceRange"], "¥800");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_analyze_timeout_is_504(pool: PgPool) {
    let token = register_and_login(common::build_test_app(pool.clone()), "slowpoke").await;
    let analyzer = Arc::new(StubAnalyzer::new(StubReply::Timeout));

    let body = multipart_body(&png_bytes(64, 64), None);
    let app = common::build_test_app_with(pool, config_with_server_key(), analyzer);
    let response = post_multipart_auth(app, ANALYZE, body, &token).await;

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "AI_TIMEOUT");
    // The normalised photo survives the failed analysis.
    assert!(json["thumbnail"]
        .as_str()
        .unwrap()
        .starts_with("data:image/jpeg;base64,"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_analyze_empty_reply_is_502(pool: PgPool) {
    let token = register_and_login(common::build_test_app(pool.clone()), "silent").await;
    let analyzer = Arc::new(StubAnalyzer::new(StubReply::Empty));

    let body = multipart_body(&png_bytes(64, 64), None);
    let app = common::build_test_app_with(pool, config_with_server_key(), analyzer);
    let response = post_multipart_auth(app, ANALYZE, body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "AI_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_analyze_non_object_reply_is_502(pool: PgPool) {
    let token = register_and_login(common::build_test_app(pool.clone()), "listy").await;
    let analyzer = Arc::new(StubAnalyzer::new(StubReply::Json(json!(["sake"]))));

    let body = multipart_body(&png_bytes(64, 64), None);
    let app = common::build_test_app_with(pool, config_with_server_key(), analyzer);
    let response = post_multipart_auth(app, ANALYZE, body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
