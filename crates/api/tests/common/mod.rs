#![allow(dead_code)]

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sakenote_api::auth::jwt::JwtConfig;
use sakenote_api::config::ServerConfig;
use sakenote_api::router::build_app_router;
use sakenote_api::state::AppState;
use sakenote_api::ws::WsManager;
use sakenote_core::record::LabelAnalysis;
use sakenote_events::EventBus;
use sakenote_vision::{LabelAnalyzer, VisionConfig, VisionError};
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "kanpai-2024!";
const BOUNDARY: &str = "sakenote-test-boundary";

/// What the stub classifier answers with.
#[derive(Debug, Clone)]
pub enum StubReply {
    Json(serde_json::Value),
    Timeout,
    Empty,
}

/// Records the keys it was called with and replies with a canned answer.
pub struct StubAnalyzer {
    reply: StubReply,
    pub keys_seen: Mutex<Vec<String>>,
}

impl StubAnalyzer {
    pub fn new(reply: StubReply) -> Self {
        Self {
            reply,
            keys_seen: Mutex::new(Vec::new()),
        }
    }

    /// A Japanese sake label answered with loose labels.
    pub fn sake() -> Self {
        Self::new(StubReply::Json(serde_json::json!({
            "category": "Sake",
            "name": "獺祭 純米大吟醸 磨き二割三分",
            "type": "",
            "country": "日本",
            "region": "山口県",
            "grape": "N/A",
            "producer": "旭酒造",
            "vintage": "",
            "description": "華やかな香り",
            "price_estimate": "5000円〜8000円"
        })))
    }
}

#[async_trait]
impl LabelAnalyzer for StubAnalyzer {
    async fn analyze(&self, api_key: &str, _jpeg_base64: &str) -> Result<LabelAnalysis, VisionError> {
        self.keys_seen.lock().unwrap().push(api_key.to_string());
        match &self.reply {
            StubReply::Json(value) => LabelAnalysis::from_value(value.clone())
                .map_err(|e| VisionError::Malformed(e.to_string())),
            StubReply::Timeout => Err(VisionError::Timeout(60)),
            StubReply::Empty => Err(VisionError::EmptyResponse),
        }
    }
}

/// Build a test `ServerConfig` with safe defaults.
///
/// No server-wide AI key; a 256 KiB upload cap.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        max_upload_bytes: 256 * 1024,
        jwt: JwtConfig {
            secret: "test-secret-for-integration-tests".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        vision: VisionConfig::default(),
    }
}

pub fn test_state(pool: PgPool, config: ServerConfig, analyzer: Arc<dyn LabelAnalyzer>) -> AppState {
    AppState {
        pool,
        config: Arc::new(config),
        ws_manager: Arc::new(WsManager::new()),
        event_bus: Arc::new(EventBus::default()),
        analyzer,
    }
}

/// The full application router, same middleware stack as production.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config(), Arc::new(StubAnalyzer::sake()))
}

pub fn build_test_app_with(
    pool: PgPool,
    config: ServerConfig,
    analyzer: Arc<dyn LabelAnalyzer>,
) -> Router {
    let state = test_state(pool, config.clone(), analyzer);
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, json_request(Method::GET, uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, json_request(Method::GET, uri, Some(token), None)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, None, Some(body))).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: serde_json::Value, token: &str) -> Response<Body> {
    send(app, json_request(Method::POST, uri, Some(token), Some(body))).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: serde_json::Value, token: &str) -> Response<Body> {
    send(app, json_request(Method::PUT, uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, json_request(Method::DELETE, uri, Some(token), None)).await
}

/// A `multipart/form-data` body with an `image` part and an optional
/// `draft` JSON part.
pub fn multipart_body(image: &[u8], draft: Option<&serde_json::Value>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(draft) = draft {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"draft\"\r\n\
                 Content-Type: application/json\r\n\r\n{draft}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"label.png\"\r\n\
             Content-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(image);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart_auth(app: Router, uri: &str, body: Vec<u8>, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

/// A solid-colour PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([120, 20, 40]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

// ---------------------------------------------------------------------------
// Auth helpers
// ---------------------------------------------------------------------------

/// Register a user through the API and return its access token.
pub async fn register_and_login(app: Router, username: &str) -> String {
    let body = serde_json::json!({
        "username": username,
        "email": format!("{username}@example.com"),
        "password": TEST_PASSWORD,
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    let json = body_json(response).await;
    json["access_token"].as_str().unwrap().to_string()
}

/// Create a beverage through the API and return its JSON.
pub async fn create_beverage(app: Router, token: &str, body: serde_json::Value) -> serde_json::Value {
    let response = post_json_auth(app, "/api/v1/beverages", body, token).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}
