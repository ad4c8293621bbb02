//! REST client for the Gemini `generateContent` endpoint.

use std::time::Duration;

use sakenote_core::record::LabelAnalysis;

use crate::prompt::label_prompt;
use crate::response::{parse_analysis, GenerateContentResponse};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-flash-latest";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Errors from the AI classification call.
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Vision API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("Vision API did not answer within {0} seconds")]
    Timeout(u64),

    /// No candidate text in the reply.
    #[error("No data returned from AI")]
    EmptyResponse,

    #[error("Malformed AI reply: {0}")]
    Malformed(String),
}

/// AI endpoint settings.
///
/// | Env Var               | Default                                            |
/// |-----------------------|----------------------------------------------------|
/// | `VISION_API_BASE_URL` | `https://generativelanguage.googleapis.com/v1beta` |
/// | `VISION_MODEL`        | `gemini-flash-latest`                              |
/// | `VISION_API_KEY`      | unset (users must store their own key)             |
/// | `VISION_TIMEOUT_SECS` | `60`                                               |
#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub base_url: String,
    pub model: String,
    /// Server-wide fallback credential.
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl VisionConfig {
    pub fn from_env() -> Self {
        let base_url = std::env::var("VISION_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();

        let model = std::env::var("VISION_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        let api_key = std::env::var("VISION_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let timeout_secs: u64 = std::env::var("VISION_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("VISION_TIMEOUT_SECS must be a valid u64");

        Self {
            base_url,
            model,
            api_key,
            timeout_secs,
        }
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// HTTP client for the classification model.
pub struct GeminiClient {
    client: reqwest::Client,
    config: VisionConfig,
}

impl GeminiClient {
    pub fn new(config: VisionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: VisionConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    /// Classify a label image.
    ///
    /// `jpeg_base64` is the base64 payload of a normalised JPEG (no data URL
    /// prefix). The whole exchange is bounded by the configured timeout.
    pub async fn classify(
        &self,
        api_key: &str,
        jpeg_base64: &str,
    ) -> Result<LabelAnalysis, VisionError> {
        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    { "text": label_prompt() },
                    { "inlineData": { "mimeType": "image/jpeg", "data": jpeg_base64 } },
                ],
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "temperature": 0.0,
            },
        });

        let timeout_secs = self.config.timeout_secs;
        let call = async {
            let response = self
                .client
                .post(self.endpoint())
                .query(&[("key", api_key)])
                .json(&body)
                .send()
                .await?;
            Self::parse_response::<GenerateContentResponse>(response).await
        };

        let reply = tokio::time::timeout(Duration::from_secs(timeout_secs), call)
            .await
            .map_err(|_| VisionError::Timeout(timeout_secs))??;

        parse_analysis(&reply)
    }

    // ---- private helpers ----

    /// Return the response unchanged on success, or an
    /// [`VisionError::ApiError`] carrying the status and body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, VisionError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(VisionError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, VisionError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
