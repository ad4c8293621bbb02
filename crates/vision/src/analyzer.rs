use async_trait::async_trait;
use sakenote_core::record::LabelAnalysis;

use crate::client::{GeminiClient, VisionError};

/// Extracts structured attributes from a normalised label photo.
#[async_trait]
pub trait LabelAnalyzer: Send + Sync {
    /// `jpeg_base64` is the raw base64 payload of a JPEG.
    async fn analyze(&self, api_key: &str, jpeg_base64: &str) -> Result<LabelAnalysis, VisionError>;
}

#[async_trait]
impl LabelAnalyzer for GeminiClient {
    async fn analyze(&self, api_key: &str, jpeg_base64: &str) -> Result<LabelAnalysis, VisionError> {
        tracing::debug!(model = %self.config().model, bytes = jpeg_base64.len(), "Requesting label analysis");
        self.classify(api_key, jpeg_base64).await
    }
}
