//! AI label classification.
//!
//! - [`GeminiClient`]: REST client for the `generateContent` endpoint.
//! - [`prompt`]: the fixed instruction sent with every image.
//! - [`response`]: extraction of the JSON object from the model reply.
//! - [`LabelAnalyzer`]: the seam the API crate depends on, so tests can
//!   inject a stub.

pub mod analyzer;
pub mod client;
pub mod prompt;
pub mod response;

pub use analyzer::LabelAnalyzer;
pub use client::{GeminiClient, VisionConfig, VisionError};
