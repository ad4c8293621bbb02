//! Decoding of `generateContent` replies.

use std::sync::LazyLock;

use regex::Regex;
use sakenote_core::record::LabelAnalysis;
use serde::Deserialize;

use crate::client::VisionError;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```json\n?|\n?```").expect("valid code fence pattern"));

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

#[derive(Debug, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
pub struct Part {
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

/// Remove markdown code fences the model sometimes wraps JSON in.
pub fn strip_code_fences(text: &str) -> String {
    CODE_FENCE.replace_all(text, "").trim().to_string()
}

/// Turn a model reply into a label analysis.
pub fn parse_analysis(response: &GenerateContentResponse) -> Result<LabelAnalysis, VisionError> {
    let text = response.first_text().ok_or(VisionError::EmptyResponse)?;
    let cleaned = strip_code_fences(text);
    let value: serde_json::Value = serde_json::from_str(&cleaned)
        .map_err(|e| VisionError::Malformed(format!("reply is not JSON: {e}")))?;
    LabelAnalysis::from_value(value).map_err(|e| VisionError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn reply(text: &str) -> GenerateContentResponse {
        serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        }))
        .unwrap()
    }

    #[test]
    fn strips_json_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn parses_fenced_reply() {
        let analysis = parse_analysis(&reply("```json\n{\"category\":\"日本酒\",\"name\":\"獺祭\"}\n```")).unwrap();
        assert_eq!(analysis.text("category").as_deref(), Some("日本酒"));
        assert_eq!(analysis.text("name").as_deref(), Some("獺祭"));
    }

    #[test]
    fn missing_candidates_is_empty_response() {
        let empty: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_matches!(parse_analysis(&empty), Err(VisionError::EmptyResponse));

        let no_content: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [{}] })).unwrap();
        assert_matches!(parse_analysis(&no_content), Err(VisionError::EmptyResponse));
    }

    #[test]
    fn non_json_or_non_object_is_malformed() {
        assert_matches!(parse_analysis(&reply("sorry, I can't")), Err(VisionError::Malformed(_)));
        assert_matches!(parse_analysis(&reply("[1,2,3]")), Err(VisionError::Malformed(_)));
    }
}
