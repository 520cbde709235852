//! LLM client: the single point of entry for all text-generation calls.
//!
//! No other module talks to the LLM API directly. Calls are made with a fixed
//! timeout and exactly one attempt: a failed generation surfaces immediately
//! instead of being retried (the pipeline treats the transform stage as
//! single-shot). API keys rotate round-robin through an explicitly
//! constructed [`ApiKeyRing`]; there is no module-global key state.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::errors::AppError;

pub mod prompts;

const REQUEST_TIMEOUT_SECS: u64 = 90;

/// Round-robin ring over the configured API keys.
pub struct ApiKeyRing {
    keys: Vec<String>,
    next: AtomicUsize,
}

impl ApiKeyRing {
    pub fn new(keys: Vec<String>) -> Self {
        assert!(!keys.is_empty(), "key ring requires at least one key");
        Self {
            keys,
            next: AtomicUsize::new(0),
        }
    }

    pub fn next_key(&self) -> &str {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.keys.len();
        &self.keys[idx]
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }
}

// Request/response shapes of the generateContent API.

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// The LLM client shared across all handlers.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    keys: Arc<ApiKeyRing>,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(keys: ApiKeyRing, base_url: String, model: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            keys: Arc::new(keys),
            base_url,
            model,
        }
    }

    /// Single-attempt text generation. Non-success statuses become
    /// [`AppError::Upstream`] with the upstream body embedded.
    pub async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            self.model,
            self.keys.next_key()
        );

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("LLM request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "LLM returned {status}: {body}"
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("LLM response was not valid JSON: {e}")))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().find_map(|p| p.text))
            .ok_or_else(|| AppError::Upstream("LLM returned empty content".to_string()))?;

        debug!("LLM call succeeded ({} chars)", text.len());
        Ok(text)
    }

    /// Generates and parses a JSON response. Parse failures map to the fixed
    /// "failed to parse" error; the raw text travels with it for logging.
    pub async fn generate_json<T: DeserializeOwned>(&self, prompt: &str) -> Result<T, AppError> {
        let text = self.generate(prompt).await?;
        parse_llm_json(&text)
    }
}

/// Strips fences and parses the model output as `T`. Pure, so unit-testable
/// without a network.
pub fn parse_llm_json<T: DeserializeOwned>(text: &str) -> Result<T, AppError> {
    let stripped = strip_json_fences(text);
    serde_json::from_str(stripped).map_err(|_| AppError::AiResponseParse {
        raw: text.to_string(),
    })
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_parse_llm_json_valid_payload() {
        #[derive(Deserialize)]
        struct Out {
            key: String,
        }
        let out: Out = parse_llm_json("```json\n{\"key\": \"value\"}\n```").unwrap();
        assert_eq!(out.key, "value");
    }

    #[test]
    fn test_parse_llm_json_failure_carries_raw_text() {
        let result: Result<serde_json::Value, _> = parse_llm_json("I am not JSON, sorry");
        match result {
            Err(AppError::AiResponseParse { raw }) => {
                assert!(raw.contains("not JSON"));
            }
            other => panic!("expected AiResponseParse, got {other:?}"),
        }
    }

    #[test]
    fn test_key_ring_rotates_round_robin() {
        let ring = ApiKeyRing::new(vec!["k1".into(), "k2".into(), "k3".into()]);
        assert_eq!(ring.next_key(), "k1");
        assert_eq!(ring.next_key(), "k2");
        assert_eq!(ring.next_key(), "k3");
        assert_eq!(ring.next_key(), "k1");
    }
}
