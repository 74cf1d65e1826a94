//! Reply generation via a remote completion API
//!
//! One synchronous call per request: transcript in, reply text out.
//! No retry, no streaming; the configured client timeout is the only
//! bound on this stage's latency.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::LlmConfig;
use crate::{Error, Result};

/// Capability to turn a transcript into a reply
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Generate a reply for `prompt`
    ///
    /// # Errors
    ///
    /// Returns `Error::Llm` if the remote call fails or yields an
    /// empty reply
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Request body for the Gemini `generateContent` endpoint
#[derive(serde::Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(serde::Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(serde::Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// Response from the Gemini `generateContent` endpoint
#[derive(serde::Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(serde::Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(serde::Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(serde::Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Reply generator backed by the Gemini completion API
#[derive(Debug)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a new client from configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the API key is missing or the HTTP
    /// client cannot be built
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                Error::Config("GEMINI_API_KEY required for reply generation".to_string())
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ReplyGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        tracing::debug!(prompt_chars = prompt.len(), model = %self.model, "requesting reply");

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "completion request failed");
                Error::Llm(format!("completion request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "completion API error");
            return Err(Error::Llm(format!("completion API error {status}: {body}")));
        }

        let result: GenerateResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse completion response");
            Error::Llm(format!("failed to parse completion response: {e}"))
        })?;

        let reply = result
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.trim())
            .unwrap_or_default();
        if reply.is_empty() {
            return Err(Error::Llm("empty reply generated".to_string()));
        }

        tracing::info!(reply_chars = reply.len(), "reply generated");
        Ok(reply.to_string())
    }
}
