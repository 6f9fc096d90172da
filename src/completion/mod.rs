//! Abstractions for generating text completions via hosted providers.
//!
//! Every pipeline stage is one completion call. The Gemini adapter is the primary backend and
//! accepts raw documents as inline parts; the Ollama adapter mirrors it for local runs but only
//! folds textual documents into the prompt. Both issue HTTP requests directly, keeping the wire
//! format in one place.

use crate::config::{CompletionProvider, get_config};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Errors surfaced while requesting a completion.
#[derive(Debug, Error)]
pub enum CompletionClientError {
    /// Provider endpoint was unreachable or missing.
    #[error("Completion provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate completion: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Document attached to a completion request as an inline part.
#[derive(Debug, Clone)]
pub struct InlineDocument {
    /// Declared media type of the attachment.
    pub media_type: String,
    /// Raw document bytes, encoded at the wire boundary.
    pub bytes: Vec<u8>,
}

/// Request payload passed to the completion provider.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Fully qualified model identifier understood by the provider.
    pub model: String,
    /// Prompt assembled by the pipeline.
    pub prompt: String,
    /// Optional raw document to send alongside the prompt.
    pub attachment: Option<InlineDocument>,
}

/// Interface implemented by completion providers.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate a plain-text completion using the configured model.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<String, CompletionClientError>;
}

/// Build a completion client based on configuration.
pub fn get_completion_client() -> Box<dyn CompletionClient + Send + Sync> {
    let config = get_config();
    match config.completion_provider {
        CompletionProvider::Gemini => {
            let base_url = config
                .gemini_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_GEMINI_URL.to_string());
            let api_key = config
                .gemini_api_key
                .clone()
                .expect("GEMINI_API_KEY validated during config load");
            Box::new(GeminiClient::new(base_url, api_key))
        }
        CompletionProvider::Ollama => {
            let base_url = config
                .ollama_url
                .clone()
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
            Box::new(OllamaClient::new(base_url))
        }
    }
}

struct GeminiClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    fn new(base_url: String, api_key: String) -> Self {
        let http = Client::builder()
            .user_agent("lexbrief/completion")
            .build()
            .expect("Failed to construct reqwest::Client for completions");
        Self {
            http,
            base_url,
            api_key,
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{model}:generateContent",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<String, CompletionClientError> {
        let mut parts = vec![json!({ "text": request.prompt })];
        if let Some(attachment) = &request.attachment {
            parts.push(json!({
                "inlineData": {
                    "mimeType": attachment.media_type,
                    "data": BASE64.encode(&attachment.bytes),
                }
            }));
        }
        let payload = json!({
            "contents": [{ "parts": parts }],
            "generationConfig": {
                // Lower temperature for reproducible analysis output.
                "temperature": 0.1,
            }
        });

        let response = self
            .http
            .post(self.endpoint(&request.model))
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                CompletionClientError::ProviderUnavailable(format!(
                    "failed to reach Gemini at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(CompletionClientError::ProviderUnavailable(format!(
                "Gemini model endpoint {} returned 404",
                self.endpoint(&request.model)
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionClientError::GenerationFailed(format!(
                "Gemini returned {status}: {body}"
            )));
        }

        let body: GeminiResponse = response.json().await.map_err(|error| {
            CompletionClientError::InvalidResponse(format!(
                "failed to decode Gemini response: {error}"
            ))
        })?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(CompletionClientError::InvalidResponse(
                "Gemini response contained no candidate text".into(),
            ));
        }

        Ok(text.trim().to_string())
    }
}

struct OllamaClient {
    http: Client,
    base_url: String,
}

impl OllamaClient {
    fn new(base_url: String) -> Self {
        let http = Client::builder()
            .user_agent("lexbrief/completion")
            .build()
            .expect("Failed to construct reqwest::Client for completions");
        Self { http, base_url }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

#[async_trait]
impl CompletionClient for OllamaClient {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<String, CompletionClientError> {
        let mut prompt = request.prompt;
        if let Some(attachment) = &request.attachment {
            if !attachment.media_type.starts_with("text/") {
                return Err(CompletionClientError::GenerationFailed(format!(
                    "inline documents of type '{}' are not supported by the ollama provider",
                    attachment.media_type
                )));
            }
            prompt.push_str("\n\nDocument:\n");
            prompt.push_str(&String::from_utf8_lossy(&attachment.bytes));
        }

        let payload = json!({
            "model": request.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": 0.1,
            }
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                CompletionClientError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(CompletionClientError::ProviderUnavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionClientError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: OllamaResponse = response.json().await.map_err(|error| {
            CompletionClientError::InvalidResponse(format!(
                "failed to decode Ollama response: {error}"
            ))
        })?;

        if !body.done {
            return Err(CompletionClientError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(body.response.trim().to_string())
    }
}
