//! OpenAI-compatible embedding and generation providers over HTTP.
//!
//! This module is only available when the `openai` feature is enabled.
//! Configuration is explicit — the providers never read environment
//! variables.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::generation::{GenerationRequest, Generator};

/// The default API base for OpenAI-hosted models.
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Explicit configuration for the OpenAI-compatible providers.
///
/// Works against any endpoint speaking the OpenAI API shape (OpenAI itself,
/// vLLM, Ollama, ...) via `base_url`.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Bearer token for the API.
    pub api_key: String,
    /// Model name, e.g. `text-embedding-3-small` or `gpt-4o-mini`.
    pub model: String,
    /// API base URL without a trailing slash.
    pub base_url: String,
    /// Optional Matryoshka dimension override for embedding requests.
    pub dimensions: Option<usize>,
}

impl OpenAiConfig {
    /// Create a configuration against the OpenAI-hosted API.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            dimensions: None,
        }
    }

    /// Point the configuration at an OpenAI-compatible API.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Request embeddings truncated to this many dimensions.
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(RagError::InvalidConfiguration(
                "API key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Whether an HTTP status is worth retrying (rate limits and server errors).
fn retryable_status(status: reqwest::StatusCode) -> bool {
    status.as_u16() == 429 || status.is_server_error()
}

// ── API request/response types ─────────────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Read an error body, preferring the API's structured message.
async fn error_detail(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body)
}

// ── Embedder ───────────────────────────────────────────────────────

/// An [`Embedder`] backed by the `/embeddings` endpoint.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit::openai::{OpenAiConfig, OpenAiEmbedder};
///
/// let embedder = OpenAiEmbedder::new(OpenAiConfig::new("sk-...", "text-embedding-3-small"))?;
/// let vector = embedder.embed("hello world").await?;
/// ```
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiEmbedder {
    /// Create a new embedder from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] on an empty API key.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { client: reqwest::Client::new(), config })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| RagError::EmbeddingUnavailable {
            provider: "openai".to_string(),
            message: "API returned empty response".to_string(),
            retryable: false,
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = "openai", batch_size = texts.len(), model = %self.config.model, "embedding batch");

        let request_body = EmbeddingRequest {
            model: &self.config.model,
            input: texts.to_vec(),
            dimensions: self.config.dimensions,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "openai", error = %e, "embedding request failed");
                RagError::EmbeddingUnavailable {
                    provider: "openai".to_string(),
                    message: format!("request failed: {e}"),
                    retryable: true,
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = error_detail(response).await;
            error!(provider = "openai", %status, "embedding API error");
            return Err(RagError::EmbeddingUnavailable {
                provider: "openai".to_string(),
                message: format!("API returned {status}: {detail}"),
                retryable: retryable_status(status),
            });
        }

        let embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            error!(provider = "openai", error = %e, "failed to parse embedding response");
            RagError::EmbeddingUnavailable {
                provider: "openai".to_string(),
                message: format!("failed to parse response: {e}"),
                retryable: false,
            }
        })?;

        Ok(embedding_response.data.into_iter().map(|d| d.embedding).collect())
    }
}

// ── Generator ──────────────────────────────────────────────────────

/// A [`Generator`] backed by the `/chat/completions` endpoint.
///
/// The instruction travels as the system message; the context and question
/// are rendered into the user message.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiGenerator {
    /// Create a new generator from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] on an empty API key.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { client: reqwest::Client::new(), config })
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        debug!(provider = "openai", model = %self.config.model, "generation request");

        let request_body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system".to_string(), content: request.instruction.clone() },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!(
                        "Context:\n{}\n\nQuestion: {}",
                        request.context, request.question
                    ),
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "openai", error = %e, "generation request failed");
                RagError::GenerationUnavailable {
                    provider: "openai".to_string(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = error_detail(response).await;
            error!(provider = "openai", %status, "generation API error");
            return Err(RagError::GenerationUnavailable {
                provider: "openai".to_string(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = "openai", error = %e, "failed to parse generation response");
            RagError::GenerationUnavailable {
                provider: "openai".to_string(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        chat_response.choices.into_iter().next().map(|c| c.message.content).ok_or_else(|| {
            RagError::GenerationUnavailable {
                provider: "openai".to_string(),
                message: "API returned no choices".to_string(),
            }
        })
    }
}
