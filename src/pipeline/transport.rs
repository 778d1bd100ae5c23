//! Outbound transport: wire types and the seam between the attempt loop and
//! the network.
//!
//! [`GenerationTransport`] is the only thing the
//! [`GenerationClient`](crate::pipeline::llm::GenerationClient) knows about
//! the model. Two implementations ship with the crate:
//!
//! * [`GeminiTransport`] — POSTs the `generateContent` JSON body directly with
//!   `reqwest` and extracts the first candidate's text.
//! * [`ProviderTransport`] — adapts any `edgequake_llm::LLMProvider`
//!   (OpenAI, Anthropic, Ollama, …) to the same contract.
//!
//! Tests inject their own implementation through
//! [`MentorConfig::transport`](crate::config::MentorConfig::transport).

use crate::config::MentorConfig;
use crate::error::{MentorError, TransportError};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

// ── Wire types ───────────────────────────────────────────────────────────

/// `generateContent` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    pub generation_config: SamplingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

/// Low-temperature, bounded sampling favouring instruction-following output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

impl SamplingConfig {
    pub fn from_config(config: &MentorConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
        }
    }
}

impl GenerateRequest {
    /// Single-part request carrying `prompt`.
    pub fn new(prompt: impl Into<String>, sampling: SamplingConfig) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.into(),
                }],
            }],
            generation_config: sampling,
        }
    }

    /// All part texts joined with blank lines.
    pub fn prompt_text(&self) -> String {
        self.contents
            .iter()
            .flat_map(|c| c.parts.iter())
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// `generateContent` response body; only the fields we read.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate.
    pub fn first_text(self) -> Result<String, TransportError> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(TransportError::MissingCandidates)?;
        candidate
            .content
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| {
                TransportError::MalformedResponse("first candidate has no text part".into())
            })
    }
}

// ── Transport trait ──────────────────────────────────────────────────────

/// Sends one generation request and returns the model's raw text.
///
/// Any `Err` counts as a failed attempt; the caller decides whether to retry.
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, TransportError>;

    /// Short name for logs.
    fn name(&self) -> &str {
        "custom"
    }
}

// ── Gemini HTTP transport ────────────────────────────────────────────────

/// Direct HTTP transport for the Gemini `generateContent` endpoint.
pub struct GeminiTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    timeout_secs: u64,
}

impl GeminiTransport {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, MentorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| MentorError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/models/{}:generateContent",
                base_url.trim_end_matches('/'),
                model
            ),
            api_key: api_key.into(),
            timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_reqwest_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            // The request URL carries the API key; keep it out of messages.
            TransportError::Network(e.without_url().to_string())
        }
    }
}

#[async_trait]
impl GenerationTransport for GeminiTransport {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: body.chars().take(300).collect(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;
        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| TransportError::MalformedResponse(e.to_string()))?;
        let text = parsed.first_text()?;
        debug!("Gemini returned {} chars", text.len());
        Ok(text)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// ── edgequake-llm provider adapter ───────────────────────────────────────

/// Runs generation requests through an `edgequake_llm` provider.
///
/// The whole prompt (instruction included) is sent as one user message;
/// only the temperature is forwarded since chat providers have no
/// portable top-p/top-k knobs.
pub struct ProviderTransport {
    provider: Arc<dyn LLMProvider>,
    name: String,
    timeout_secs: u64,
}

impl ProviderTransport {
    pub fn new(provider: Arc<dyn LLMProvider>, name: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            provider,
            name: name.into(),
            timeout_secs,
        }
    }

    /// Instantiate a named provider with the given model.
    pub fn from_name(
        provider_name: &str,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, MentorError> {
        let provider = ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
            MentorError::ProviderNotConfigured {
                provider: provider_name.to_string(),
                hint: format!("{e}"),
            }
        })?;
        Ok(Self::new(provider, provider_name, timeout_secs))
    }
}

#[async_trait]
impl GenerationTransport for ProviderTransport {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, TransportError> {
        let messages = vec![ChatMessage::user(request.prompt_text())];
        let options = CompletionOptions {
            temperature: Some(request.generation_config.temperature),
            ..Default::default()
        };

        let call = self.provider.chat(&messages, Some(&options));
        match tokio::time::timeout(Duration::from_secs(self.timeout_secs), call).await {
            Ok(Ok(response)) => Ok(response.content),
            Ok(Err(e)) => Err(TransportError::Provider(format!("{e}"))),
            Err(_) => Err(TransportError::Timeout {
                secs: self.timeout_secs,
            }),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Resolve the transport, from most-specific to least-specific:
///
/// 1. **Injected transport** (`config.transport`) — used as-is.
/// 2. **Named provider** (`config.provider_name`) — built through
///    `ProviderFactory` with `config.model`.
/// 3. **Gemini HTTP** — requires `config.api_key`.
pub fn resolve_transport(
    config: &MentorConfig,
) -> Result<Arc<dyn GenerationTransport>, MentorError> {
    if let Some(ref transport) = config.transport {
        return Ok(Arc::clone(transport));
    }

    if let Some(ref name) = config.provider_name {
        let transport = ProviderTransport::from_name(name, &config.model, config.api_timeout_secs)?;
        return Ok(Arc::new(transport));
    }

    let api_key = config
        .api_key
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| MentorError::ProviderNotConfigured {
            provider: "gemini".to_string(),
            hint: "Set API_KEY (or GEMINI_API_KEY) and MODEL, or choose a provider.".to_string(),
        })?;

    let transport = GeminiTransport::new(
        &config.base_url,
        &config.model,
        api_key,
        config.api_timeout_secs,
    )?;
    Ok(Arc::new(transport))
}
