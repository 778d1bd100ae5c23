//! Configuration for the generation pipeline.
//!
//! All behaviour is controlled through [`MentorConfig`], built via its
//! [`MentorConfigBuilder`] or loaded from the environment with
//! [`MentorConfig::from_env`]. Credentials and the model identifier live here
//! and are threaded into the [`crate::pipeline::llm::GenerationClient`] at
//! construction; nothing in the crate reads them from process-wide state
//! afterwards, so tests can inject a fake transport.

use crate::error::MentorError;
use crate::pipeline::transport::GenerationTransport;
use std::fmt;
use std::sync::Arc;

/// Default Gemini API root; the model path segment is appended per request.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when neither the builder nor `MODEL` names one.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Configuration for a [`crate::Mentor`].
///
/// # Example
/// ```rust
/// use pdf_mentor::MentorConfig;
///
/// let config = MentorConfig::builder()
///     .api_key("test-key")
///     .model("gemini-2.0-flash")
///     .max_attempts(3)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_attempts, 3);
/// ```
#[derive(Clone)]
pub struct MentorConfig {
    /// API key for the Gemini endpoint. Read from `API_KEY` (or `GEMINI_API_KEY`).
    pub api_key: Option<String>,

    /// Model identifier, e.g. "gemini-2.0-flash". Read from `MODEL`.
    pub model: String,

    /// API root for the direct Gemini transport.
    pub base_url: String,

    /// edgequake-llm provider name (e.g. "openai", "anthropic", "ollama").
    /// When set, requests go through [`crate::pipeline::transport::ProviderTransport`].
    pub provider_name: Option<String>,

    /// Pre-constructed transport. Takes precedence over `provider_name`.
    pub transport: Option<Arc<dyn GenerationTransport>>,

    /// Sampling temperature. Default: 0.3.
    pub temperature: f32,

    /// Nucleus sampling bound. Default: 0.8.
    pub top_p: f32,

    /// Top-k sampling bound. Default: 40.
    pub top_k: u32,

    /// Total request/parse cycles per generation, first try included. Default: 2.
    pub max_attempts: u32,

    /// Fixed delay between attempts in milliseconds. Default: 1000.
    pub retry_backoff_ms: u64,

    /// Per-call timeout in seconds. Default: 30.
    pub api_timeout_secs: u64,

    /// Maximum characters of normalized text embedded in a prompt. Default: 6000.
    pub max_text_chars: usize,

    /// Pages handed to the text extractor at most. Default: 10.
    pub max_pages: usize,

    /// Download timeout for URL sources in seconds. Default: 30.
    pub download_timeout_secs: u64,
}

impl Default for MentorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            provider_name: None,
            transport: None,
            temperature: 0.3,
            top_p: 0.8,
            top_k: 40,
            max_attempts: 2,
            retry_backoff_ms: 1000,
            api_timeout_secs: 30,
            max_text_chars: 6000,
            max_pages: 10,
            download_timeout_secs: 30,
        }
    }
}

impl fmt::Debug for MentorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MentorConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("provider_name", &self.provider_name)
            .field(
                "transport",
                &self.transport.as_ref().map(|_| "<dyn GenerationTransport>"),
            )
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("top_k", &self.top_k)
            .field("max_attempts", &self.max_attempts)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_text_chars", &self.max_text_chars)
            .field("max_pages", &self.max_pages)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .finish()
    }
}

impl MentorConfig {
    /// Create a new builder for `MentorConfig`.
    pub fn builder() -> MentorConfigBuilder {
        MentorConfigBuilder {
            config: Self::default(),
        }
    }

    /// Defaults overlaid with `API_KEY`/`GEMINI_API_KEY` and `MODEL`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.api_key = non_empty_env("API_KEY").or_else(|| non_empty_env("GEMINI_API_KEY"));
        if let Some(model) = non_empty_env("MODEL") {
            config.model = model;
        }
        config
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Builder for [`MentorConfig`].
#[derive(Debug)]
pub struct MentorConfigBuilder {
    config: MentorConfig,
}

impl MentorConfigBuilder {
    /// Start from an existing configuration (e.g. [`MentorConfig::from_env`]).
    pub fn from_config(config: MentorConfig) -> Self {
        Self { config }
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn transport(mut self, transport: Arc<dyn GenerationTransport>) -> Self {
        self.config.transport = Some(transport);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn top_p(mut self, p: f32) -> Self {
        self.config.top_p = p;
        self
    }

    pub fn top_k(mut self, k: u32) -> Self {
        self.config.top_k = k;
        self
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.max_attempts = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn max_text_chars(mut self, n: usize) -> Self {
        self.config.max_text_chars = n;
        self
    }

    pub fn max_pages(mut self, n: usize) -> Self {
        self.config.max_pages = n.max(1);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<MentorConfig, MentorError> {
        let c = &self.config;
        if c.max_attempts == 0 {
            return Err(MentorError::InvalidConfig(
                "max_attempts must be ≥ 1".into(),
            ));
        }
        if c.top_k == 0 {
            return Err(MentorError::InvalidConfig("top_k must be ≥ 1".into()));
        }
        if !(0.0..=1.0).contains(&c.top_p) {
            return Err(MentorError::InvalidConfig(format!(
                "top_p must be within 0–1, got {}",
                c.top_p
            )));
        }
        if c.max_text_chars == 0 {
            return Err(MentorError::InvalidConfig(
                "max_text_chars must be ≥ 1".into(),
            ));
        }
        if c.model.trim().is_empty() {
            return Err(MentorError::InvalidConfig("model must not be empty".into()));
        }
        Ok(self.config)
    }
}
