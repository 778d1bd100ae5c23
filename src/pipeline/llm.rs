//! Generation client: one prompt in, one [`GenerationResult`] out.
//!
//! Each call runs an explicit attempt loop. Every attempt is classified into
//! an [`AttemptOutcome`] and the loop only decides what to do next:
//!
//! ```text
//! Attempting ──► Text / Json / Markdown          → return
//!           ├──► TransportFailed (budget left)   → sleep backoff, retry
//!           ├──► Undecodable     (budget left)   → retry immediately
//!           └──► budget exhausted                → Failure
//! ```
//!
//! The backoff only runs between attempts, never after the last one, so the
//! worst case for the default two attempts is two call timeouts plus one
//! backoff.
//!
//! ## Structured Decoding
//!
//! When a JSON reply is expected the request carries
//! [`JSON_ONLY_INSTRUCTION`] ahead of the prompt. The reply is unwrapped from
//! any code fence, decoded as strict JSON, and on failure handed to the
//! [Markdown quiz parser](crate::pipeline::markdown_quiz). An undecodable
//! reply consumes an attempt but is not a transport failure, so it is retried
//! without the backoff sleep.

use crate::config::MentorConfig;
use crate::error::{GenerationError, MentorError, TransportError};
use crate::output::GenerationResult;
use crate::output::QuizItem;
use crate::pipeline::markdown_quiz::parse_markdown_quiz;
use crate::pipeline::transport::{
    resolve_transport, GenerateRequest, GenerationTransport, SamplingConfig,
};
use crate::prompts::JSON_ONLY_INSTRUCTION;
use serde_json::Value;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, warn};

/// Classification of a single attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// Prose reply (plain-text mode).
    Text(String),
    /// Strict JSON decoded from the (fence-stripped) reply.
    Json(Value),
    /// JSON failed but the Markdown quiz grammar matched.
    Markdown(Vec<QuizItem>),
    /// Neither decoder accepted the reply. `preview` is its first characters.
    Undecodable { preview: String },
    /// The transport returned an error.
    TransportFailed(TransportError),
}

/// Strip one leading `` ```json `` or `` ``` `` fence and one trailing
/// `` ``` `` fence, then trim.
pub fn strip_code_fences(text: &str) -> &str {
    let s = text.trim();
    let s = s.strip_prefix("```json").unwrap_or(s);
    let s = s.strip_prefix("```").unwrap_or(s);
    let s = s.strip_suffix("```").unwrap_or(s);
    s.trim()
}

/// Classify a successful transport reply.
pub fn classify(text: String, expect_structured: bool) -> AttemptOutcome {
    if !expect_structured {
        return AttemptOutcome::Text(text);
    }

    let clean = strip_code_fences(&text);
    match serde_json::from_str::<Value>(clean) {
        Ok(value) => AttemptOutcome::Json(value),
        Err(e) => {
            warn!("Reply is not valid JSON ({e}), trying the Markdown quiz layout");
            match parse_markdown_quiz(clean) {
                Some(items) => AttemptOutcome::Markdown(items),
                None => AttemptOutcome::Undecodable {
                    preview: clean.chars().take(80).collect(),
                },
            }
        }
    }
}

/// Issues generation requests through a [`GenerationTransport`] with a fixed
/// attempt budget.
#[derive(Clone)]
pub struct GenerationClient {
    transport: Arc<dyn GenerationTransport>,
    sampling: SamplingConfig,
    max_attempts: u32,
    backoff: Duration,
}

impl std::fmt::Debug for GenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationClient")
            .field("transport", &self.transport.name())
            .field("sampling", &self.sampling)
            .field("max_attempts", &self.max_attempts)
            .field("backoff", &self.backoff)
            .finish()
    }
}

impl GenerationClient {
    /// Client over an explicit transport; sampling and retry settings come
    /// from `config`.
    pub fn new(transport: Arc<dyn GenerationTransport>, config: &MentorConfig) -> Self {
        Self {
            transport,
            sampling: SamplingConfig::from_config(config),
            max_attempts: config.max_attempts,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// Client over the transport [`resolve_transport`] picks for `config`.
    pub fn from_config(config: &MentorConfig) -> Result<Self, MentorError> {
        let transport = resolve_transport(config)?;
        Ok(Self::new(transport, config))
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Generate with the configured attempt budget.
    pub async fn generate(&self, prompt: &str, expect_structured: bool) -> GenerationResult {
        self.generate_with_attempts(prompt, expect_structured, self.max_attempts)
            .await
    }

    /// Generate prose; a failed generation yields
    /// [`PLAIN_TEXT_FAILURE`](crate::output::PLAIN_TEXT_FAILURE).
    pub async fn generate_text(&self, prompt: &str) -> String {
        self.generate(prompt, false).await.into_text()
    }

    /// Generate with an explicit attempt budget (at least one attempt runs).
    pub async fn generate_with_attempts(
        &self,
        prompt: &str,
        expect_structured: bool,
        max_attempts: u32,
    ) -> GenerationResult {
        let max_attempts = max_attempts.max(1);
        let request = if expect_structured {
            GenerateRequest::new(format!("{JSON_ONLY_INSTRUCTION}\n\n{prompt}"), self.sampling)
        } else {
            GenerateRequest::new(prompt, self.sampling)
        };

        let mut last_error = String::from("no attempt made");

        for attempt in 1..=max_attempts {
            let outcome = match self.transport.generate(&request).await {
                Ok(text) => classify(text, expect_structured),
                Err(e) => AttemptOutcome::TransportFailed(e),
            };

            match outcome {
                AttemptOutcome::Text(text) => {
                    debug!("Attempt {attempt}: {} chars of prose", text.len());
                    return GenerationResult::PlainText(text);
                }
                AttemptOutcome::Json(value) => {
                    debug!("Attempt {attempt}: decoded JSON reply");
                    return GenerationResult::Structured(value);
                }
                AttemptOutcome::Markdown(items) => {
                    debug!("Attempt {attempt}: recovered {} quiz items from Markdown", items.len());
                    match serde_json::to_value(items) {
                        Ok(value) => return GenerationResult::Structured(value),
                        Err(e) => last_error = format!("re-encoding Markdown quiz: {e}"),
                    }
                }
                AttemptOutcome::Undecodable { preview } => {
                    warn!(
                        "Attempt {attempt}/{max_attempts}: reply matched neither JSON nor Markdown ({preview:?})"
                    );
                    last_error = "reply matched neither JSON nor the Markdown quiz layout".into();
                }
                AttemptOutcome::TransportFailed(e) => {
                    warn!(
                        "Attempt {attempt}/{max_attempts} via {} failed: {e}",
                        self.transport.name()
                    );
                    last_error = e.to_string();
                    if attempt < max_attempts && !self.backoff.is_zero() {
                        sleep(self.backoff).await;
                    }
                }
            }
        }

        error!("Generation gave up after {max_attempts} attempt(s): {last_error}");
        GenerationResult::Failure(GenerationError::AttemptsExhausted {
            attempts: max_attempts,
            last_error,
        })
    }
}
