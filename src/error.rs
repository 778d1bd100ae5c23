//! Error types for the pdf-mentor library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`MentorError`] — **Fatal** for one operation: the request cannot proceed
//!   at all (no usable document, unreadable download, provider not configured).
//!   Input-class variants map to a 400-equivalent status; see
//!   [`MentorError::status_code`].
//!
//! * [`TransportError`] — **Non-fatal**: a single generation attempt failed
//!   (timeout, non-2xx, missing candidates). The attempt loop in
//!   [`crate::pipeline::llm`] logs it and retries while budget remains.
//!
//! * [`GenerationError`] — **Terminal**: every attempt was consumed without a
//!   usable response. Carried inside [`crate::output::GenerationResult::Failure`]
//!   so callers decide whether to substitute fallback content.
//!
//! [`ShapeError`] rejects a decoded value that is not a list of the expected
//! items; operations treat it like a terminal failure.

use thiserror::Error;

/// Fatal errors for a single mentor operation.
#[derive(Debug, Error)]
pub enum MentorError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// No usable document, URL or text was supplied.
    #[error("{reason}")]
    InvalidInput { reason: String },

    /// The fetched or uploaded content is not a PDF.
    #[error("Content at '{source_name}' is not a PDF")]
    NotAPdf { source_name: String },

    /// HTTP URL was syntactically valid but the download failed.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// The text extractor could not read the document.
    #[error("Failed to read the PDF: {reason}")]
    ExtractionFailed { reason: String },

    /// The document was read but holds no usable text.
    #[error("The PDF contains no readable text")]
    EmptyDocument,

    // ── Provider / config errors ──────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MentorError {
    /// HTTP-equivalent status for this error.
    ///
    /// Input-class errors are the caller's fault and are never retried (400);
    /// everything else is a server-side problem (500).
    pub fn status_code(&self) -> u16 {
        match self {
            MentorError::InvalidInput { .. }
            | MentorError::NotAPdf { .. }
            | MentorError::DownloadFailed { .. }
            | MentorError::DownloadTimeout { .. }
            | MentorError::ExtractionFailed { .. }
            | MentorError::EmptyDocument => 400,
            MentorError::ProviderNotConfigured { .. }
            | MentorError::InvalidConfig(_)
            | MentorError::Internal(_) => 500,
        }
    }

    /// Convenience constructor for [`MentorError::InvalidInput`].
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        MentorError::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// A non-fatal failure of one generation attempt.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum TransportError {
    /// The endpoint answered with a non-2xx status.
    #[error("API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request did not complete within the per-call timeout.
    #[error("API call timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Connection, TLS or body-read failure.
    #[error("Network error: {0}")]
    Network(String),

    /// 2xx response without any candidate text.
    #[error("Response contained no candidates")]
    MissingCandidates,

    /// 2xx response whose body is not the expected JSON shape.
    #[error("Malformed API response: {0}")]
    MalformedResponse(String),

    /// Error surfaced by an edgequake-llm provider.
    #[error("Provider error: {0}")]
    Provider(String),
}

/// Terminal failure of the generation attempt loop.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum GenerationError {
    /// Every attempt failed, by transport error or by undecodable output.
    #[error("Generation failed after {attempts} attempt(s): {last_error}")]
    AttemptsExhausted { attempts: u32, last_error: String },
}

/// A decoded structured value that does not have the expected list shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// Neither an array nor an object wrapping exactly one array.
    #[error("Expected a list of {kind}, got {found}")]
    NotAList { kind: &'static str, found: String },

    /// The list decoded but holds nothing.
    #[error("Empty list of {kind}")]
    Empty { kind: &'static str },

    /// One element does not deserialize into the target type.
    #[error("{kind} #{index} is malformed: {reason}")]
    Item {
        kind: &'static str,
        index: usize,
        reason: String,
    },
}
