//! # pdf-mentor
//!
//! Turn documents into learning material (summaries, quizzes, flashcards and
//! reading lists) with a generative language model.
//!
//! Talking to the model is the easy part. The hard part is what surrounds it:
//! text extracted from PDFs arrives with words glued together and paragraph
//! breaks lost, and the model's reply is only *usually* the JSON it was asked
//! for. This crate repairs the former and decodes the latter resiliently,
//! falling back to canned content so callers always get a typed, non-empty
//! payload.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document
//!  │
//!  ├─ 1. Input      upload / URL / raw text → text (pluggable PDF extractor)
//!  ├─ 2. Normalize  9-rule repair chain, capped at 6000 characters
//!  ├─ 3. Generate   attempt loop: fence stripping, strict JSON, Markdown quiz
//!  ├─ 4. Shape      non-empty list of typed items
//!  └─ 5. Fallback   canned quiz / flashcards / resources on total failure
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_mentor::{DocumentSource, Mentor, MentorConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Gemini credentials from API_KEY and MODEL
//!     let mentor = Mentor::new(MentorConfig::from_env())?;
//!     let reply = mentor
//!         .flashcards(DocumentSource::text("Le format PDF a été créé par Adobe."))
//!         .await;
//!     println!("{}", serde_json::to_string_pretty(&reply.body)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf-mentor` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf-mentor = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod mentor;
pub mod output;
pub mod pipeline;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{MentorConfig, MentorConfigBuilder};
pub use error::{GenerationError, MentorError, ShapeError, TransportError};
pub use mentor::Mentor;
pub use output::{
    EducationalResource, Flashcard, GenerationResult, PayloadStatus, QuizItem, Reply,
};
pub use pipeline::input::{DocumentSource, TextExtractor};
pub use pipeline::llm::GenerationClient;
pub use pipeline::markdown_quiz::parse_markdown_quiz;
pub use pipeline::normalize::{normalize, NormalizedText};
pub use pipeline::transport::{GenerateRequest, GenerationTransport};
