//! Domain types produced by the pipeline and the reply envelopes returned by
//! [`crate::Mentor`] operations.

use crate::error::GenerationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Option labels, in slot order.
pub const OPTION_LETTERS: [char; 4] = ['a', 'b', 'c', 'd'];

/// One multiple-choice question.
///
/// `options` always holds four slots labelled `"a) "` to `"d) "` (empty
/// strings for missing ones) and `answer` is either one of `options`
/// verbatim or `""` when no correct option could be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    pub question: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub explanation: String,
}

/// A two-sided study card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub recto: String,
    pub verso: String,
}

/// A recommended reading/viewing resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationalResource {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub why_useful: String,
}

/// Outcome of one [`crate::pipeline::llm::GenerationClient::generate`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResult {
    /// Prose generation succeeded.
    PlainText(String),
    /// Structured generation decoded, either as strict JSON or via the
    /// Markdown quiz grammar (re-encoded as a JSON array).
    Structured(Value),
    /// All attempts were consumed.
    Failure(GenerationError),
}

/// Text substituted for a failed prose generation.
pub const PLAIN_TEXT_FAILURE: &str = "Erreur: Impossible de générer le contenu.";

impl GenerationResult {
    /// Prose view of the result; a failure becomes [`PLAIN_TEXT_FAILURE`].
    pub fn into_text(self) -> String {
        match self {
            GenerationResult::PlainText(text) => text,
            GenerationResult::Structured(value) => value.to_string(),
            GenerationResult::Failure(_) => PLAIN_TEXT_FAILURE.to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, GenerationResult::Failure(_))
    }
}

// ── Reply envelopes ──────────────────────────────────────────────────────

/// A body plus its HTTP-equivalent status.
///
/// The status is what an HTTP layer would send; the body is never empty on
/// failure; it carries either a best-effort payload or an `error` message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply<B> {
    pub status: u16,
    pub body: B,
}

impl<B> Reply<B> {
    pub fn new(status: u16, body: B) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// How the payload of a reply was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadStatus {
    /// Generated by the model and decoded.
    Success,
    /// Substituted from the fallback content provider.
    Fallback,
    /// Prose generation failed; the payload is a placeholder message.
    Error,
}

/// Metadata attached to a summary reply. The list replies below add a count
/// named after the listed item (`questions_count`, …).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetadata {
    pub text_length: usize,
    pub status: PayloadStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizMetadata {
    pub text_length: usize,
    pub questions_count: usize,
    pub status: PayloadStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashcardsMetadata {
    pub text_length: usize,
    pub flashcards_count: usize,
    pub status: PayloadStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcesMetadata {
    pub text_length: usize,
    pub resources_count: usize,
    pub status: PayloadStatus,
}

/// Body of [`crate::Mentor::process_document`].
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ProcessedDocumentBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of [`crate::Mentor::summary`].
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct SummaryBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SummaryMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of [`crate::Mentor::quiz`].
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct QuizBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz: Option<Vec<QuizItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<QuizMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of [`crate::Mentor::flashcards`].
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct FlashcardsBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flashcards: Option<Vec<Flashcard>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<FlashcardsMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of [`crate::Mentor::resources`].
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ResourcesBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<EducationalResource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResourcesMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
