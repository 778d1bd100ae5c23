//! Operation entry points: one method per kind of learning material.
//!
//! Every operation resolves its [`DocumentSource`], builds the matching
//! prompt, runs the [`GenerationClient`] and wraps the outcome in a
//! [`Reply`]. Operations never return `Err`: input problems become a 400
//! reply carrying only `error`, and generation failures become a 500 reply
//! that still carries a usable payload (fallback content for lists, a
//! placeholder message for summaries).

use crate::config::MentorConfig;
use crate::error::MentorError;
use crate::output::{
    EducationalResource, Flashcard, FlashcardsBody, FlashcardsMetadata, GenerationResult,
    PayloadStatus, ProcessedDocumentBody, QuizBody, QuizItem, QuizMetadata, Reply, ResourcesBody,
    ResourcesMetadata, SummaryBody, SummaryMetadata,
};
use crate::pipeline::input::{resolve_source, DocumentSource, TextExtractor};
use crate::pipeline::llm::GenerationClient;
use crate::pipeline::normalize::NormalizedText;
use crate::pipeline::shape::{decode_items, StructuredItem};
use crate::prompts;
use std::sync::Arc;
use tracing::{info, warn};

/// Summary text returned when prose generation fails.
pub const SUMMARY_FAILURE: &str = "Impossible de générer le résumé. Veuillez réessayer.";

/// Confirmation message of [`Mentor::process_document`].
pub const PROCESSED_MESSAGE: &str = "PDF traité avec succès";

/// Generates summaries, quizzes, flashcards and reading resources from
/// documents.
///
/// # Example
/// ```rust,no_run
/// use pdf_mentor::{DocumentSource, Mentor, MentorConfig};
///
/// # async fn run() -> Result<(), pdf_mentor::MentorError> {
/// let mentor = Mentor::new(MentorConfig::from_env())?;
/// let reply = mentor.quiz(DocumentSource::text("Le format PDF a été créé par Adobe.")).await;
/// println!("{} {:?}", reply.status, reply.body.quiz);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Mentor {
    client: GenerationClient,
    config: MentorConfig,
    extractor: Option<Arc<dyn TextExtractor>>,
}

/// A list payload plus how it was obtained.
struct ListOutcome<T> {
    items: Vec<T>,
    status: PayloadStatus,
    error: Option<String>,
}

impl<T> ListOutcome<T> {
    fn http_status(&self) -> u16 {
        if self.error.is_some() {
            500
        } else {
            200
        }
    }
}

impl Mentor {
    /// Build a mentor, resolving the generation transport from `config`.
    pub fn new(config: MentorConfig) -> Result<Self, MentorError> {
        let client = GenerationClient::from_config(&config)?;
        info!("Using {} transport", client.transport_name());
        Ok(Self {
            client,
            config,
            extractor: None,
        })
    }

    /// Plug in the PDF text extractor used for uploads and URLs.
    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn config(&self) -> &MentorConfig {
        &self.config
    }

    pub fn client(&self) -> &GenerationClient {
        &self.client
    }

    async fn resolve(&self, source: DocumentSource) -> Result<NormalizedText, MentorError> {
        let kind = source.kind();
        let text = resolve_source(source, self.extractor.as_ref(), &self.config).await?;
        info!("Resolved {kind} source to {} characters", text.char_len());
        Ok(text)
    }

    /// Extract and normalize the document text without generating anything.
    pub async fn process_document(&self, source: DocumentSource) -> Reply<ProcessedDocumentBody> {
        match self.resolve(source).await {
            Ok(text) => Reply::new(
                200,
                ProcessedDocumentBody {
                    success: Some(true),
                    text_length: Some(text.char_len()),
                    text: Some(text.into_string()),
                    message: Some(PROCESSED_MESSAGE.to_string()),
                    error: None,
                },
            ),
            Err(e) => Reply::new(
                e.status_code(),
                ProcessedDocumentBody {
                    error: Some(e.to_string()),
                    ..Default::default()
                },
            ),
        }
    }

    /// French summary of at most 300 words.
    pub async fn summary(&self, source: DocumentSource) -> Reply<SummaryBody> {
        let text = match self.resolve(source).await {
            Ok(text) => text,
            Err(e) => return input_error(e),
        };

        let prompt = prompts::summary_prompt(text.as_str());
        let text_length = text.char_len();

        match self.client.generate(&prompt, false).await {
            GenerationResult::PlainText(summary) if !summary.trim().is_empty() => {
                info!("Generated summary of {} characters", summary.chars().count());
                Reply::new(
                    200,
                    SummaryBody {
                        summary: Some(summary),
                        metadata: Some(SummaryMetadata {
                            text_length,
                            status: PayloadStatus::Success,
                        }),
                        error: None,
                    },
                )
            }
            other => {
                let error = match other {
                    GenerationResult::Failure(e) => e.to_string(),
                    _ => "model returned an empty summary".to_string(),
                };
                warn!("Summary generation failed: {error}");
                Reply::new(
                    500,
                    SummaryBody {
                        summary: Some(SUMMARY_FAILURE.to_string()),
                        metadata: Some(SummaryMetadata {
                            text_length,
                            status: PayloadStatus::Error,
                        }),
                        error: Some(error),
                    },
                )
            }
        }
    }

    /// Five-question multiple-choice quiz.
    pub async fn quiz(&self, source: DocumentSource) -> Reply<QuizBody> {
        let text = match self.resolve(source).await {
            Ok(text) => text,
            Err(e) => return input_error(e),
        };

        let outcome = self
            .generate_list::<QuizItem>(&prompts::quiz_prompt(text.as_str()))
            .await;
        Reply::new(
            outcome.http_status(),
            QuizBody {
                metadata: Some(QuizMetadata {
                    text_length: text.char_len(),
                    questions_count: outcome.items.len(),
                    status: outcome.status,
                }),
                quiz: Some(outcome.items),
                error: outcome.error,
            },
        )
    }

    /// Ten recto/verso flashcards.
    pub async fn flashcards(&self, source: DocumentSource) -> Reply<FlashcardsBody> {
        let text = match self.resolve(source).await {
            Ok(text) => text,
            Err(e) => return input_error(e),
        };

        let outcome = self
            .generate_list::<Flashcard>(&prompts::flashcards_prompt(text.as_str()))
            .await;
        Reply::new(
            outcome.http_status(),
            FlashcardsBody {
                metadata: Some(FlashcardsMetadata {
                    text_length: text.char_len(),
                    flashcards_count: outcome.items.len(),
                    status: outcome.status,
                }),
                flashcards: Some(outcome.items),
                error: outcome.error,
            },
        )
    }

    /// Five to eight further-reading resources.
    pub async fn resources(&self, source: DocumentSource) -> Reply<ResourcesBody> {
        let text = match self.resolve(source).await {
            Ok(text) => text,
            Err(e) => return input_error(e),
        };

        let outcome = self
            .generate_list::<EducationalResource>(&prompts::resources_prompt(text.as_str()))
            .await;
        Reply::new(
            outcome.http_status(),
            ResourcesBody {
                metadata: Some(ResourcesMetadata {
                    text_length: text.char_len(),
                    resources_count: outcome.items.len(),
                    status: outcome.status,
                }),
                resources: Some(outcome.items),
                error: outcome.error,
            },
        )
    }

    /// Structured generation with shape checking; any failure yields
    /// [`StructuredItem::fallback`].
    async fn generate_list<T: StructuredItem>(&self, prompt: &str) -> ListOutcome<T> {
        let error = match self.client.generate(prompt, true).await {
            GenerationResult::Structured(value) => match decode_items::<T>(value) {
                Ok(items) => {
                    info!("Generated {} {} entries", items.len(), T::KIND);
                    return ListOutcome {
                        items,
                        status: PayloadStatus::Success,
                        error: None,
                    }
                }
                Err(e) => e.to_string(),
            },
            GenerationResult::Failure(e) => e.to_string(),
            GenerationResult::PlainText(_) => "expected a structured reply".to_string(),
        };

        warn!("Using fallback {} list: {error}", T::KIND);
        ListOutcome {
            items: T::fallback(),
            status: PayloadStatus::Fallback,
            error: Some(error),
        }
    }
}

/// 400-class reply carrying only the error message.
fn input_error<B: Default + WithError>(e: MentorError) -> Reply<B> {
    warn!("Rejected input: {e}");
    let mut body = B::default();
    body.set_error(e.to_string());
    Reply::new(e.status_code(), body)
}

/// Bodies that carry an `error` side channel.
trait WithError {
    fn set_error(&mut self, error: String);
}

macro_rules! impl_with_error {
    ($($body:ty),*) => {
        $(impl WithError for $body {
            fn set_error(&mut self, error: String) {
                self.error = Some(error);
            }
        })*
    };
}

impl_with_error!(SummaryBody, QuizBody, FlashcardsBody, ResourcesBody);
