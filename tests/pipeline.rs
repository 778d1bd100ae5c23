//! Integration tests for the document → learning-material pipeline.
//!
//! Everything runs against a scripted in-process transport. The one live
//! test at the bottom calls the real Gemini endpoint and is gated behind
//! `E2E_ENABLED` plus `API_KEY`, so it does not run in CI unless requested.
//!
//! Run the live test with:
//!   E2E_ENABLED=1 API_KEY=... cargo test --test pipeline live_ -- --nocapture
//!
//! Retry warnings are captured per test; `RUST_LOG=debug` widens the filter.

use async_trait::async_trait;
use pdf_mentor::output::PayloadStatus;
use pdf_mentor::pipeline::fallback::{fallback_flashcards, fallback_quiz, fallback_resources};
use pdf_mentor::pipeline::normalize::{MAX_TEXT_CHARS, TRUNCATION_MARKER};
use pdf_mentor::{
    normalize, parse_markdown_quiz, DocumentSource, GenerateRequest, GenerationClient,
    GenerationResult, GenerationTransport, Mentor, MentorConfig, NormalizedText, TransportError,
};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Replays scripted replies in order, then keeps returning HTTP 503.
struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<String, TransportError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn new(replies: Vec<Result<String, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Self::new(Vec::new())
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl GenerationTransport for ScriptedTransport {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, TransportError> {
        self.prompts.lock().unwrap().push(request.prompt_text());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(TransportError::Status {
                status: 503,
                body: "service unavailable".into(),
            }))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Install a test-writer subscriber once; later calls are no-ops.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

fn config_with(transport: Arc<ScriptedTransport>) -> MentorConfig {
    init_logging();
    MentorConfig::builder()
        .transport(transport)
        .retry_backoff_ms(0)
        .build()
        .unwrap()
}

fn mentor_with(transport: Arc<ScriptedTransport>) -> Mentor {
    Mentor::new(config_with(transport)).unwrap()
}

fn client_with(transport: Arc<ScriptedTransport>) -> GenerationClient {
    GenerationClient::from_config(&config_with(transport)).unwrap()
}

const QUIZ_JSON: &str = r#"[
  {
    "question": "Qui a créé le format PDF ?",
    "options": ["a) Adobe", "b) Microsoft", "c) IBM", "d) Apple"],
    "answer": "a) Adobe",
    "explanation": "Adobe a publié le format en 1993."
  }
]"#;

const MARKDOWN_QUIZ: &str = "Voici le quiz demandé.

### Questions

**1. Que signifie PDF ?**
a) Portable Document Format
b) Personal Data File
c) Printable Document Form
d) Public Document File

**2. Qui a créé le format PDF ?**
a) Microsoft
b) Adobe
c) IBM
d) Apple

### Corrections

**1. Réponse : a) Portable Document Format**
*Explication : PDF est l'acronyme de Portable Document Format.*

**2. Réponse : b) Adobe**
*Explication : Adobe a créé le format au début des années 1990.*
";

// ── Normalization ────────────────────────────────────────────────────────────

#[test]
fn test_run_together_words_end_to_end() {
    let out = normalize("LeformatPDFestutile.IlfonctionnesurtouslesOS");
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2, "got {out:?}");
    assert!(lines[0].starts_with('L') && lines[0].ends_with('.'));
    assert!(lines[1].starts_with('I'));
    assert!(lines[1].ends_with(" OS"));
}

#[test]
fn test_normalize_idempotent_on_document_like_text() {
    let raw = "Chapitre1:Introduction\n\n  Le\u{00A0}PDF(Portable Document Format)est\tun format.\
               Créé en1993,il est partout!Pourquoi?Parce qu'il\u{200B}est fiable.";
    let once = normalize(raw);
    assert_eq!(normalize(&once), once);
    assert!(!once.contains('\t'));
    assert!(!once.contains("  "));
    for line in once.lines() {
        assert_eq!(line, line.trim());
    }
}

#[test]
fn test_cap_boundaries() {
    let at_limit = NormalizedText::new(&"b".repeat(MAX_TEXT_CHARS));
    assert!(!at_limit.as_str().contains(TRUNCATION_MARKER));

    let over = NormalizedText::new(&"b".repeat(MAX_TEXT_CHARS + 1));
    let head = over
        .as_str()
        .strip_suffix(TRUNCATION_MARKER)
        .expect("marker at the end");
    assert_eq!(head.trim_end_matches('\n').chars().count(), MAX_TEXT_CHARS);
}

// ── Generation client ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_strict_json_returned_unmodified() {
    let transport = ScriptedTransport::new(vec![Ok(QUIZ_JSON.into())]);
    let result = client_with(transport.clone()).generate("quiz", true).await;
    let expected: serde_json::Value = serde_json::from_str(QUIZ_JSON).unwrap();
    assert_eq!(result, GenerationResult::Structured(expected));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_fenced_json_decodes_like_bare_json() {
    let bare = client_with(ScriptedTransport::new(vec![Ok(QUIZ_JSON.into())]))
        .generate("quiz", true)
        .await;
    for fenced in [
        format!("```json\n{QUIZ_JSON}\n```"),
        format!("```\n{QUIZ_JSON}\n```"),
        format!("  ```json{QUIZ_JSON}```  "),
    ] {
        let result = client_with(ScriptedTransport::new(vec![Ok(fenced)]))
            .generate("quiz", true)
            .await;
        assert_eq!(result, bare);
    }
}

#[tokio::test]
async fn test_markdown_reply_recovered_as_structured() {
    let transport = ScriptedTransport::new(vec![Ok(MARKDOWN_QUIZ.into())]);
    let result = client_with(transport).generate("quiz", true).await;
    match result {
        GenerationResult::Structured(value) => {
            assert_eq!(value[1]["answer"], "b) Adobe");
            assert_eq!(value[0]["options"].as_array().unwrap().len(), 4);
        }
        other => panic!("expected structured result, got {other:?}"),
    }
}

#[tokio::test]
async fn test_persistent_failure_exhausts_two_attempts() {
    let transport = ScriptedTransport::failing();
    let result = client_with(transport.clone()).generate("quiz", true).await;
    assert!(result.is_failure());
    assert_eq!(transport.calls(), 2);
}

#[test]
fn test_logging_init_is_repeatable() {
    init_logging();
    init_logging();
    tracing::warn!("logging installed");
}

#[tokio::test]
async fn test_plain_text_failure_is_sentinel_string() {
    let transport = ScriptedTransport::failing();
    let text = client_with(transport).generate_text("résumé").await;
    assert_eq!(text, pdf_mentor::output::PLAIN_TEXT_FAILURE);
}

// ── Markdown quiz parser ─────────────────────────────────────────────────────

#[test]
fn test_markdown_two_questions() {
    let quiz = parse_markdown_quiz(MARKDOWN_QUIZ).expect("grammar matches");
    assert_eq!(quiz.len(), 2);
    for item in &quiz {
        assert_eq!(item.options.len(), 4);
        assert!(item.options.contains(&item.answer));
    }
    assert_eq!(quiz[0].answer, "a) Portable Document Format");
    assert_eq!(
        quiz[0].explanation,
        "PDF est l'acronyme de Portable Document Format."
    );
    assert_eq!(quiz[1].answer, "b) Adobe");
    assert_eq!(
        quiz[1].explanation,
        "Adobe a créé le format au début des années 1990."
    );
}

#[test]
fn test_markdown_without_corrections_is_none() {
    let truncated = MARKDOWN_QUIZ.split("### Corrections").next().unwrap();
    assert!(parse_markdown_quiz(truncated).is_none());
}

#[test]
fn test_markdown_unknown_letter_gives_empty_answer() {
    let text = MARKDOWN_QUIZ.replace("**2. Réponse : b) Adobe**", "**2. Réponse : d) Zebra**");
    let text = text.replace("d) Apple", "");
    let quiz = parse_markdown_quiz(&text).unwrap();
    assert_eq!(quiz[1].answer, "");
}

// ── Operations ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_total_failure_returns_fixed_fallbacks() {
    let transport = ScriptedTransport::failing();
    let mentor = mentor_with(transport.clone());
    let source = || DocumentSource::text("Le format PDF est utile.");

    let quiz = mentor.quiz(source()).await;
    assert_eq!(quiz.status, 500);
    assert_eq!(quiz.body.quiz.as_deref(), Some(fallback_quiz().as_slice()));
    assert_eq!(quiz.body.metadata.as_ref().unwrap().status, PayloadStatus::Fallback);

    let cards = mentor.flashcards(source()).await;
    assert_eq!(cards.body.flashcards.as_deref(), Some(fallback_flashcards().as_slice()));
    assert_eq!(cards.body.metadata.as_ref().unwrap().flashcards_count, 3);

    let res = mentor.resources(source()).await;
    assert_eq!(res.body.resources.as_deref(), Some(fallback_resources().as_slice()));
    assert_eq!(res.body.metadata.as_ref().unwrap().resources_count, 2);

    // Two attempts per operation.
    assert_eq!(transport.calls(), 6);
}

#[tokio::test]
async fn test_quiz_prompt_embeds_normalized_text() {
    let transport = ScriptedTransport::new(vec![Ok(QUIZ_JSON.into())]);
    let mentor = mentor_with(transport.clone());
    let reply = mentor
        .quiz(DocumentSource::text("LeformatPDFestutile.IlfonctionnesurtouslesOS"))
        .await;
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body.metadata.unwrap().questions_count, 1);
    let prompt = transport.last_prompt();
    assert!(prompt.ends_with("Leformat PDFestutile.\nIlfonctionnesurtousles OS\n"));
}

#[tokio::test]
async fn test_reply_body_json_shape() {
    let transport = ScriptedTransport::new(vec![Ok(QUIZ_JSON.into())]);
    let reply = mentor_with(transport)
        .quiz(DocumentSource::text("Texte."))
        .await;
    let v = serde_json::to_value(&reply.body).unwrap();
    assert_eq!(
        v["metadata"],
        json!({"text_length": 6, "questions_count": 1, "status": "success"})
    );
    assert!(v.get("error").is_none());
}

#[tokio::test]
async fn test_url_without_extractor_is_input_error() {
    let transport = ScriptedTransport::failing();
    let reply = mentor_with(transport.clone())
        .summary(DocumentSource::url("https://example.org/cours.pdf"))
        .await;
    assert_eq!(reply.status, 400);
    assert!(reply.body.summary.is_none());
    assert_eq!(transport.calls(), 0);
}

// ── Live endpoint ────────────────────────────────────────────────────────────

#[tokio::test]
async fn live_flashcards_from_gemini() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP — set E2E_ENABLED=1 to run live tests");
        return;
    }
    init_logging();
    let config = MentorConfig::from_env();
    if config.api_key.is_none() {
        println!("SKIP — API_KEY not set");
        return;
    }

    let mentor = Mentor::new(config).unwrap();
    let reply = mentor
        .flashcards(DocumentSource::text(
            "Le format PDF a été créé par Adobe en 1993. Il préserve la mise en page \
             d'un document quel que soit le logiciel utilisé pour l'ouvrir.",
        ))
        .await;
    println!("{}", serde_json::to_string_pretty(&reply.body).unwrap());
    assert!(!reply.body.flashcards.unwrap_or_default().is_empty());
}
