//! CLI binary for pdf-mentor.
//!
//! A thin shim over the library crate that maps CLI flags to `MentorConfig`,
//! runs one operation and prints the reply body as JSON.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pdf_mentor::output::ProcessedDocumentBody;
use pdf_mentor::pipeline::input::resolve_source;
use pdf_mentor::{DocumentSource, Mentor, MentorConfig, MentorConfigBuilder, Reply};
use serde::Serialize;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarise extracted text
  pdf-mentor summary --file cours.txt

  # Quiz from stdin
  pdftotext cours.pdf - | pdf-mentor quiz

  # Flashcards through another provider
  pdf-mentor flashcards --provider openai --model gpt-4.1-mini --text "..."

  # Inspect what the model would see (no API key needed)
  pdf-mentor normalize --file cours.txt

ENVIRONMENT VARIABLES:
  API_KEY                 Gemini API key (GEMINI_API_KEY also accepted)
  MODEL                   Model ID (default: gemini-2.0-flash)
  PDF_MENTOR_PROVIDER     edgequake-llm provider instead of direct Gemini

EXIT STATUS:
  0 when the reply status is below 400, 1 otherwise. Fallback content is
  still printed when generation fails.
"#;

/// Generate summaries, quizzes, flashcards and reading lists from documents.
#[derive(Parser, Debug)]
#[command(
    name = "pdf-mentor",
    version,
    about = "Generate summaries, quizzes, flashcards and reading lists from document text",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Document text.
    #[arg(long, global = true, conflicts_with_all = ["file", "url"])]
    text: Option<String>,

    /// UTF-8 file holding the document text.
    #[arg(long, global = true, conflicts_with = "url")]
    file: Option<PathBuf>,

    /// Remote PDF URL (needs a PDF text extractor).
    #[arg(long, global = true)]
    url: Option<String>,

    /// Model ID (e.g. gemini-2.0-flash).
    #[arg(long, global = true, env = "MODEL")]
    model: Option<String>,

    /// edgequake-llm provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, global = true, env = "PDF_MENTOR_PROVIDER")]
    provider: Option<String>,

    /// Request/parse cycles per generation.
    #[arg(long, global = true, env = "PDF_MENTOR_MAX_ATTEMPTS", default_value_t = 2)]
    max_attempts: u32,

    /// Per-call timeout in seconds.
    #[arg(long, global = true, env = "PDF_MENTOR_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// Delay between failed attempts in milliseconds.
    #[arg(long, global = true, env = "PDF_MENTOR_BACKOFF_MS", default_value_t = 1000)]
    backoff_ms: u64,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, global = true, env = "PDF_MENTOR_TEMPERATURE", default_value_t = 0.3)]
    temperature: f32,

    /// Disable the spinner.
    #[arg(long, global = true, env = "PDF_MENTOR_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDF_MENTOR_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the JSON reply.
    #[arg(short, long, global = true, env = "PDF_MENTOR_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// French summary of at most 300 words.
    Summary,
    /// Five-question multiple-choice quiz.
    Quiz,
    /// Ten recto/verso flashcards.
    Flashcards,
    /// Five to eight further-reading resources.
    Resources,
    /// Normalized, capped text only; no model call.
    Normalize,
}

/// The subcommands that call the model.
#[derive(Debug, Clone, Copy)]
enum Operation {
    Summary,
    Quiz,
    Flashcards,
    Resources,
}

impl Command {
    /// `None` for `normalize`, which never needs a transport.
    fn operation(self) -> Option<Operation> {
        match self {
            Command::Summary => Some(Operation::Summary),
            Command::Quiz => Some(Operation::Quiz),
            Command::Flashcards => Some(Operation::Flashcards),
            Command::Resources => Some(Operation::Resources),
            Command::Normalize => None,
        }
    }
}

impl Operation {
    fn label(self) -> &'static str {
        match self {
            Operation::Summary => "Summarising",
            Operation::Quiz => "Writing quiz",
            Operation::Flashcards => "Writing flashcards",
            Operation::Resources => "Finding resources",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let source = read_source(&cli)?;
    let config = build_config(&cli)?;

    let (status, json) = match cli.command.operation() {
        None => normalize_only(source, &config).await?,
        Some(operation) => {
            let mentor = Mentor::new(config).context("Failed to set up the model transport")?;
            let progress = show_progress.then(|| spinner(operation.label()));
            let out = run(operation, &mentor, source).await;
            if let Some(bar) = progress {
                bar.finish_and_clear();
            }
            out?
        }
    };
    println!("{json}");

    if status >= 400 {
        std::process::exit(1);
    }
    Ok(())
}

/// Pick the document source from `--text`, `--file`, `--url` or stdin.
fn read_source(cli: &Cli) -> Result<DocumentSource> {
    if cli.url.is_some() {
        bail!(
            "--url needs a PDF text extractor, which this binary does not ship; \
             extract the text first and pass it with --file or stdin"
        );
    }
    if let Some(ref text) = cli.text {
        return Ok(DocumentSource::text(text.clone()));
    }
    if let Some(ref path) = cli.file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return Ok(DocumentSource::text(text));
    }

    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read document text from stdin")?;
    Ok(DocumentSource::text(text))
}

/// Map CLI args to `MentorConfig`.
fn build_config(cli: &Cli) -> Result<MentorConfig> {
    let mut builder = MentorConfigBuilder::from_config(MentorConfig::from_env())
        .max_attempts(cli.max_attempts)
        .api_timeout_secs(cli.timeout)
        .retry_backoff_ms(cli.backoff_ms)
        .temperature(cli.temperature);

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }

    builder.build().context("Invalid configuration")
}

fn spinner(label: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix(label.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Run one operation and render its reply body.
async fn run(
    operation: Operation,
    mentor: &Mentor,
    source: DocumentSource,
) -> Result<(u16, String)> {
    match operation {
        Operation::Summary => render(mentor.summary(source).await),
        Operation::Quiz => render(mentor.quiz(source).await),
        Operation::Flashcards => render(mentor.flashcards(source).await),
        Operation::Resources => render(mentor.resources(source).await),
    }
}

/// Normalize without a model transport, so no API key is needed.
async fn normalize_only(source: DocumentSource, config: &MentorConfig) -> Result<(u16, String)> {
    let reply = match resolve_source(source, None, config).await {
        Ok(text) => Reply::new(
            200,
            ProcessedDocumentBody {
                success: Some(true),
                text_length: Some(text.char_len()),
                text: Some(text.into_string()),
                ..Default::default()
            },
        ),
        Err(e) => Reply::new(
            e.status_code(),
            ProcessedDocumentBody {
                error: Some(e.to_string()),
                ..Default::default()
            },
        ),
    };
    render(reply)
}

fn render<B: Serialize>(reply: Reply<B>) -> Result<(u16, String)> {
    let json = serde_json::to_string_pretty(&reply.body).context("Failed to serialise reply")?;
    Ok((reply.status, json))
}
