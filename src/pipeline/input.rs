//! Input resolution: turn a [`DocumentSource`] into prompt-ready text.
//!
//! Uploaded and downloaded PDFs are handed to a [`TextExtractor`]; the crate
//! ships none, callers plug in whatever PDF library they use. Extraction runs
//! inside `spawn_blocking` since PDF parsing is CPU-bound. Every source ends
//! up normalized and capped as a [`NormalizedText`].

use crate::config::MentorConfig;
use crate::error::MentorError;
use crate::pipeline::normalize::NormalizedText;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Where the document text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// An uploaded PDF file.
    Upload { filename: String, bytes: Vec<u8> },
    /// A remote PDF, fetched over HTTP(S).
    Url(String),
    /// Text that was already extracted.
    Text(String),
}

impl DocumentSource {
    pub fn upload(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        DocumentSource::Upload {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        DocumentSource::Url(url.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        DocumentSource::Text(text.into())
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentSource::Upload { .. } => "upload",
            DocumentSource::Url(_) => "url",
            DocumentSource::Text(_) => "text",
        }
    }
}

/// Extracts the text layer of a PDF held in memory.
///
/// Implementations read at most `max_pages` pages and should report
/// unreadable documents as [`MentorError::ExtractionFailed`].
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, bytes: &[u8], max_pages: usize) -> Result<String, MentorError>;
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Whether a download is a PDF: the content type mentions `pdf` or the URL
/// ends in `.pdf` (both case-insensitive).
pub fn looks_like_pdf(content_type: &str, url: &str) -> bool {
    content_type.to_ascii_lowercase().contains("pdf") || url.to_ascii_lowercase().ends_with(".pdf")
}

/// Resolve `source` to normalized, capped text.
pub async fn resolve_source(
    source: DocumentSource,
    extractor: Option<&Arc<dyn TextExtractor>>,
    config: &MentorConfig,
) -> Result<NormalizedText, MentorError> {
    debug!("Resolving {} source", source.kind());

    let raw = match source {
        DocumentSource::Text(text) => {
            if text.trim().is_empty() {
                return Err(MentorError::invalid_input("No text provided"));
            }
            text
        }
        DocumentSource::Upload { filename, bytes } => {
            validate_upload_name(&filename)?;
            let extractor = require_extractor(extractor)?;
            extract(extractor, bytes, config.max_pages).await?
        }
        DocumentSource::Url(url) => {
            let url = url.trim().to_string();
            if !is_url(&url) {
                return Err(MentorError::invalid_input(format!("Invalid URL: '{url}'")));
            }
            let extractor = require_extractor(extractor)?;
            let bytes = download_pdf(&url, config.download_timeout_secs).await?;
            extract(extractor, bytes, config.max_pages).await?
        }
    };

    if raw.trim().is_empty() {
        return Err(MentorError::EmptyDocument);
    }

    let text = NormalizedText::with_limit(&raw, config.max_text_chars);
    if text.was_truncated() {
        info!(
            "Document text truncated to {} characters",
            config.max_text_chars
        );
    }
    Ok(text)
}

fn validate_upload_name(filename: &str) -> Result<(), MentorError> {
    if filename.trim().is_empty() {
        return Err(MentorError::invalid_input("No file selected"));
    }
    if !filename.to_ascii_lowercase().ends_with(".pdf") {
        return Err(MentorError::invalid_input(format!(
            "'{filename}' is not a PDF file"
        )));
    }
    Ok(())
}

fn require_extractor(
    extractor: Option<&Arc<dyn TextExtractor>>,
) -> Result<Arc<dyn TextExtractor>, MentorError> {
    extractor
        .cloned()
        .ok_or_else(|| MentorError::ExtractionFailed {
            reason: "no PDF text extractor is configured".into(),
        })
}

async fn extract(
    extractor: Arc<dyn TextExtractor>,
    bytes: Vec<u8>,
    max_pages: usize,
) -> Result<String, MentorError> {
    tokio::task::spawn_blocking(move || extractor.extract_text(&bytes, max_pages))
        .await
        .map_err(|e| MentorError::Internal(format!("Extraction task panicked: {e}")))?
}

/// Fetch `url` and return its body if it is a PDF.
async fn download_pdf(url: &str, timeout_secs: u64) -> Result<Vec<u8>, MentorError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| MentorError::Internal(format!("HTTP client: {e}")))?;

    let map_err = |e: reqwest::Error| {
        if e.is_timeout() {
            MentorError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            MentorError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let response = client.get(url).send().await.map_err(map_err)?;

    if !response.status().is_success() {
        return Err(MentorError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    if !looks_like_pdf(&content_type, url) {
        return Err(MentorError::NotAPdf {
            source_name: url.to_string(),
        });
    }

    let bytes = response.bytes().await.map_err(map_err)?;
    debug!("Downloaded {} bytes", bytes.len());
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::normalize::TRUNCATION_MARKER;
    use std::sync::Mutex;

    /// Treats the bytes as UTF-8 text and records the page limit it got.
    #[derive(Default)]
    struct Utf8Extractor {
        seen_pages: Mutex<Option<usize>>,
    }

    impl TextExtractor for Utf8Extractor {
        fn extract_text(&self, bytes: &[u8], max_pages: usize) -> Result<String, MentorError> {
            *self.seen_pages.lock().unwrap() = Some(max_pages);
            String::from_utf8(bytes.to_vec()).map_err(|e| MentorError::ExtractionFailed {
                reason: e.to_string(),
            })
        }
    }

    fn config() -> MentorConfig {
        MentorConfig::default()
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("ftp://example.com/doc.pdf"));
        assert!(!is_url("doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn test_looks_like_pdf() {
        assert!(looks_like_pdf("application/pdf", "https://x.org/download"));
        assert!(looks_like_pdf("application/octet-stream", "https://x.org/A.PDF"));
        assert!(!looks_like_pdf("text/html; charset=utf-8", "https://x.org/page"));
    }

    #[tokio::test]
    async fn text_source_is_normalized() {
        let text = resolve_source(DocumentSource::text("Un.Deux"), None, &config())
            .await
            .unwrap();
        assert_eq!(text.as_str(), "Un.\nDeux");
    }

    #[tokio::test]
    async fn blank_text_is_invalid_input() {
        let err = resolve_source(DocumentSource::text(" \n\t"), None, &config())
            .await
            .unwrap_err();
        assert!(matches!(err, MentorError::InvalidInput { .. }));
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn text_source_is_capped() {
        let cfg = MentorConfig::builder().max_text_chars(10).build().unwrap();
        let text = resolve_source(DocumentSource::text("a".repeat(50)), None, &cfg)
            .await
            .unwrap();
        assert!(text.was_truncated());
        assert!(text.as_str().ends_with(TRUNCATION_MARKER));
    }

    #[tokio::test]
    async fn upload_requires_filename() {
        let err = resolve_source(DocumentSource::upload("", b"x".to_vec()), None, &config())
            .await
            .unwrap_err();
        assert!(matches!(err, MentorError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn upload_requires_pdf_extension() {
        let err = resolve_source(DocumentSource::upload("notes.docx", b"x".to_vec()), None, &config())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("notes.docx"));
    }

    #[tokio::test]
    async fn upload_without_extractor_fails_extraction() {
        let err = resolve_source(DocumentSource::upload("cours.pdf", b"x".to_vec()), None, &config())
            .await
            .unwrap_err();
        assert!(matches!(err, MentorError::ExtractionFailed { .. }));
    }

    #[tokio::test]
    async fn upload_goes_through_extractor() {
        let concrete = Arc::new(Utf8Extractor::default());
        let extractor: Arc<dyn TextExtractor> = concrete.clone();
        let source = DocumentSource::upload("Cours.PDF", "Bonjour  le monde".as_bytes().to_vec());
        let text = resolve_source(source, Some(&extractor), &config()).await.unwrap();
        assert_eq!(text.as_str(), "Bonjour le monde");
        assert_eq!(*concrete.seen_pages.lock().unwrap(), Some(10));
    }

    #[tokio::test]
    async fn blank_extraction_is_empty_document() {
        let extractor: Arc<dyn TextExtractor> = Arc::new(Utf8Extractor::default());
        let source = DocumentSource::upload("vide.pdf", b"  \n ".to_vec());
        let err = resolve_source(source, Some(&extractor), &config()).await.unwrap_err();
        assert!(matches!(err, MentorError::EmptyDocument));
    }

    #[tokio::test]
    async fn extractor_errors_propagate() {
        let extractor: Arc<dyn TextExtractor> = Arc::new(Utf8Extractor::default());
        let source = DocumentSource::upload("bad.pdf", vec![0xff, 0xfe]);
        let err = resolve_source(source, Some(&extractor), &config()).await.unwrap_err();
        assert!(matches!(err, MentorError::ExtractionFailed { .. }));
    }

    #[tokio::test]
    async fn non_http_url_is_invalid_input() {
        let extractor: Arc<dyn TextExtractor> = Arc::new(Utf8Extractor::default());
        let err = resolve_source(DocumentSource::url("file:///tmp/a.pdf"), Some(&extractor), &config())
            .await
            .unwrap_err();
        assert!(matches!(err, MentorError::InvalidInput { .. }));
    }
}
