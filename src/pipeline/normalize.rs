//! Text normalization: deterministic repair of text extracted from PDFs.
//!
//! Text-layer extraction from paged documents frequently glues adjacent words
//! together (`LeformatPDFestutile`) and loses paragraph breaks. No single
//! regex fixes that; the rules below are a best-effort, order-sensitive chain
//! where each rule assumes the earlier ones already ran.
//!
//! ## Rule Order
//!
//! 1. Replace non-breaking spaces with spaces and drop zero-width spaces
//! 2. Collapse runs of spaces/tabs to one space
//! 3. Space after `. , ; : ! ?` directly followed by a letter
//! 4. Split lowercase→uppercase boundaries
//! 5. Split digit→letter and letter→digit boundaries
//! 6. Space before `(` preceded by a letter, after `)` followed by a letter
//! 7. Line break after `.`, `?`, `!` followed by whitespace
//! 8. Trim every line and drop empty lines
//! 9. Collapse any remaining space runs
//!
//! Invisible characters are handled first: a zero-width space between `.`
//! and a letter would otherwise hide that boundary from rule 3 on this pass
//! and expose it on the next, and `normalize` must be idempotent.
//!
//! [`NormalizedText`] adds the prompt size cap on top of [`normalize`].

use once_cell::sync::Lazy;
use regex::Regex;

/// Default cap on normalized text embedded in a prompt, in characters.
pub const MAX_TEXT_CHARS: usize = 6000;

/// Appended (after a blank line) when text exceeds the cap.
pub const TRUNCATION_MARKER: &str = "[Texte tronqué pour des raisons de performance]";

/// Apply all normalization rules to raw extracted text.
///
/// Empty input is returned unchanged.
pub fn normalize(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let s = replace_invisible_spaces(input);
    let s = collapse_horizontal_whitespace(&s);
    let s = space_after_punctuation(&s);
    let s = split_case_boundaries(&s);
    let s = split_digit_boundaries(&s);
    let s = space_around_parentheses(&s);
    let s = break_after_sentences(&s);
    let s = trim_lines(&s);
    collapse_spaces(&s)
}

// ── Rule 1: Invisible spaces ────────────────────────────────────────────────

fn replace_invisible_spaces(input: &str) -> String {
    input.replace('\u{00A0}', " ").replace('\u{200B}', "")
}

// ── Rule 2: Collapse spaces and tabs ────────────────────────────────────────

static RE_HORIZONTAL_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());

fn collapse_horizontal_whitespace(input: &str) -> String {
    RE_HORIZONTAL_WS.replace_all(input, " ").into_owned()
}

// ── Rule 3: Space after punctuation ─────────────────────────────────────────

static RE_PUNCT_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([.,;:!?])([A-Za-zÀ-ÖØ-öø-ÿ])").unwrap());

fn space_after_punctuation(input: &str) -> String {
    RE_PUNCT_LETTER.replace_all(input, "$1 $2").into_owned()
}

// ── Rule 4: Lowercase → uppercase ───────────────────────────────────────────

static RE_CASE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-zß-öø-ÿ])([A-ZÀ-ÖØ-Þ])").unwrap());

fn split_case_boundaries(input: &str) -> String {
    RE_CASE_BOUNDARY.replace_all(input, "$1 $2").into_owned()
}

// ── Rule 5: Digit ↔ letter ──────────────────────────────────────────────────

static RE_DIGIT_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9])([A-Za-zÀ-ÖØ-öø-ÿ])").unwrap());
static RE_LETTER_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-zÀ-ÖØ-öø-ÿ])([0-9])").unwrap());

fn split_digit_boundaries(input: &str) -> String {
    let s = RE_DIGIT_LETTER.replace_all(input, "$1 $2");
    RE_LETTER_DIGIT.replace_all(&s, "$1 $2").into_owned()
}

// ── Rule 6: Parentheses ─────────────────────────────────────────────────────

static RE_LETTER_OPEN_PAREN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-zÀ-ÖØ-öø-ÿ])\(").unwrap());
static RE_CLOSE_PAREN_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\)([A-Za-zÀ-ÖØ-öø-ÿ])").unwrap());

fn space_around_parentheses(input: &str) -> String {
    let s = RE_LETTER_OPEN_PAREN.replace_all(input, "$1 (");
    RE_CLOSE_PAREN_LETTER.replace_all(&s, ") $1").into_owned()
}

// ── Rule 7: Sentence line breaks ────────────────────────────────────────────

static RE_SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"([.?!])\s+").unwrap());

fn break_after_sentences(input: &str) -> String {
    RE_SENTENCE_END.replace_all(input, "$1\n").into_owned()
}

// ── Rule 8: Trim lines, drop empties ────────────────────────────────────────

fn trim_lines(input: &str) -> String {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 9: Final space collapse ────────────────────────────────────────────

static RE_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());

fn collapse_spaces(input: &str) -> String {
    RE_SPACES.replace_all(input, " ").into_owned()
}

// ── Prompt-ready text ───────────────────────────────────────────────────────

/// Normalized text, capped for prompting.
///
/// Holds at most `max_chars` characters of [`normalize`] output; when the
/// normalized text is longer it is cut at exactly `max_chars` characters and
/// `"\n\n"` + [`TRUNCATION_MARKER`] is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    text: String,
    truncated: bool,
}

impl NormalizedText {
    /// Normalize `raw` and cap it at [`MAX_TEXT_CHARS`].
    pub fn new(raw: &str) -> Self {
        Self::with_limit(raw, MAX_TEXT_CHARS)
    }

    /// Normalize `raw` and cap it at `max_chars` characters.
    pub fn with_limit(raw: &str, max_chars: usize) -> Self {
        let normalized = normalize(raw);
        match normalized.char_indices().nth(max_chars) {
            Some((cut, _)) => Self {
                text: format!("{}\n\n{}", &normalized[..cut], TRUNCATION_MARKER),
                truncated: true,
            },
            None => Self {
                text: normalized,
                truncated: false,
            },
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether the truncation marker was appended.
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }

    /// Length in characters, marker included.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
