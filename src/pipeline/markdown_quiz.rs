//! Fallback decoder for quizzes answered in Markdown instead of JSON.
//!
//! Models sometimes ignore the JSON-only instruction and reply with a fixed
//! Markdown layout:
//!
//! ```text
//! ### Questions
//!
//! **1. Que signifie PDF ?**
//! a) Portable Document Format
//! b) Personal Data File
//! c) Printable Document Form
//! d) Public Document File
//!
//! ### Corrections
//!
//! **1. Réponse : a) Portable Document Format** *Explication : …*
//! ```
//!
//! Parsing runs in two passes. [`scan`] splits the two sections and turns
//! them into records keyed by question number ([`QuestionRecord`],
//! [`CorrectionRecord`], explanations). [`assemble`] is a pure join of those
//! records into [`QuizItem`]s. Any malformed input yields `None`, never a
//! partial quiz.

use crate::output::{QuizItem, OPTION_LETTERS};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

pub const QUESTIONS_MARKER: &str = "### Questions";
pub const CORRECTIONS_MARKER: &str = "### Corrections";

/// Explanation used when the corrections section has none for a question.
pub const NO_EXPLANATION: &str = "Pas d'explication disponible.";

static RE_QUESTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\*\*(\d+)\.\s*(.+?)\*\*").unwrap());
static RE_OPTION_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-d])\)").unwrap());
static RE_OPTION_STOP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[a-d]\)").unwrap());
static RE_CORRECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\*\*(\d+)\.\s*Réponse\s*:\s*([a-d])\)\s*(.+?)\*\*").unwrap()
});
static RE_EXPLANATION_HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*(\d+)\.\s*Réponse\s*:\s*[a-d]\)\s*[^\n]+?\*\*\s*\*Explication\s*:\s*").unwrap()
});
static RE_ENTRY_STOP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\*\*\d+\.").unwrap());

/// A numbered question and its (up to four) labelled options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    pub number: u32,
    pub text: String,
    /// Exactly four slots, `"<letter>) <text>"` or `""` when missing.
    pub options: Vec<String>,
}

/// The correct letter stated for a question number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionRecord {
    pub letter: char,
    pub text: String,
}

/// Output of the scanning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedQuiz {
    pub questions: Vec<QuestionRecord>,
    pub corrections: HashMap<u32, CorrectionRecord>,
    pub explanations: HashMap<u32, String>,
}

/// Decode a Markdown quiz, or `None` when the text does not follow the
/// grammar (missing section marker, no question, malformed number).
///
/// `None` means "try the next fallback", not "empty quiz".
pub fn parse_markdown_quiz(text: &str) -> Option<Vec<QuizItem>> {
    let scanned = match scan(text) {
        Some(s) => s,
        None => {
            debug!("Markdown quiz grammar did not match");
            return None;
        }
    };
    if scanned.questions.is_empty() {
        debug!("Markdown quiz has section markers but no question");
        return None;
    }
    Some(assemble(&scanned))
}

// ── Pass 1: scanning ─────────────────────────────────────────────────────

/// Split the sections and collect question, correction and explanation
/// records.
pub fn scan(text: &str) -> Option<ScannedQuiz> {
    let (questions_section, corrections_section) = split_sections(text)?;
    Some(ScannedQuiz {
        questions: scan_questions(questions_section)?,
        corrections: scan_corrections(corrections_section)?,
        explanations: scan_explanations(corrections_section)?,
    })
}

/// Text after the first occurrence of each marker, each cut at the next
/// marker of either kind.
fn split_sections(text: &str) -> Option<(&str, &str)> {
    let q = text.find(QUESTIONS_MARKER)?;
    let c = text.find(CORRECTIONS_MARKER)?;
    let questions = until(
        until(&text[q + QUESTIONS_MARKER.len()..], QUESTIONS_MARKER),
        CORRECTIONS_MARKER,
    );
    let corrections = until(&text[c + CORRECTIONS_MARKER.len()..], CORRECTIONS_MARKER);
    Some((questions, corrections))
}

fn until<'a>(s: &'a str, marker: &str) -> &'a str {
    match s.find(marker) {
        Some(i) => &s[..i],
        None => s,
    }
}

fn scan_questions(section: &str) -> Option<Vec<QuestionRecord>> {
    let matches: Vec<_> = RE_QUESTION.captures_iter(section).collect();
    let mut questions = Vec::with_capacity(matches.len());

    for (i, caps) in matches.iter().enumerate() {
        let whole = caps.get(0)?;
        let number: u32 = caps[1].parse().ok()?;
        let block_end = matches
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(section.len(), |m| m.start());
        let options = pad_options(scan_options(&section[whole.end()..block_end]));

        questions.push(QuestionRecord {
            number,
            text: caps[2].trim().to_string(),
            options,
        });
    }
    Some(questions)
}

/// Up to four `"<letter>) <text>"` entries; each stops at the next labelled
/// line, a blank line, or the end of the block.
fn scan_options(block: &str) -> Vec<String> {
    let mut options = Vec::new();
    let mut pos = 0;

    while options.len() < OPTION_LETTERS.len() {
        let Some(caps) = RE_OPTION_LABEL.captures(&block[pos..]) else {
            break;
        };
        let (Some(label), Some(letter)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let tail = &block[pos + label.end()..];
        let body = tail.trim_start();
        if body.is_empty() {
            break;
        }
        let body_start = pos + label.end() + (tail.len() - body.len());
        let len = lazy_body_len(body, &RE_OPTION_STOP);
        options.push(format!("{}) {}", letter.as_str(), body[..len].trim()));
        pos = body_start + len;
    }
    options
}

fn pad_options(mut options: Vec<String>) -> Vec<String> {
    options.resize(OPTION_LETTERS.len(), String::new());
    options
}

fn scan_corrections(section: &str) -> Option<HashMap<u32, CorrectionRecord>> {
    let mut corrections = HashMap::new();
    for caps in RE_CORRECTION.captures_iter(section) {
        let number: u32 = caps[1].parse().ok()?;
        let letter = caps[2].chars().next()?;
        corrections.insert(
            number,
            CorrectionRecord {
                letter,
                text: caps[3].trim().to_string(),
            },
        );
    }
    Some(corrections)
}

fn scan_explanations(section: &str) -> Option<HashMap<u32, String>> {
    let mut explanations = HashMap::new();
    let mut pos = 0;

    while let Some(caps) = RE_EXPLANATION_HEAD.captures(&section[pos..]) {
        let head = caps.get(0)?;
        let number: u32 = caps[1].parse().ok()?;
        let body = &section[pos + head.end()..];
        let len = lazy_body_len(body, &RE_ENTRY_STOP);
        if len == 0 {
            break;
        }
        let text = body[..len]
            .trim_matches(|c: char| c == '*' || c.is_whitespace())
            .to_string();
        explanations.insert(number, text);
        pos += head.end() + len;
    }
    Some(explanations)
}

/// Byte length of a lazy one-or-more body: it ends at the first `stop`
/// match, the first blank line, or the end of `body`, whichever comes
/// first after the first character.
fn lazy_body_len(body: &str, stop: &Regex) -> usize {
    let Some(first) = body.chars().next() else {
        return 0;
    };
    let skip = first.len_utf8();
    let rest = &body[skip..];
    let mut end = body.len();
    if let Some(m) = stop.find(rest) {
        end = end.min(skip + m.start());
    }
    if let Some(i) = rest.find("\n\n") {
        end = end.min(skip + i);
    }
    end
}

// ── Pass 2: assembly ─────────────────────────────────────────────────────

/// Join question records with their correction and explanation by number.
///
/// `answer` is the option labelled with the corrected letter, or `""` when
/// there is no correction or no such option.
pub fn assemble(scanned: &ScannedQuiz) -> Vec<QuizItem> {
    scanned
        .questions
        .iter()
        .map(|q| {
            let answer = scanned
                .corrections
                .get(&q.number)
                .and_then(|c| {
                    let prefix = format!("{}) ", c.letter);
                    q.options.iter().find(|o| o.starts_with(&prefix))
                })
                .cloned()
                .unwrap_or_default();
            let explanation = scanned
                .explanations
                .get(&q.number)
                .cloned()
                .unwrap_or_else(|| NO_EXPLANATION.to_string());

            QuizItem {
                question: q.text.clone(),
                options: q.options.clone(),
                answer,
                explanation,
            }
        })
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_QUESTIONS: &str = "Voici le quiz demandé.

### Questions

**1. Que signifie PDF ?**
a) Portable Document Format
b) Personal Data File
c) Printable Document Form
d) Public Document File

**2. Qui a créé le format PDF ?**
a) Microsoft
b) Adobe
c) Apple
d) IBM

### Corrections

**1. Réponse : a) Portable Document Format** *Explication : PDF signifie Portable Document Format.*
**2. Réponse : b) Adobe** *Explication : Adobe a publié le format en 1993.*
";

    #[test]
    fn parses_two_questions() {
        let quiz = parse_markdown_quiz(TWO_QUESTIONS).expect("grammar should match");
        assert_eq!(quiz.len(), 2);

        assert_eq!(quiz[0].question, "Que signifie PDF ?");
        assert_eq!(
            quiz[0].options,
            vec![
                "a) Portable Document Format",
                "b) Personal Data File",
                "c) Printable Document Form",
                "d) Public Document File",
            ]
        );
        assert_eq!(quiz[0].answer, "a) Portable Document Format");
        assert_eq!(quiz[0].explanation, "PDF signifie Portable Document Format.");

        assert_eq!(quiz[1].question, "Qui a créé le format PDF ?");
        assert_eq!(quiz[1].answer, "b) Adobe");
        assert_eq!(quiz[1].explanation, "Adobe a publié le format en 1993.");
        for item in &quiz {
            assert_eq!(item.options.len(), 4);
            assert!(item.options.contains(&item.answer));
        }
    }

    #[test]
    fn missing_corrections_section_is_none() {
        let text = TWO_QUESTIONS.replace("### Corrections", "### Réponses");
        assert_eq!(parse_markdown_quiz(&text), None);
    }

    #[test]
    fn missing_questions_section_is_none() {
        let text = TWO_QUESTIONS.replace("### Questions", "## Quiz");
        assert_eq!(parse_markdown_quiz(&text), None);
    }

    #[test]
    fn markers_without_questions_is_none() {
        assert_eq!(
            parse_markdown_quiz("### Questions\nrien\n### Corrections\nrien"),
            None
        );
    }

    #[test]
    fn unmatched_correction_letter_gives_empty_answer() {
        let text = "### Questions
**1. Capitale de la France ?**
a) Paris
b) Lyon

### Corrections
**1. Réponse : d) Marseille** *Explication : Erreur volontaire.*
";
        let quiz = parse_markdown_quiz(text).unwrap();
        assert_eq!(quiz.len(), 1);
        assert_eq!(quiz[0].answer, "");
        assert_eq!(quiz[0].options, vec!["a) Paris", "b) Lyon", "", ""]);
    }

    #[test]
    fn missing_correction_and_explanation_use_defaults() {
        let text = "### Questions
**1. Question seule ?**
a) Un
b) Deux
c) Trois
d) Quatre

### Corrections
";
        let quiz = parse_markdown_quiz(text).unwrap();
        assert_eq!(quiz[0].answer, "");
        assert_eq!(quiz[0].explanation, NO_EXPLANATION);
    }

    #[test]
    fn extra_options_are_capped_at_four() {
        let block = "\na) 1\nb) 2\nc) 3\nd) 4\na) 5\n";
        assert_eq!(scan_options(block), vec!["a) 1", "b) 2", "c) 3", "d) 4"]);
    }

    #[test]
    fn option_stops_at_blank_line() {
        let block = "\na) premier\nsuite du premier\n\nparagraphe libre\n";
        assert_eq!(scan_options(block), vec!["a) premier\nsuite du premier"]);
    }

    #[test]
    fn explanation_stops_at_next_numbered_entry() {
        let section = "**1. Réponse : c) X** *Explication : une\ndeux*\n**2. Réponse : a) Y**";
        let explanations = scan_explanations(section).unwrap();
        assert_eq!(explanations.get(&1).map(String::as_str), Some("une\ndeux"));
        assert!(!explanations.contains_key(&2));
    }

    #[test]
    fn explanation_is_not_borrowed_from_next_entry() {
        let section = "**1. Réponse : a) X**\n**2. Réponse : b) Y** *Explication : pour Y*";
        let explanations = scan_explanations(section).unwrap();
        assert!(!explanations.contains_key(&1));
        assert_eq!(explanations.get(&2).map(String::as_str), Some("pour Y"));
    }

    #[test]
    fn overflowing_number_is_none() {
        let text = "### Questions
**99999999999. Trop grand ?**
a) Oui
### Corrections
";
        assert_eq!(parse_markdown_quiz(text), None);
    }

    #[test]
    fn assemble_joins_by_number() {
        let mut scanned = ScannedQuiz::default();
        scanned.questions.push(QuestionRecord {
            number: 7,
            text: "Q".into(),
            options: vec!["a) x".into(), "b) y".into(), String::new(), String::new()],
        });
        scanned.corrections.insert(
            7,
            CorrectionRecord {
                letter: 'b',
                text: "y".into(),
            },
        );
        scanned.explanations.insert(7, "parce que".into());

        let items = assemble(&scanned);
        assert_eq!(items[0].answer, "b) y");
        assert_eq!(items[0].explanation, "parce que");
    }

    #[test]
    fn scan_keeps_first_sections_only() {
        let scanned = scan(TWO_QUESTIONS).unwrap();
        assert_eq!(scanned.questions.len(), 2);
        assert_eq!(scanned.corrections.len(), 2);
        assert_eq!(scanned.explanations.len(), 2);
        assert_eq!(scanned.corrections[&2].letter, 'b');
        assert_eq!(scanned.corrections[&2].text, "Adobe");
    }
}
