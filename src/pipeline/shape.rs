//! Shape checking: turn a decoded [`Value`] into a typed, non-empty list.
//!
//! Models often wrap the list they were asked for (`{"quiz": [...]}`), so an
//! object holding exactly one array-valued field is unwrapped. Every element
//! must deserialize; one bad element rejects the whole value.

use crate::error::ShapeError;
use crate::output::{EducationalResource, Flashcard, QuizItem, OPTION_LETTERS};
use crate::pipeline::fallback::{fallback_flashcards, fallback_quiz, fallback_resources};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// An item type a structured operation returns a list of.
pub trait StructuredItem: DeserializeOwned + Sized {
    /// Name used in error messages.
    const KIND: &'static str;

    /// Canned list substituted on total failure.
    fn fallback() -> Vec<Self>;

    /// Post-decode repair of a single item.
    fn sanitize(self) -> Self {
        self
    }
}

impl StructuredItem for QuizItem {
    const KIND: &'static str = "quiz item";

    fn fallback() -> Vec<Self> {
        fallback_quiz()
    }

    fn sanitize(mut self) -> Self {
        self.options.resize(OPTION_LETTERS.len(), String::new());
        self.answer = resolve_answer(&self.answer, &self.options);
        self
    }
}

impl StructuredItem for Flashcard {
    const KIND: &'static str = "flashcard";

    fn fallback() -> Vec<Self> {
        fallback_flashcards()
    }
}

impl StructuredItem for EducationalResource {
    const KIND: &'static str = "resource";

    fn fallback() -> Vec<Self> {
        fallback_resources()
    }
}

/// Decode `value` into a non-empty list of `T`, sanitizing each item.
pub fn decode_items<T: StructuredItem>(value: Value) -> Result<Vec<T>, ShapeError> {
    let elements = into_array::<T>(value)?;
    if elements.is_empty() {
        return Err(ShapeError::Empty { kind: T::KIND });
    }

    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| {
            serde_json::from_value::<T>(element)
                .map(T::sanitize)
                .map_err(|e| ShapeError::Item {
                    kind: T::KIND,
                    index,
                    reason: e.to_string(),
                })
        })
        .collect()
}

fn into_array<T: StructuredItem>(value: Value) -> Result<Vec<Value>, ShapeError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(map) => {
            let mut arrays = map.into_iter().filter_map(|(_, v)| match v {
                Value::Array(items) => Some(items),
                _ => None,
            });
            match (arrays.next(), arrays.next()) {
                (Some(items), None) => Ok(items),
                _ => Err(ShapeError::NotAList {
                    kind: T::KIND,
                    found: "an object without exactly one list field".into(),
                }),
            }
        }
        other => Err(ShapeError::NotAList {
            kind: T::KIND,
            found: json_kind(&other).into(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Keep `answer` if it is one of `options`, else map its `x)` label to the
/// option carrying that label, else `""`.
fn resolve_answer(answer: &str, options: &[String]) -> String {
    if !answer.is_empty() && options.iter().any(|o| o == answer) {
        return answer.to_string();
    }

    let mut chars = answer.trim_start().chars();
    let label = match (chars.next(), chars.next()) {
        (Some(letter), Some(')')) => letter.to_ascii_lowercase(),
        _ => return String::new(),
    };
    if !OPTION_LETTERS.contains(&label) {
        return String::new();
    }

    let prefix = format!("{label}) ");
    options
        .iter()
        .find(|o| o.starts_with(&prefix))
        .cloned()
        .unwrap_or_default()
}
