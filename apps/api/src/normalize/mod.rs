//! Response normalization. Turns loosely formatted provider text into validated records.
//!
//! Providers are asked for bare JSON but routinely wrap it in code fences or prose.
//! Every call site goes through `parse_embedded_json` and then validates the shape it
//! expects; partially valid data never leaves this module.

use serde_json::Value;
use thiserror::Error;

pub mod feedback;
pub mod questions;

pub use feedback::{normalize_feedback, ProviderFeedback, Rating};
pub use questions::{encode_question_set, normalize_question_set, QuestionAnswer};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("no JSON payload found in response")]
    NoJsonFound,

    #[error("invalid JSON payload: {0}")]
    InvalidJson(String),

    #[error("missing or empty field '{0}'")]
    MissingField(&'static str),

    #[error("unexpected JSON shape: {0}")]
    UnexpectedShape(String),
}

/// Result of validating one provider response.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized<T> {
    Parsed(T),
    Fallback {
        reason: NormalizeError,
        raw_text: String,
    },
}

/// Which JSON container the caller is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    Object,
    /// Object or array, whichever opens first.
    Any,
}

impl JsonShape {
    fn accepts_opener(self, c: char) -> bool {
        match self {
            JsonShape::Object => c == '{',
            JsonShape::Any => c == '{' || c == '[',
        }
    }
}

/// Removes every triple-backtick fence marker together with a language tag glued to it
/// (```` ```json ````, ```` ```JSON ````, ```` ```js ````, bare ```` ``` ````), then trims.
pub fn strip_code_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find("```") {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 3..];
        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+')))
            .unwrap_or(rest.len());
        rest = &rest[tag_len..];
    }
    out.push_str(rest);

    out.trim().to_string()
}

/// Returns the leftmost substring that opens with `{` or `[` (as allowed by `shape`) and
/// runs to the last matching closer of the same kind. Greedy across the whole remainder,
/// so nested and multi-line payloads come back whole.
pub fn extract_json_payload(text: &str, shape: JsonShape) -> Option<&str> {
    let last_brace = text.rfind('}');
    let last_bracket = text.rfind(']');

    for (start, c) in text.char_indices() {
        if !shape.accepts_opener(c) {
            continue;
        }
        let close = if c == '{' { last_brace } else { last_bracket };
        if let Some(end) = close.filter(|&end| end > start) {
            return Some(&text[start..=end]);
        }
    }

    None
}

/// Strips fences, locates the embedded payload and parses it.
///
/// When the greedy slice does not parse (trailing prose containing a closer), the first
/// complete JSON value at the payload start is accepted instead.
pub fn parse_embedded_json(text: &str, shape: JsonShape) -> Result<Value, NormalizeError> {
    let cleaned = strip_code_fences(text);

    let payload = match extract_json_payload(&cleaned, shape) {
        Some(p) => p,
        None if cleaned.chars().any(|c| shape.accepts_opener(c)) => {
            return Err(NormalizeError::InvalidJson(
                "unterminated JSON payload".to_string(),
            ))
        }
        None => return Err(NormalizeError::NoJsonFound),
    };

    match serde_json::from_str::<Value>(payload) {
        Ok(value) => Ok(value),
        Err(greedy_err) => serde_json::Deserializer::from_str(payload)
            .into_iter::<Value>()
            .next()
            .and_then(Result::ok)
            .ok_or_else(|| NormalizeError::InvalidJson(greedy_err.to_string())),
    }
}

/// Looks up `name` in a JSON object, falling back to a case-insensitive match
/// (`Rating`, `FEEDBACK`, `question` all occur in provider output).
pub(crate) fn field<'a>(obj: &'a serde_json::Map<String, Value>, name: &str) -> Option<&'a Value> {
    obj.get(name).or_else(|| {
        obj.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    })
}
