//! `{rating, feedback}` validation for answer-feedback responses.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::{field, parse_embedded_json, JsonShape, NormalizeError, Normalized};

/// Placeholder rating used whenever a provider gave no usable rating.
pub const UNAVAILABLE_RATING: &str = "N/A";

/// A rating as the provider sent it: usually a number, sometimes a label like `"7/10"`.
/// Numbers keep their original JSON representation so `7` stays `7`, not `7.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rating {
    Score(Number),
    Label(String),
}

impl Rating {
    pub fn unavailable() -> Self {
        Rating::Label(UNAVAILABLE_RATING.to_string())
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Rating::Label(l) if l == UNAVAILABLE_RATING)
    }

    /// Numeric value for averaging. Labels count only when they are plain numbers.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Rating::Score(n) => n.as_f64(),
            Rating::Label(l) => l.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }
}

impl From<i64> for Rating {
    fn from(value: i64) -> Self {
        Rating::Score(Number::from(value))
    }
}

/// One provider's validated feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderFeedback {
    pub rating: Rating,
    pub feedback: String,
}

/// Validates raw provider text as a `{rating, feedback}` object.
/// Anything short of both fields being present and non-empty is a fallback carrying the
/// trimmed raw text.
pub fn normalize_feedback(raw: &str) -> Normalized<ProviderFeedback> {
    let raw_text = raw.trim();
    match parse_feedback(raw_text) {
        Ok(parsed) => Normalized::Parsed(parsed),
        Err(reason) => Normalized::Fallback {
            reason,
            raw_text: raw_text.to_string(),
        },
    }
}

fn parse_feedback(text: &str) -> Result<ProviderFeedback, NormalizeError> {
    let value = parse_embedded_json(text, JsonShape::Object)?;
    let obj = value
        .as_object()
        .ok_or_else(|| NormalizeError::UnexpectedShape("expected a JSON object".to_string()))?;

    let rating = match field(obj, "rating") {
        Some(Value::Number(n)) if n.as_f64().is_some_and(|v| v != 0.0) => {
            Rating::Score(n.clone())
        }
        Some(Value::String(s)) if !s.trim().is_empty() => Rating::Label(s.trim().to_string()),
        None | Some(Value::Null) | Some(Value::Bool(false)) | Some(Value::Number(_))
        | Some(Value::String(_)) => return Err(NormalizeError::MissingField("rating")),
        Some(other) => {
            return Err(NormalizeError::UnexpectedShape(format!(
                "rating must be a number or string, got {other}"
            )))
        }
    };

    let feedback = match field(obj, "feedback") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        None | Some(Value::Null) | Some(Value::Bool(false)) | Some(Value::String(_)) => {
            return Err(NormalizeError::MissingField("feedback"))
        }
        // Structured feedback (lists of points, nested sections) is kept as its JSON text.
        Some(other) => other.to_string(),
    };

    Ok(ProviderFeedback { rating, feedback })
}
