//! `[{Question, Answer}]` validation for generated question sets.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{field, parse_embedded_json, JsonShape, NormalizeError};

/// One generated interview question with its model answer.
/// Serialized with the capitalized keys the stored blobs have always used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    #[serde(rename = "Question")]
    pub question: String,
    #[serde(rename = "Answer")]
    pub answer: String,
}

/// Validates raw provider text (or a stored blob) as a non-empty list of question/answer
/// pairs. Accepts a bare array, a single pair object, or an object wrapping the array
/// under any key (`{"questions": [...]}`).
pub fn normalize_question_set(raw: &str) -> Result<Vec<QuestionAnswer>, NormalizeError> {
    let value = parse_embedded_json(raw, JsonShape::Any)?;
    let pairs = collect_pairs(&value)?;
    if pairs.is_empty() {
        return Err(NormalizeError::UnexpectedShape(
            "no question/answer pairs in response".to_string(),
        ));
    }
    Ok(pairs)
}

/// Canonical text form stored in the interview's JSON column.
pub fn encode_question_set(pairs: &[QuestionAnswer]) -> Result<String, serde_json::Error> {
    serde_json::to_string(pairs)
}

fn collect_pairs(value: &Value) -> Result<Vec<QuestionAnswer>, NormalizeError> {
    match value {
        Value::Array(items) => items.iter().map(parse_pair).collect(),
        Value::Object(obj) if field(obj, "question").is_some() => Ok(vec![parse_pair(value)?]),
        Value::Object(obj) => match obj.values().find(|v| v.is_array()) {
            Some(Value::Array(items)) => items.iter().map(parse_pair).collect(),
            _ => Err(NormalizeError::UnexpectedShape(
                "object contains no question list".to_string(),
            )),
        },
        other => Err(NormalizeError::UnexpectedShape(format!(
            "expected an array of questions, got {other}"
        ))),
    }
}

fn parse_pair(item: &Value) -> Result<QuestionAnswer, NormalizeError> {
    let obj = item.as_object().ok_or_else(|| {
        NormalizeError::UnexpectedShape(format!("question entry is not an object: {item}"))
    })?;

    Ok(QuestionAnswer {
        question: non_empty_text(obj, "question")?,
        answer: non_empty_text(obj, "answer")?,
    })
}

fn non_empty_text(
    obj: &serde_json::Map<String, Value>,
    name: &'static str,
) -> Result<String, NormalizeError> {
    match field(obj, name) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(NormalizeError::MissingField(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_array_after_prose() {
        let raw = "Here you go:\n```json\n[{\"Question\":\"Q1\",\"Answer\":\"A1\"}]\n```";
        let pairs = normalize_question_set(raw).unwrap();
        assert_eq!(
            pairs,
            vec![QuestionAnswer {
                question: "Q1".to_string(),
                answer: "A1".to_string(),
            }]
        );
        assert_eq!(
            encode_question_set(&pairs).unwrap(),
            r#"[{"Question":"Q1","Answer":"A1"}]"#
        );
    }

    #[test]
    fn test_multiline_array_with_nested_brackets() {
        let raw = r#"[
  {"Question": "What is a Vec<[u8; 4]>?", "Answer": "A vector of 4-byte arrays [like this]."},
  {"Question": "What is ownership?", "Answer": "Each value has a single owner."}
]"#;
        let pairs = normalize_question_set(raw).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].question, "What is a Vec<[u8; 4]>?");
        assert_eq!(pairs[1].answer, "Each value has a single owner.");
    }

    #[test]
    fn test_wrapped_object_and_lowercase_keys() {
        let raw = r#"{"questions": [{"question": "Q", "answer": "A"}]}"#;
        let pairs = normalize_question_set(raw).unwrap();
        assert_eq!(pairs[0].question, "Q");
        assert_eq!(pairs[0].answer, "A");
    }

    #[test]
    fn test_single_pair_object() {
        let pairs = normalize_question_set(r#"{"Question": "Q", "Answer": "A"}"#).unwrap();
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn test_missing_answer_rejected() {
        let err = normalize_question_set(r#"[{"Question": "Q"}]"#).unwrap_err();
        assert_eq!(err, NormalizeError::MissingField("answer"));
    }

    #[test]
    fn test_no_json_rejected() {
        let err = normalize_question_set("I'm sorry, I can't help with that.").unwrap_err();
        assert_eq!(err, NormalizeError::NoJsonFound);
    }

    #[test]
    fn test_empty_array_rejected() {
        let err = normalize_question_set("[]").unwrap_err();
        assert!(matches!(err, NormalizeError::UnexpectedShape(_)));
    }
}
