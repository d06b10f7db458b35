//! Best-effort recovery of a JSON object from free-form model output.
//!
//! Models are asked for bare JSON but regularly wrap it in prose. Recovery
//! runs in two stages:
//!
//! 1. Parse the whole (trimmed) response.
//! 2. Parse the span from the first `{` to the last `}`.
//!
//! The second stage is greedy, so a reply containing several separate
//! brace blocks yields an unparseable span and fails rather than picking
//! one of them.

use serde_json::{Map, Value};
use thiserror::Error;

/// Score used whenever the `score` field is missing or not numeric.
pub const DEFAULT_SCORE: f64 = 0.0;

/// Which stage produced the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractStage {
    /// The entire response was valid JSON.
    Whole,
    /// A brace-delimited span inside the response was valid JSON.
    Embedded,
}

/// A JSON object recovered from a model response.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub stage: ExtractStage,
    pub object: Map<String, Value>,
}

/// Why no object could be recovered.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("model did not return valid JSON: no brace-delimited block found")]
    NoJsonBlock,

    #[error("model did not return valid JSON: {0}")]
    Malformed(serde_json::Error),

    #[error("model returned JSON that is not an object")]
    NotAnObject,
}

/// Recover a JSON object from `raw`.
pub fn extract_json_object(raw: &str) -> Result<Extracted, ExtractError> {
    let raw = raw.trim();

    let (stage, value) = match serde_json::from_str::<Value>(raw) {
        Ok(value) => (ExtractStage::Whole, value),
        Err(_) => {
            let span = brace_span(raw).ok_or(ExtractError::NoJsonBlock)?;
            let value = serde_json::from_str::<Value>(span).map_err(ExtractError::Malformed)?;
            (ExtractStage::Embedded, value)
        }
    };

    match value {
        Value::Object(object) => Ok(Extracted { stage, object }),
        _ => Err(ExtractError::NotAnObject),
    }
}

/// Greedy span from the first `{` to the last `}` after it.
fn brace_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Numeric value of a JSON field, or [`DEFAULT_SCORE`] when it cannot be read
/// as a finite number. Numeric strings such as `"3.5"` are accepted.
pub fn number_or_default(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(DEFAULT_SCORE)
}

/// Text of a JSON field: strings verbatim, other non-null values as JSON,
/// missing or null as an empty string.
pub fn text_or_empty(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn whole_response_is_json() {
        let got = extract_json_object(r#"{"score": 4, "rationale": "Good use of formulas"}"#)
            .unwrap();
        assert_eq!(got.stage, ExtractStage::Whole);
        assert_eq!(got.object["score"], json!(4));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let got = extract_json_object("\n\n  {\"score\": 2}\n").unwrap();
        assert_eq!(got.stage, ExtractStage::Whole);
    }

    #[test]
    fn json_wrapped_in_prose() {
        let raw = "Sure, here is the result:\n{\"score\": 3, \"rationale\": \"ok\"}\nThanks";
        let got = extract_json_object(raw).unwrap();
        assert_eq!(got.stage, ExtractStage::Embedded);
        assert_eq!(got.object["rationale"], json!("ok"));
    }

    #[test]
    fn json_inside_markdown_fence() {
        let raw = "```json\n{\"score\": 5, \"rationale\": \"nested {braces} fine\"}\n```";
        let got = extract_json_object(raw).unwrap();
        assert_eq!(got.object["score"], json!(5));
        assert_eq!(got.object["rationale"], json!("nested {braces} fine"));
    }

    #[test]
    fn no_braces_at_all() {
        let err = extract_json_object("I cannot grade this.").unwrap_err();
        assert!(matches!(err, ExtractError::NoJsonBlock));
        assert!(err.to_string().contains("valid JSON"));
    }

    #[test]
    fn closing_brace_before_opening() {
        let err = extract_json_object("} oops {").unwrap_err();
        assert!(matches!(err, ExtractError::NoJsonBlock));
    }

    #[test]
    fn greedy_span_over_two_blocks_fails() {
        let raw = r#"first {"score": 1} then {"score": 2}"#;
        let err = extract_json_object(raw).unwrap_err();
        assert!(matches!(err, ExtractError::Malformed(_)));
    }

    #[test]
    fn top_level_array_is_rejected() {
        let err = extract_json_object("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, ExtractError::NotAnObject));
    }

    #[test]
    fn number_coercion() {
        assert_eq!(number_or_default(Some(&json!(4))), 4.0);
        assert_eq!(number_or_default(Some(&json!(3.5))), 3.5);
        assert_eq!(number_or_default(Some(&json!(" 2.5 "))), 2.5);
        assert_eq!(number_or_default(Some(&json!("n/a"))), DEFAULT_SCORE);
        assert_eq!(number_or_default(Some(&json!(null))), DEFAULT_SCORE);
        assert_eq!(number_or_default(Some(&json!([1]))), DEFAULT_SCORE);
        assert_eq!(number_or_default(Some(&json!("NaN"))), DEFAULT_SCORE);
        assert_eq!(number_or_default(None), DEFAULT_SCORE);
    }

    #[test]
    fn text_coercion() {
        assert_eq!(text_or_empty(Some(&json!("verbatim "))), "verbatim ");
        assert_eq!(text_or_empty(Some(&json!(12))), "12");
        assert_eq!(text_or_empty(Some(&json!(null))), "");
        assert_eq!(text_or_empty(None), "");
    }
}
