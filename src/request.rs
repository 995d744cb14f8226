use crate::error::ApiError;
use crate::scorer::Polarity;
use serde_derive::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of a sentiment request
///
/// Only `text` is looked at, any other field is ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentRequest {
    fields: Map<String, Value>,
}

impl SentimentRequest {
    /// Parses a raw request body, which has to be a JSON object.
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ApiError::MalformedRequest(String::from(
                "request body is empty",
            )));
        }
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => Ok(Self { fields }),
            Ok(other) => Err(ApiError::MalformedRequest(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
            Err(err) => Err(ApiError::MalformedRequest(format!(
                "invalid JSON: {}",
                err
            ))),
        }
    }

    /// Text to score.
    ///
    /// Defaults to the empty string when `text` is absent or not a string.
    pub fn text(&self) -> &str {
        self.fields
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or("")
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

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct SentimentResponse {
    pub sentiment: Polarity,
}

#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<SentimentRequest, ApiError> {
        SentimentRequest::from_body(body.as_bytes())
    }

    #[test]
    fn text_is_extracted() {
        let request = parse(r#"{"text": "hello there", "lang": "en"}"#).unwrap();
        assert_eq!(request.text(), "hello there");
    }

    #[test]
    fn missing_text_defaults_to_empty() {
        assert_eq!(parse("{}").unwrap().text(), "");
        assert_eq!(parse(r#"{"message": "hi"}"#).unwrap().text(), "");
    }

    #[test]
    fn non_string_text_defaults_to_empty() {
        assert_eq!(parse(r#"{"text": 42}"#).unwrap().text(), "");
        assert_eq!(parse(r#"{"text": null}"#).unwrap().text(), "");
        assert_eq!(parse(r#"{"text": ["a", "b"]}"#).unwrap().text(), "");
    }

    #[test]
    fn empty_body_is_malformed() {
        assert!(matches!(parse(""), Err(ApiError::MalformedRequest(_))));
        assert!(matches!(parse(" \n"), Err(ApiError::MalformedRequest(_))));
    }

    #[test]
    fn invalid_json_is_malformed() {
        match parse(r#"{"text": "#) {
            Err(ApiError::MalformedRequest(message)) => assert!(message.starts_with("invalid JSON")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn non_object_json_is_malformed() {
        match parse(r#"["text"]"#) {
            Err(ApiError::MalformedRequest(message)) => assert!(message.contains("an array")),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(parse("\"text\""), Err(ApiError::MalformedRequest(_))));
    }

    #[test]
    fn response_serializes_single_field() {
        let body = serde_json::to_string(&SentimentResponse { sentiment: 0.5 }).unwrap();
        assert_eq!(body, r#"{"sentiment":0.5}"#);
    }
}
