//! Token events and the payload decode chain.
//!
//! Stream payloads arrive in several historical shapes: a bare string, a JSON
//! object with an `answer` field, or a doubly-encoded JSON string carrying a
//! `{gloss, confidence}` object. Decoding is an ordered chain of fallible
//! steps with a plain-text terminal fallback; nothing is ever rejected.

use serde_json::Value;

/// One parsed unit of recognized text from the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenEvent {
    /// Structured recognition result.
    Gloss {
        gloss: String,
        confidence: Option<f32>,
    },
    /// Plain text token.
    Text(String),
    /// Server-reported or transport error surfaced into the output.
    Diagnostic(String),
}

impl TokenEvent {
    /// Renders the token for display.
    ///
    /// A gloss with confidence renders as `"<gloss> (<pct>%)"` with the
    /// percentage rounded to the nearest integer.
    pub fn display_text(&self) -> String {
        match self {
            TokenEvent::Gloss {
                gloss,
                confidence: Some(c),
            } => format!("{} ({}%)", gloss, (c * 100.0).round() as i32),
            TokenEvent::Gloss {
                gloss,
                confidence: None,
            } => gloss.clone(),
            TokenEvent::Text(text) => text.clone(),
            TokenEvent::Diagnostic(text) => text.clone(),
        }
    }

    /// True for diagnostic (error-carrying) tokens.
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, TokenEvent::Diagnostic(_))
    }
}

/// Decodes one raw payload into a token event.
///
/// Steps, each falling through to the next on failure:
/// 1. parse as JSON;
/// 2. unwrap an `answer` field if present;
/// 3. re-parse a doubly-encoded JSON string;
/// 4. read a `{gloss, confidence?}` object;
/// 5. accept a plain JSON string;
/// terminal: the raw payload text verbatim.
pub fn decode_payload(raw: &str) -> TokenEvent {
    let Ok(value) = serde_json::from_str::<Value>(raw) else {
        return TokenEvent::Text(raw.to_string());
    };

    let value = unwrap_answer(value);
    let value = redecode_string(value);

    if let Some(event) = as_gloss(&value) {
        return event;
    }
    match value {
        Value::String(s) => TokenEvent::Text(s),
        _ => TokenEvent::Text(raw.to_string()),
    }
}

/// Unwraps `{"answer": ...}` to the inner value; other shapes pass through.
fn unwrap_answer(value: Value) -> Value {
    match value {
        Value::Object(mut map) => match map.remove("answer") {
            Some(inner) => inner,
            None => Value::Object(map),
        },
        other => other,
    }
}

/// Re-parses a string value that is itself JSON; non-JSON strings pass through.
fn redecode_string(value: Value) -> Value {
    match value {
        Value::String(s) => serde_json::from_str::<Value>(&s).unwrap_or(Value::String(s)),
        other => other,
    }
}

/// Reads a `{gloss, confidence?}` object.
fn as_gloss(value: &Value) -> Option<TokenEvent> {
    let gloss = value.get("gloss")?.as_str()?;
    let confidence = value
        .get("confidence")
        .and_then(Value::as_f64)
        .map(|c| c as f32);
    Some(TokenEvent::Gloss {
        gloss: gloss.to_string(),
        confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passes_verbatim() {
        assert_eq!(
            decode_payload("plain text"),
            TokenEvent::Text("plain text".to_string())
        );
    }

    #[test]
    fn test_doubly_encoded_gloss_with_confidence() {
        let payload = r#"{"answer": "{\"gloss\":\"HELLO\",\"confidence\":0.87}"}"#;
        let event = decode_payload(payload);
        assert_eq!(event.display_text(), "HELLO (87%)");
    }

    #[test]
    fn test_answer_with_plain_string() {
        let event = decode_payload(r#"{"answer": "hi there"}"#);
        assert_eq!(event, TokenEvent::Text("hi there".to_string()));
    }

    #[test]
    fn test_direct_gloss_object() {
        let event = decode_payload(r#"{"gloss":"THANK-YOU","confidence":0.5}"#);
        assert_eq!(event.display_text(), "THANK-YOU (50%)");
    }

    #[test]
    fn test_gloss_without_confidence() {
        let event = decode_payload(r#"{"answer":{"gloss":"YES"}}"#);
        assert_eq!(event.display_text(), "YES");
    }

    #[test]
    fn test_json_string_payload() {
        // A bare JSON-quoted string decodes to its contents.
        let event = decode_payload(r#""hello""#);
        assert_eq!(event, TokenEvent::Text("hello".to_string()));
    }

    #[test]
    fn test_unrecognized_json_falls_back_to_raw() {
        let raw = r#"{"unexpected": 42}"#;
        assert_eq!(decode_payload(raw), TokenEvent::Text(raw.to_string()));
    }

    #[test]
    fn test_answer_with_non_json_string_stays_text() {
        let event = decode_payload(r#"{"answer": "not { json"}"#);
        assert_eq!(event, TokenEvent::Text("not { json".to_string()));
    }

    #[test]
    fn test_confidence_rounds_to_nearest_percent() {
        let event = decode_payload(r#"{"gloss":"OK","confidence":0.876}"#);
        assert_eq!(event.display_text(), "OK (88%)");
    }

    #[test]
    fn test_diagnostic_flag() {
        assert!(TokenEvent::Diagnostic("boom".into()).is_diagnostic());
        assert!(!TokenEvent::Text("fine".into()).is_diagnostic());
    }
}
