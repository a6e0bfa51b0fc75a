//! Response classification
//!
//! Maps one [`CallOutcome`] to the next step of the resolver walk. Pure: the
//! decision depends only on the status code and the parsed body.

use crate::transport::CallOutcome;
use serde_json::Value;

/// Characters of the body kept in an error note
pub const BODY_SNIPPET_CHARS: usize = 200;
/// Characters of the parser message kept in an invalid-body note
pub const PARSE_ERROR_CHARS: usize = 50;

/// What a single response means for the walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// 200 with data: the application exists, stop
    Found,
    /// 404, or 200 with an empty result: try the next candidate
    NotHere,
    /// Anything else: stop with this note
    Error(String),
}

/// Classify one transport outcome
pub fn classify(outcome: &CallOutcome) -> Step {
    match outcome.status {
        200 => match serde_json::from_str::<Value>(&outcome.body) {
            Ok(payload) if is_empty_payload(&payload) => Step::NotHere,
            Ok(_) => Step::Found,
            Err(e) => Step::Error(format!(
                "Error: invalid response body - {}",
                truncate_chars(&e.to_string(), PARSE_ERROR_CHARS)
            )),
        },
        404 => Step::NotHere,
        status => Step::Error(format!(
            "Error ({}): {}",
            status,
            truncate_chars(&outcome.body, BODY_SNIPPET_CHARS).trim()
        )),
    }
}

/// Whether a parsed 200 body means "nothing found"
///
/// Empty when the value is `null`, `[]`, `{}`, or an object with at least one
/// field holding `[]` (e.g. `{"applications": []}`). The last rule is
/// deliberately broad: an object that carries data *and* an unrelated empty
/// array still counts as empty.
pub fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => {
            fields.is_empty()
                || fields
                    .values()
                    .any(|v| matches!(v, Value::Array(items) if items.is_empty()))
        }
        _ => false,
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
