//! Coercion of generated text into a JSON object.
//!
//! Models asked for JSON frequently wrap it in a fenced code block, with or
//! without a language tag. The outer fence is stripped before parsing.

use crate::errors::MalformedResponseError;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Text that opens with a fence: everything up to the final closing fence,
/// or to the end when the closing fence is missing.
static OUTER_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A```[A-Za-z0-9_+-]*[ \t]*\r?\n?(.*?)(?:```)?\z").expect("valid outer fence regex")
});

/// First complete fenced block inside surrounding prose.
static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_+-]*[ \t]*\r?\n?(.*?)```").expect("valid fenced block regex")
});

/// Opening fence with no closing fence (truncated output).
static OPEN_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_+-]*[ \t]*\r?\n?(.*)$").expect("valid open fence regex")
});

/// Returns the content of the outer fenced block, or the input unchanged.
#[must_use]
pub fn strip_fences(text: &str) -> &str {
    let text = text.trim();
    let patterns: [&Regex; 3] = [&*OUTER_FENCE, &*FENCED_BLOCK, &*OPEN_FENCE];
    patterns
        .iter()
        .find_map(|re| re.captures(text).and_then(|c| c.get(1)))
        .map_or(text, |inner| inner.as_str().trim())
}

/// Parses generated text into a JSON object.
///
/// Text that is already valid JSON is taken as is, so fences inside string
/// values survive. Only otherwise is the outer fence stripped.
///
/// # Errors
///
/// `MalformedResponseError::Parse` if the stripped text is not JSON and
/// `MalformedResponseError::NotAnObject` if it is JSON but not an object.
pub fn coerce_to_mapping(text: &str) -> Result<Map<String, Value>, MalformedResponseError> {
    let value = match serde_json::from_str::<Value>(text.trim()) {
        Ok(value) => value,
        Err(_) => serde_json::from_str::<Value>(strip_fences(text))
            .map_err(|e| MalformedResponseError::Parse(e.to_string()))?,
    };

    match value {
        Value::Object(map) => Ok(map),
        other => Err(MalformedResponseError::NotAnObject(json_type_name(&other).to_string())),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
