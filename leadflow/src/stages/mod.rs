//! Stage trait and the three lead stages.
//!
//! Every stage follows the same contract: build a fixed system instruction
//! and a lead-specific prompt, call the text client in structured mode,
//! coerce the answer into a JSON object, validate it against a closed field
//! set, and on any failure return a deterministic fallback instead of an
//! error.

mod enrichment;
mod outreach;
mod scoring;

pub use enrichment::EnrichmentStage;
pub use outreach::{OutreachStage, FALLBACK_NOTES};
pub use scoring::ScoringStage;

use crate::core::{Lead, Priority, MAX_SCORE, MIN_SCORE};
use crate::errors::{MalformedResponseError, StageError};
use crate::llm::GenerativeTextClient;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt::Debug;
use std::time::Instant;
use tracing::debug;

/// Trait for lead stages.
///
/// `execute` never fails: stage-local errors are logged and replaced with
/// the stage's fallback value.
#[async_trait]
pub trait Stage: Send + Sync + Debug {
    /// The value the stage produces.
    type Output: Send;

    /// Returns the name of the stage.
    fn name(&self) -> &str;

    /// Runs the stage against the lead's current field values.
    async fn execute(&self, lead: &Lead) -> Self::Output;
}

/// A result type that can be extracted from a coerced JSON object.
pub trait StructuredOutput: Sized {
    /// Fields the system instruction asks for.
    const FIELDS: &'static [&'static str];

    /// Extracts and type-checks every field.
    fn from_mapping(map: &Map<String, Value>) -> Result<Self, MalformedResponseError>;
}

/// The shared call-and-coerce procedure used by every stage.
///
/// # Errors
///
/// `StageError::Generation` if the call fails, `StageError::Malformed` if the
/// answer cannot be coerced or does not satisfy `T`'s field contract.
pub async fn call_structured<T: StructuredOutput>(
    client: &dyn GenerativeTextClient,
    stage: &str,
    system_instruction: &str,
    prompt: &str,
) -> Result<T, StageError> {
    let start = Instant::now();
    let text = client.generate(prompt, Some(system_instruction), true).await?;
    let map = client.coerce_to_mapping(&text)?;

    for field in T::FIELDS {
        if !map.contains_key(*field) {
            return Err(MalformedResponseError::MissingField((*field).to_string()).into());
        }
    }

    let result = T::from_mapping(&map)?;
    debug!(
        stage,
        duration_ms = start.elapsed().as_millis(),
        "Structured result accepted"
    );
    Ok(result)
}

/// Extracts a non-blank string field.
pub(crate) fn required_str(
    map: &Map<String, Value>,
    field: &str,
) -> Result<String, MalformedResponseError> {
    match map.get(field) {
        None => Err(MalformedResponseError::MissingField(field.to_string())),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(MalformedResponseError::invalid_field(field, "is blank")),
        Some(other) => Err(MalformedResponseError::invalid_field(
            field,
            format!("expected a string, got {other}"),
        )),
    }
}

/// Extracts a priority tier.
pub(crate) fn required_priority(
    map: &Map<String, Value>,
    field: &str,
) -> Result<Priority, MalformedResponseError> {
    required_str(map, field)?
        .parse()
        .map_err(|reason: String| MalformedResponseError::invalid_field(field, reason))
}

/// Extracts an integer score in `MIN_SCORE..=MAX_SCORE`.
///
/// Floats (including whole-valued ones such as `7.0`), strings and
/// out-of-range integers are rejected, never clamped.
pub(crate) fn required_score(
    map: &Map<String, Value>,
    field: &str,
) -> Result<u8, MalformedResponseError> {
    let value = map
        .get(field)
        .ok_or_else(|| MalformedResponseError::MissingField(field.to_string()))?;

    let n = match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => n.as_i64(),
        _ => None,
    }
    .ok_or_else(|| {
        MalformedResponseError::invalid_field(field, format!("expected an integer, got {value}"))
    })?;

    u8::try_from(n)
        .ok()
        .filter(|s| (MIN_SCORE..=MAX_SCORE).contains(s))
        .ok_or_else(|| {
            MalformedResponseError::invalid_field(
                field,
                format!("{n} is outside {MIN_SCORE}..={MAX_SCORE}"),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ScoringResult;
    use crate::errors::GenerationError;
    use crate::testing::MockTextClient;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_required_str() {
        let m = map(json!({"a": "x", "b": "  ", "c": 3}));
        assert_eq!(required_str(&m, "a").unwrap(), "x");
        assert!(matches!(
            required_str(&m, "b"),
            Err(MalformedResponseError::InvalidField { .. })
        ));
        assert!(matches!(
            required_str(&m, "c"),
            Err(MalformedResponseError::InvalidField { .. })
        ));
        assert_eq!(
            required_str(&m, "d"),
            Err(MalformedResponseError::MissingField("d".into()))
        );
    }

    #[test]
    fn test_required_score_bounds() {
        let m = map(json!({
            "ok_low": 1, "ok_high": 10, "zero": 0, "eleven": 11,
            "neg": -3, "float": 7.5, "whole_float": 7.0, "text": "7", "huge": 300
        }));

        assert_eq!(required_score(&m, "ok_low").unwrap(), 1);
        assert_eq!(required_score(&m, "ok_high").unwrap(), 10);
        for field in ["zero", "eleven", "neg", "float", "whole_float", "text", "huge"] {
            assert!(required_score(&m, field).is_err(), "{field} should be rejected");
        }
    }

    #[test]
    fn test_required_priority() {
        let m = map(json!({"p": "high", "q": "Urgent"}));
        assert_eq!(required_priority(&m, "p").unwrap(), Priority::High);
        assert!(required_priority(&m, "q").is_err());
    }

    #[tokio::test]
    async fn test_call_structured_sends_system_instruction_in_structured_mode() {
        let client = MockTextClient::new()
            .with_response(r#"{"priority": "Low", "score": 2, "reasoning": "intern"}"#);

        let result: ScoringResult = call_structured(&client, "scoring", "SYSTEM", "PROMPT")
            .await
            .unwrap();
        assert_eq!(result.priority, Priority::Low);

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].prompt, "PROMPT");
        assert_eq!(calls[0].system_instruction.as_deref(), Some("SYSTEM"));
        assert!(calls[0].structured_output);
    }

    #[tokio::test]
    async fn test_call_structured_reports_missing_field() {
        let client = MockTextClient::new().with_response(r#"{"priority": "Low", "score": 2}"#);

        let err = call_structured::<ScoringResult>(&client, "scoring", "S", "P")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StageError::Malformed(MalformedResponseError::MissingField(ref f)) if f == "reasoning"
        ));
    }

    #[tokio::test]
    async fn test_call_structured_propagates_generation_error() {
        let client = MockTextClient::new().with_error(GenerationError::Timeout(5));

        let err = call_structured::<ScoringResult>(&client, "scoring", "S", "P")
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::Generation(GenerationError::Timeout(5))));
    }
}
