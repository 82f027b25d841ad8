//! Chat completion request and response types (OpenAI-compatible wire format).

use serde::{Deserialize, Serialize};

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<Message>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens in the completion.
    pub max_tokens: u32,
    /// Output constraint; `json_object` for structured output mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// Chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// "system", "user" or "assistant".
    pub role: String,
    /// Message text.
    pub content: String,
}

impl Message {
    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Response format selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseFormat {
    /// Format type, e.g. `json_object`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl ResponseFormat {
    /// Structured (JSON object) output mode.
    #[must_use]
    pub fn json_object() -> Self {
        Self {
            kind: "json_object".to_string(),
        }
    }
}

/// Builds the message sequence: optional system instruction, then the prompt.
#[must_use]
pub fn build_messages(prompt: &str, system_instruction: Option<&str>) -> Vec<Message> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system_instruction {
        messages.push(Message::system(system));
    }
    messages.push(Message::user(prompt));
    messages
}

/// Raw chat completion response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatResponseRaw {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct Usage {
    /// Prompt tokens.
    #[serde(default)]
    pub prompt_tokens: u32,
    /// Completion tokens.
    #[serde(default)]
    pub completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_messages_with_system() {
        let messages = build_messages("score this", Some("you are an analyst"));
        assert_eq!(
            messages,
            vec![Message::system("you are an analyst"), Message::user("score this")]
        );
    }

    #[test]
    fn test_build_messages_without_system() {
        let messages = build_messages("hello", None);
        assert_eq!(messages, vec![Message::user("hello")]);
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "m".into(),
            messages: build_messages("p", None),
            temperature: 0.5,
            max_tokens: 10,
            response_format: Some(ResponseFormat::json_object()),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["max_tokens"], 10);

        let plain = ChatRequest {
            response_format: None,
            ..request
        };
        let json = serde_json::to_value(&plain).unwrap();
        assert!(json.get("response_format").is_none());
    }

    #[test]
    fn test_response_parsing_tolerates_null_content() {
        let raw: ChatResponseRaw = serde_json::from_value(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        }))
        .unwrap();
        assert!(raw.choices[0].message.content.is_none());
        assert!(raw.usage.is_none());
    }
}
