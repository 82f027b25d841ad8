//! Text-generation client.

use super::coerce::coerce_to_mapping;
use super::types::{build_messages, ChatRequest, ChatResponseRaw, ResponseFormat};
use crate::config::Settings;
use crate::errors::{GenerationError, MalformedResponseError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, warn};

/// Capability to turn a prompt into generated text.
///
/// Implementations do not retry; a failed call surfaces as `GenerationError`.
#[async_trait]
pub trait GenerativeTextClient: Send + Sync {
    /// Generates text for `prompt`.
    ///
    /// When `structured_output` is true the service is asked to constrain its
    /// answer to a JSON object.
    async fn generate(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
        structured_output: bool,
    ) -> Result<String, GenerationError>;

    /// Coerces generated text into a JSON object, stripping any outer fence.
    fn coerce_to_mapping(&self, text: &str) -> Result<Map<String, Value>, MalformedResponseError> {
        coerce_to_mapping(text)
    }
}

/// Client for an OpenAI-compatible chat completions endpoint.
pub struct ChatClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout_seconds: u64,
    calls: AtomicU64,
    failures: AtomicU64,
}

impl ChatClient {
    /// Creates a client from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, GenerationError> {
        let http_client = reqwest::Client::builder()
            .timeout(settings.llm_timeout())
            .build()
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key: settings.llm_api_key.clone(),
            base_url: settings.llm_base_url.trim_end_matches('/').to_string(),
            model: settings.llm_model.clone(),
            temperature: settings.llm_temperature,
            max_tokens: settings.llm_max_tokens,
            timeout_seconds: settings.llm_timeout_seconds,
            calls: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        })
    }

    /// Model identifier sent with every request.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Number of calls issued so far.
    #[must_use]
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Number of calls that failed.
    #[must_use]
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    fn request(&self, prompt: &str, system_instruction: Option<&str>, structured: bool) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: build_messages(prompt, system_instruction),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: structured.then(ResponseFormat::json_object),
        }
    }

    async fn send(&self, request: &ChatRequest) -> Result<String, GenerationError> {
        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout(self.timeout_seconds)
                } else {
                    GenerationError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let raw: ChatResponseRaw = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout(self.timeout_seconds)
            } else {
                GenerationError::Network(e.to_string())
            }
        })?;

        if let Some(usage) = raw.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Generation usage"
            );
        }

        raw.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(GenerationError::EmptyResponse)
    }
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("calls", &self.call_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl GenerativeTextClient for ChatClient {
    async fn generate(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
        structured_output: bool,
    ) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();
        let request = self.request(prompt, system_instruction, structured_output);

        match self.send(&request).await {
            Ok(content) => {
                debug!(
                    model = %self.model,
                    structured = structured_output,
                    duration_ms = start.elapsed().as_millis(),
                    chars = content.len(),
                    "Generation completed"
                );
                Ok(content)
            }
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!(model = %self.model, error = %e, "Generation failed");
                Err(e)
            }
        }
    }
}
