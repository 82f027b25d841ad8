//! Scripted text client and recording mailer.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};

use crate::core::Lead;
use crate::errors::GenerationError;
use crate::llm::GenerativeTextClient;
use crate::services::Mailer;

/// One scripted reply.
#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Error(GenerationError),
    Panic(String),
}

impl Reply {
    fn resolve(self) -> Result<String, GenerationError> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Error(e) => Err(e),
            Self::Panic(message) => panic!("{message}"),
        }
    }
}

/// Arguments of one `generate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// User prompt.
    pub prompt: String,
    /// System instruction, if any.
    pub system_instruction: Option<String>,
    /// Whether structured output was requested.
    pub structured_output: bool,
}

type Responder = dyn Fn(&str) -> Result<String, GenerationError> + Send + Sync;

/// A text client that replays scripted replies and records every call.
///
/// Scripted replies are consumed in order. Once the script is exhausted the
/// responder (if set) answers, otherwise the default reply, otherwise a
/// network error.
pub struct MockTextClient {
    script: Mutex<VecDeque<Reply>>,
    default: Option<Reply>,
    responder: Option<Box<Responder>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl Default for MockTextClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockTextClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTextClient")
            .field("scripted", &self.script.lock().len())
            .field("calls", &self.calls.lock().len())
            .finish_non_exhaustive()
    }
}

impl MockTextClient {
    /// Creates a client with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default: None,
            responder: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queues a successful reply.
    #[must_use]
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.script.lock().push_back(Reply::Text(text.into()));
        self
    }

    /// Queues a failed reply.
    #[must_use]
    pub fn with_error(self, error: GenerationError) -> Self {
        self.script.lock().push_back(Reply::Error(error));
        self
    }

    /// Queues a reply that panics.
    #[must_use]
    pub fn with_panic(self, message: impl Into<String>) -> Self {
        self.script.lock().push_back(Reply::Panic(message.into()));
        self
    }

    /// Answers every unscripted call with `text`.
    #[must_use]
    pub fn with_default_response(mut self, text: impl Into<String>) -> Self {
        self.default = Some(Reply::Text(text.into()));
        self
    }

    /// Fails every unscripted call.
    #[must_use]
    pub fn always_failing(mut self) -> Self {
        self.default = Some(Reply::Error(GenerationError::Network(
            "connection refused".to_string(),
        )));
        self
    }

    /// Answers unscripted calls by inspecting the prompt.
    #[must_use]
    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&str) -> Result<String, GenerationError> + Send + Sync + 'static,
    {
        self.responder = Some(Box::new(responder));
        self
    }

    /// All recorded calls, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Number of calls made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl GenerativeTextClient for MockTextClient {
    async fn generate(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
        structured_output: bool,
    ) -> Result<String, GenerationError> {
        self.calls.lock().push(RecordedCall {
            prompt: prompt.to_string(),
            system_instruction: system_instruction.map(str::to_string),
            structured_output,
        });

        let scripted = self.script.lock().pop_front();
        if let Some(reply) = scripted {
            return reply.resolve();
        }
        if let Some(ref responder) = self.responder {
            return responder(prompt);
        }
        match self.default.clone() {
            Some(reply) => reply.resolve(),
            None => Err(GenerationError::Network("no scripted reply".to_string())),
        }
    }
}

/// A mailer that records recipients and fails for chosen addresses.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    failing: HashSet<String>,
    sent: Mutex<Vec<Lead>>,
    attempts: Mutex<usize>,
}

impl RecordingMailer {
    /// Creates a mailer that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects mail addressed to `email`.
    #[must_use]
    pub fn failing_for(mut self, email: impl Into<String>) -> Self {
        self.failing.insert(email.into());
        self
    }

    /// Leads whose message was accepted.
    #[must_use]
    pub fn sent(&self) -> Vec<Lead> {
        self.sent.lock().clone()
    }

    /// Number of send attempts, accepted or not.
    #[must_use]
    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, lead: &Lead) -> bool {
        *self.attempts.lock() += 1;
        if self.failing.contains(&lead.email) || !lead.has_draft() {
            return false;
        }
        self.sent.lock().push(lead.clone());
        true
    }
}
