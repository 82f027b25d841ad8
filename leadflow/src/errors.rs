//! Error types for the leadflow campaign pipeline.
//!
//! The taxonomy separates failures that are recovered locally (generation,
//! malformed responses, transport) from those that must reach the caller of a
//! run (invalid input, unwritable sinks, configuration).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The main error type for leadflow operations.
#[derive(Debug, Error)]
pub enum LeadflowError {
    /// A lead record failed shape validation before entering the pipeline.
    #[error("{0}")]
    InvalidLead(#[from] InvalidLeadError),

    /// Configuration could not be loaded.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// The text-generation call failed.
    #[error("{0}")]
    Generation(#[from] GenerationError),

    /// The generated text could not be turned into a structured result.
    #[error("{0}")]
    MalformedResponse(#[from] MalformedResponseError),

    /// A message could not be delivered.
    #[error("{0}")]
    Transport(#[from] TransportError),

    /// A requested resource (lead file, processed output) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Tabular encoding or decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LeadflowError {
    /// Returns a short machine-readable kind for API responses and logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidLead(_) => "invalid_lead",
            Self::Config(_) => "config",
            Self::Generation(_) => "generation",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Transport(_) => "transport",
            Self::NotFound(_) => "not_found",
            Self::Csv(_) => "csv",
            Self::Io(_) => "io",
        }
    }
}

/// The external text-generation call itself failed.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// The request could not be sent or the connection dropped.
    #[error("Generation request failed: {0}")]
    Network(String),

    /// The request did not complete within the configured timeout.
    #[error("Generation request timed out after {0}s")]
    Timeout(u64),

    /// The service rejected the request (auth, quota, bad request).
    #[error("Generation service returned {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned by the service.
        body: String,
    },

    /// The service answered but the envelope carried no message content.
    #[error("Generation service returned no content")]
    EmptyResponse,
}

/// The call succeeded but its output did not satisfy the result contract.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MalformedResponseError {
    /// The text (after stripping any fenced block) is not valid JSON.
    #[error("Response is not valid JSON: {0}")]
    Parse(String),

    /// The JSON value is not an object.
    #[error("Response is not a JSON object (got {0})")]
    NotAnObject(String),

    /// A required field is absent.
    #[error("Response is missing required field '{0}'")]
    MissingField(String),

    /// A field is present but has the wrong type or an out-of-range value.
    #[error("Field '{field}' is invalid: {reason}")]
    InvalidField {
        /// The offending field.
        field: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl MalformedResponseError {
    /// Creates an invalid field error.
    #[must_use]
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of one stage call: either the generation or the contract failed.
#[derive(Debug, Clone, Error)]
pub enum StageError {
    /// See [`GenerationError`].
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// See [`MalformedResponseError`].
    #[error(transparent)]
    Malformed(#[from] MalformedResponseError),
}

/// A source record failed basic shape validation.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("Invalid lead at row {row}: field '{field}' {reason}")]
pub struct InvalidLeadError {
    /// 1-based data row (header excluded).
    pub row: usize,
    /// The offending field.
    pub field: String,
    /// What was wrong with it.
    pub reason: String,
}

impl InvalidLeadError {
    /// Creates a new invalid lead error.
    #[must_use]
    pub fn new(row: usize, field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            row,
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("row".to_string(), serde_json::json!(self.row));
        map.insert("field".to_string(), serde_json::json!(self.field));
        map.insert("reason".to_string(), serde_json::json!(self.reason));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

/// The send collaborator could not deliver a message.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The lead has no drafted subject or body.
    #[error("Lead {0} has no drafted subject or body")]
    MissingDraft(String),

    /// An address could not be parsed.
    #[error("Invalid address '{address}': {reason}")]
    Address {
        /// The address as configured or supplied.
        address: String,
        /// Parser message.
        reason: String,
    },

    /// The message could not be assembled.
    #[error("Could not build message: {0}")]
    Build(String),

    /// The relay refused or the connection failed.
    #[error("SMTP delivery failed: {0}")]
    Smtp(String),
}

/// Configuration could not be loaded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("Missing required setting {0}")]
    Missing(String),

    /// A variable is set but cannot be parsed.
    #[error("Invalid value for {key}: '{value}'")]
    Invalid {
        /// Variable name.
        key: String,
        /// Raw value.
        value: String,
    },
}
