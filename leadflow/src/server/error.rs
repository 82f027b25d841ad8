//! JSON error responses.

use crate::errors::LeadflowError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// An error returned to HTTP clients as `{"detail": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl ApiError {
    /// Creates an error with an explicit status.
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    /// 404 with `detail`.
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }

    /// Maps a library error, prefixing the detail with `context`.
    pub fn with_context(context: &str, err: &LeadflowError) -> Self {
        let mut api = Self::from(err);
        api.detail = format!("{context}: {}", api.detail);
        api
    }

    /// Response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<&LeadflowError> for ApiError {
    fn from(err: &LeadflowError) -> Self {
        let status = match err {
            LeadflowError::InvalidLead(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl From<LeadflowError> for ApiError {
    fn from(err: LeadflowError) -> Self {
        Self::from(&err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}
