//! Lead listing endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::core::Lead;
use crate::errors::LeadflowError;
use crate::server::{ApiError, AppState};

/// Body of `GET /api/v1/leads/count`.
#[derive(Serialize)]
pub struct LeadCount {
    total_leads: usize,
}

/// Input leads as read from the source file.
pub async fn list_leads(State(state): State<AppState>) -> Result<Json<Vec<Lead>>, ApiError> {
    Ok(Json(state.store.read_input()?))
}

/// Leads from the last campaign's output file.
pub async fn list_processed(State(state): State<AppState>) -> Result<Json<Vec<Lead>>, ApiError> {
    match state.store.read_processed() {
        Ok(leads) => Ok(Json(leads)),
        Err(LeadflowError::NotFound(_)) => Err(ApiError::not_found(
            "No processed leads found. Run a campaign first.",
        )),
        Err(e) => Err(e.into()),
    }
}

/// Number of input leads.
pub async fn count_leads(State(state): State<AppState>) -> Result<Json<LeadCount>, ApiError> {
    let leads = state.store.read_input()?;
    Ok(Json(LeadCount {
        total_leads: leads.len(),
    }))
}
