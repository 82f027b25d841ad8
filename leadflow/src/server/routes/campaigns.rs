//! Campaign run, statistics and template endpoints.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use crate::core::CampaignStats;
use crate::errors::LeadflowError;
use crate::pipeline::CampaignPipeline;
use crate::server::{ApiError, AppState};
use crate::templates::EmailTemplate;

fn default_send_emails() -> bool {
    true
}

/// Body of `POST /api/v1/campaigns/run`. An empty body uses the defaults.
#[derive(Debug, Deserialize)]
pub struct CampaignRequest {
    /// Whether drafted emails are sent.
    #[serde(default = "default_send_emails")]
    pub send_emails: bool,
}

impl Default for CampaignRequest {
    fn default() -> Self {
        Self {
            send_emails: default_send_emails(),
        }
    }
}

/// Result of a completed campaign.
#[derive(Debug, Serialize, Deserialize)]
pub struct CampaignResponse {
    /// Always `success`.
    pub status: String,
    /// Human-readable outcome.
    pub message: String,
    /// Leads in the output file.
    pub leads_processed: usize,
    /// Leads whose email was sent.
    pub emails_sent: usize,
    /// Path of the markdown report.
    pub report_path: String,
    /// Wall time in seconds, two decimals.
    pub execution_time: f64,
}

fn parse_request(body: &Bytes) -> Result<CampaignRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CampaignRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        ApiError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Invalid request body: {e}"),
        )
    })
}

/// Reads the input leads, runs the pipeline, writes the output and the report.
pub async fn run_campaign(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CampaignResponse>, ApiError> {
    let request = parse_request(&body)?;
    debug!(body_bytes = body.len(), send_emails = request.send_emails, "Campaign requested");

    let Ok(_guard) = state.campaign_lock.try_lock() else {
        return Err(ApiError::new(
            StatusCode::CONFLICT,
            "A campaign is already running",
        ));
    };

    let start = Instant::now();
    let fail = |e: LeadflowError| ApiError::with_context("Campaign failed", &e);

    let leads = state.store.read_input().map_err(fail)?;
    let pipeline = CampaignPipeline::from_settings(
        &state.settings,
        state.client.clone(),
        state.mailer.clone(),
    )
    .with_event_sink(state.events.clone());

    let (processed, summary) = pipeline.run(leads, request.send_emails).await;
    state.store.write_processed(&processed).map_err(fail)?;
    let report_path = state.reports.generate_report(&processed).await;

    let execution_time = (start.elapsed().as_secs_f64() * 100.0).round() / 100.0;
    info!(
        total = summary.total,
        sent = summary.sent,
        execution_time,
        "Campaign request completed"
    );

    Ok(Json(CampaignResponse {
        status: "success".to_string(),
        message: format!(
            "Campaign completed successfully! {}/{} emails sent.",
            summary.sent, summary.total
        ),
        leads_processed: summary.total,
        emails_sent: summary.sent,
        report_path: report_path.display().to_string(),
        execution_time,
    }))
}

/// Statistics over the last campaign's output file.
pub async fn campaign_stats(State(state): State<AppState>) -> Result<Json<CampaignStats>, ApiError> {
    match state.store.read_processed() {
        Ok(leads) => Ok(Json(state.reports.generate_stats(&leads))),
        Err(LeadflowError::NotFound(_)) => Err(ApiError::not_found(
            "No campaign data found. Run a campaign first.",
        )),
        Err(e) => Err(e.into()),
    }
}

/// The template catalog.
pub async fn list_templates(State(state): State<AppState>) -> Json<Vec<EmailTemplate>> {
    Json(state.templates.iter().cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_defaults_to_sending() {
        assert!(parse_request(&Bytes::new()).unwrap().send_emails);
        assert!(parse_request(&Bytes::from_static(b"  \n")).unwrap().send_emails);
        assert!(parse_request(&Bytes::from_static(b"{}")).unwrap().send_emails);
    }

    #[test]
    fn test_explicit_flag_and_bad_json() {
        let req = parse_request(&Bytes::from_static(br#"{"send_emails": false}"#)).unwrap();
        assert!(!req.send_emails);

        let err = parse_request(&Bytes::from_static(b"{not json")).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
