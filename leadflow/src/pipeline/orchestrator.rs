//! Per-lead sequencing of the three stages and the send step.

use super::CancellationToken;
use crate::config::Settings;
use crate::core::{Lead, RunSummary, SendStatus};
use crate::events::{CampaignEvent, EventSink, NoOpEventSink};
use crate::llm::GenerativeTextClient;
use crate::services::Mailer;
use crate::stages::{EnrichmentStage, OutreachStage, ScoringStage, Stage};
use crate::utils::now_utc;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Runs leads through scoring, enrichment and outreach, then optionally sends.
///
/// Leads are processed one at a time in input order. Stage failures degrade
/// to fallback values, send failures to `Failed`, and any other per-lead
/// fault to `Error`; nothing raised while processing a lead escapes `run`.
pub struct CampaignPipeline {
    scoring: ScoringStage,
    enrichment: EnrichmentStage,
    outreach: OutreachStage,
    mailer: Arc<dyn Mailer>,
    events: Arc<dyn EventSink>,
    lead_delay: Duration,
}

impl CampaignPipeline {
    /// Builds the three stages around one text client. No inter-lead delay.
    #[must_use]
    pub fn new(client: Arc<dyn GenerativeTextClient>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            scoring: ScoringStage::new(client.clone()),
            enrichment: EnrichmentStage::new(client.clone()),
            outreach: OutreachStage::new(client),
            mailer,
            events: Arc::new(NoOpEventSink),
            lead_delay: Duration::ZERO,
        }
    }

    /// Builds a pipeline using the configured inter-lead delay.
    #[must_use]
    pub fn from_settings(
        settings: &Settings,
        client: Arc<dyn GenerativeTextClient>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self::new(client, mailer).with_lead_delay(settings.lead_delay())
    }

    /// Sets the pause between consecutive leads.
    #[must_use]
    pub fn with_lead_delay(mut self, delay: Duration) -> Self {
        self.lead_delay = delay;
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Replaces the outreach stage, e.g. to use a custom fallback template.
    #[must_use]
    pub fn with_outreach_stage(mut self, outreach: OutreachStage) -> Self {
        self.outreach = outreach;
        self
    }

    /// Processes every lead. Output order equals input order.
    pub async fn run(&self, leads: Vec<Lead>, send_emails: bool) -> (Vec<Lead>, RunSummary) {
        self.run_with_cancel(leads, send_emails, &CancellationToken::new())
            .await
    }

    /// Like [`run`](Self::run), but stops taking new leads once `cancel` is
    /// set. Leads not yet started are returned unchanged after the processed
    /// ones and the summary is marked cancelled.
    pub async fn run_with_cancel(
        &self,
        leads: Vec<Lead>,
        send_emails: bool,
        cancel: &CancellationToken,
    ) -> (Vec<Lead>, RunSummary) {
        let run_id = Uuid::new_v4();
        let span = info_span!("campaign", %run_id);
        self.run_inner(leads, send_emails, cancel)
            .instrument(span)
            .await
    }

    async fn run_inner(
        &self,
        leads: Vec<Lead>,
        send_emails: bool,
        cancel: &CancellationToken,
    ) -> (Vec<Lead>, RunSummary) {
        let start = Instant::now();
        let total = leads.len();
        info!(total, send_emails, "Starting campaign");
        self.events
            .emit(&CampaignEvent::CampaignStarted { total, send_emails })
            .await;

        let mut processed = Vec::with_capacity(total);
        let mut pending = leads.into_iter().enumerate();
        let mut was_cancelled = false;

        while let Some((index, lead)) = pending.next() {
            if cancel.is_cancelled() {
                warn!(
                    processed = index,
                    remaining = total - index,
                    reason = ?cancel.reason(),
                    "Campaign cancelled"
                );
                self.events
                    .emit(&CampaignEvent::CampaignCancelled {
                        processed: index,
                        remaining: total - index,
                    })
                    .await;
                processed.push(lead);
                processed.extend(pending.by_ref().map(|(_, rest)| rest));
                was_cancelled = true;
                break;
            }

            info!(index = index + 1, total, lead = %lead.email, "Processing lead");
            processed.push(self.process_lead(index, lead, send_emails).await);

            if index + 1 < total && !self.lead_delay.is_zero() {
                tokio::time::sleep(self.lead_delay).await;
            }
        }

        let mut summary = RunSummary::from_leads(&processed);
        if was_cancelled {
            summary = summary.cancelled();
        }

        let duration_ms = elapsed_ms(start);
        info!(
            total = summary.total,
            sent = summary.sent,
            failed = summary.failed,
            errors = summary.errors,
            duration_ms,
            "Campaign finished"
        );
        self.events
            .emit(&CampaignEvent::CampaignCompleted {
                summary,
                duration_ms,
            })
            .await;

        (processed, summary)
    }

    /// Runs one lead behind a panic boundary.
    async fn process_lead(&self, index: usize, mut lead: Lead, send_emails: bool) -> Lead {
        let start = Instant::now();
        self.events
            .emit(&CampaignEvent::LeadStarted {
                index,
                email: lead.email.clone(),
            })
            .await;

        let outcome = AssertUnwindSafe(self.process(&mut lead, send_emails))
            .catch_unwind()
            .await;

        if let Err(payload) = outcome {
            let message = panic_message(payload.as_ref());
            error!(lead = %lead.email, error = %message, "Unexpected fault while processing lead");
            lead.email_status = SendStatus::Error;
            self.events
                .emit(&CampaignEvent::LeadFailed {
                    index,
                    email: lead.email.clone(),
                    error: message,
                })
                .await;
        }

        self.events
            .emit(&CampaignEvent::LeadCompleted {
                index,
                email: lead.email.clone(),
                status: lead.email_status,
                duration_ms: elapsed_ms(start),
            })
            .await;
        lead
    }

    async fn process(&self, lead: &mut Lead, send_emails: bool) {
        self.scoring.execute(lead).await.apply_to(lead);
        self.enrichment.execute(lead).await.apply_to(lead);
        self.outreach.execute(lead).await.apply_to(lead);

        if !send_emails {
            lead.email_status = SendStatus::Draft;
            return;
        }

        if self.mailer.send(lead).await {
            lead.email_status = SendStatus::Sent;
            lead.email_sent_at = Some(now_utc());
            info!(lead = %lead.email, "Email sent");
        } else {
            lead.email_status = SendStatus::Failed;
            warn!(lead = %lead.email, "Email send failed");
        }
    }
}

impl std::fmt::Debug for CampaignPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CampaignPipeline")
            .field("stages", &[
                self.scoring.name(),
                self.enrichment.name(),
                self.outreach.name(),
            ])
            .field("lead_delay", &self.lead_delay)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
