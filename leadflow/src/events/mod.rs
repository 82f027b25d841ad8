//! Campaign lifecycle events.
//!
//! The orchestrator reports progress through an [`EventSink`] it is given at
//! construction; there is no process-wide sink.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

use crate::core::{RunSummary, SendStatus};
use serde::Serialize;

/// One lifecycle event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CampaignEvent {
    /// A run began.
    CampaignStarted {
        /// Number of input leads.
        total: usize,
        /// Whether messages will be sent.
        send_emails: bool,
    },
    /// A lead entered the stages.
    LeadStarted {
        /// Position in the input.
        index: usize,
        /// Lead address.
        email: String,
    },
    /// A lead left the pipeline.
    LeadCompleted {
        /// Position in the input.
        index: usize,
        /// Lead address.
        email: String,
        /// Final delivery state.
        status: SendStatus,
        /// Wall time spent on the lead.
        duration_ms: u64,
    },
    /// A lead hit an unexpected fault.
    LeadFailed {
        /// Position in the input.
        index: usize,
        /// Lead address.
        email: String,
        /// Fault description.
        error: String,
    },
    /// The run stopped early.
    CampaignCancelled {
        /// Leads that went through the stages.
        processed: usize,
        /// Leads passed through untouched.
        remaining: usize,
    },
    /// The run finished.
    CampaignCompleted {
        /// Final counters.
        summary: RunSummary,
        /// Wall time for the run.
        duration_ms: u64,
    },
}

impl CampaignEvent {
    /// Dotted event name, e.g. `lead.completed`.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::CampaignStarted { .. } => "campaign.started",
            Self::LeadStarted { .. } => "lead.started",
            Self::LeadCompleted { .. } => "lead.completed",
            Self::LeadFailed { .. } => "lead.failed",
            Self::CampaignCancelled { .. } => "campaign.cancelled",
            Self::CampaignCompleted { .. } => "campaign.completed",
        }
    }
}
