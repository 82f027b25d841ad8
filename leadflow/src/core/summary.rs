//! Run-level aggregates derived from the processed leads.

use super::{Lead, Priority, SendStatus};
use serde::{Deserialize, Serialize};

/// Counters over one completed run.
///
/// Always recomputed from the processed collection; never persisted on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of leads in the output collection.
    pub total: usize,
    /// Leads whose email was sent.
    pub sent: usize,
    /// Leads whose send failed.
    pub failed: usize,
    /// Leads that hit an unexpected fault.
    pub errors: usize,
    /// High-priority leads.
    pub high: usize,
    /// Medium-priority leads.
    pub medium: usize,
    /// Low-priority leads.
    pub low: usize,
    /// Whether the run stopped early on a cancellation request.
    pub cancelled: bool,
}

impl RunSummary {
    /// Scans the processed leads once.
    #[must_use]
    pub fn from_leads(leads: &[Lead]) -> Self {
        leads.iter().fold(
            Self {
                total: leads.len(),
                ..Self::default()
            },
            |mut acc, lead| {
                match lead.email_status {
                    SendStatus::Sent => acc.sent += 1,
                    SendStatus::Failed => acc.failed += 1,
                    SendStatus::Error => acc.errors += 1,
                    SendStatus::Pending | SendStatus::Draft => {}
                }
                match lead.priority {
                    Some(Priority::High) => acc.high += 1,
                    Some(Priority::Medium) => acc.medium += 1,
                    Some(Priority::Low) => acc.low += 1,
                    None => {}
                }
                acc
            },
        )
    }

    /// Marks the summary as belonging to a cancelled run.
    #[must_use]
    pub fn cancelled(mut self) -> Self {
        self.cancelled = true;
        self
    }
}

/// Campaign statistics exposed by the report and the stats endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignStats {
    /// Total leads.
    pub total_leads: usize,
    /// Emails sent.
    pub emails_sent: usize,
    /// Emails that failed to send.
    pub emails_failed: usize,
    /// High-priority leads.
    pub high_priority: usize,
    /// Medium-priority leads.
    pub medium_priority: usize,
    /// Low-priority leads.
    pub low_priority: usize,
    /// Up to five most common personas with counts, most common first.
    pub top_personas: Vec<(String, usize)>,
    /// Up to five most common industries with counts, most common first.
    pub top_industries: Vec<(String, usize)>,
}
