//! Short-lived value objects produced by the three stages.
//!
//! The orchestrator copies each result onto the lead with `apply_to` and
//! drops it.

use super::{Lead, Priority};
use serde::{Deserialize, Serialize};

/// Lowest accepted priority score.
pub const MIN_SCORE: u8 = 1;
/// Highest accepted priority score.
pub const MAX_SCORE: u8 = 10;

/// Output of the scoring stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringResult {
    /// Priority tier.
    pub priority: Priority,
    /// Integer score in `MIN_SCORE..=MAX_SCORE`.
    pub score: u8,
    /// Model's explanation.
    pub reasoning: String,
}

impl ScoringResult {
    /// Deterministic result used when scoring fails.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            priority: Priority::Medium,
            score: 5,
            reasoning: "Error during scoring - assigned default priority".to_string(),
        }
    }

    /// Writes `priority` and `priority_score`.
    pub fn apply_to(self, lead: &mut Lead) {
        lead.priority = Some(self.priority);
        lead.priority_score = Some(self.score);
    }
}

/// Output of the enrichment stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    /// Short persona label.
    pub persona: String,
    /// Characteristics and motivations.
    pub notes: String,
    /// Recommended sales strategy.
    pub suggested_approach: String,
}

impl EnrichmentResult {
    /// Deterministic result used when enrichment fails.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            persona: "General Business Contact".to_string(),
            notes: "Standard lead profile".to_string(),
            suggested_approach: "Standard outreach approach".to_string(),
        }
    }

    /// Writes `ai_persona` and `enrichment_notes`.
    pub fn apply_to(self, lead: &mut Lead) {
        lead.enrichment_notes = Some(format!(
            "{} | Approach: {}",
            self.notes, self.suggested_approach
        ));
        lead.ai_persona = Some(self.persona);
    }
}

/// Output of the outreach stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailDraft {
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// Why the draft fits this lead.
    pub personalization_notes: String,
}

impl EmailDraft {
    /// Writes `email_subject` and `email_body`.
    pub fn apply_to(self, lead: &mut Lead) {
        lead.email_subject = Some(self.subject);
        lead.email_body = Some(self.body);
    }
}
