//! Core domain types for leadflow.

mod lead;
mod results;
mod status;
mod summary;

pub use lead::Lead;
pub use results::{EmailDraft, EnrichmentResult, ScoringResult, MAX_SCORE, MIN_SCORE};
pub use status::{Priority, SendStatus};
pub use summary::{CampaignStats, RunSummary};
