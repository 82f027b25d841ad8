//! Testing utilities for campaign runs.
//!
//! This module provides:
//! - A scripted text client that records prompts
//! - A recording mailer with per-address failures
//! - Sample leads and canned model replies

mod fixtures;
mod mocks;

pub use fixtures::{enrichment_json, outreach_json, sample_lead, sample_leads, scoring_json};
pub use mocks::{MockTextClient, RecordedCall, RecordingMailer};
