//! Campaign orchestration.
//!
//! This module provides:
//! - The per-lead orchestrator that sequences the stages and the send step
//! - Cooperative cancellation between leads

mod cancellation;
mod orchestrator;

#[cfg(test)]
mod orchestrator_tests;

pub use cancellation::CancellationToken;
pub use orchestrator::CampaignPipeline;
