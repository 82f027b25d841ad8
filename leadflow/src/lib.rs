//! # Leadflow
//!
//! An AI-assisted sales campaign pipeline.
//!
//! Each lead passes through three stages that call an external
//! text-generation service and coerce its answer into a structured result:
//!
//! - **Scoring**: priority tier and a 1-10 score
//! - **Enrichment**: buyer persona and sales-strategy notes
//! - **Outreach**: a personalized subject and body
//!
//! Every stage has a deterministic fallback, so a bad model answer degrades
//! one field group instead of failing the lead or the run. After the stages
//! the orchestrator optionally sends the draft and tallies a run summary.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use leadflow::prelude::*;
//!
//! let settings = Settings::from_env()?;
//! let client = Arc::new(ChatClient::from_settings(&settings)?);
//! let mailer = Arc::new(SmtpMailer::from_settings(&settings));
//!
//! let pipeline = CampaignPipeline::from_settings(&settings, client, mailer);
//! let (leads, summary) = pipeline.run(leads, true).await;
//! println!("{}/{} emails sent", summary.sent, summary.total);
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod llm;
pub mod pipeline;
pub mod server;
pub mod services;
pub mod stages;
pub mod templates;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::core::{
        CampaignStats, EmailDraft, EnrichmentResult, Lead, Priority, RunSummary,
        ScoringResult, SendStatus,
    };
    pub use crate::errors::{
        GenerationError, InvalidLeadError, LeadflowError, MalformedResponseError,
        TransportError,
    };
    pub use crate::events::{CampaignEvent, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::llm::{ChatClient, GenerativeTextClient};
    pub use crate::pipeline::{CampaignPipeline, CancellationToken};
    pub use crate::services::{LeadStore, Mailer, ReportService, SmtpMailer};
    pub use crate::stages::{EnrichmentStage, OutreachStage, ScoringStage, Stage};
    pub use crate::templates::{EmailTemplate, TemplateLibrary, TemplateType};
    pub use std::sync::Arc;
}

/// Version of the leadflow library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
