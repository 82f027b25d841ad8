//! The lead record that flows through the pipeline.

use super::{Priority, SendStatus};
use crate::utils::Timestamp;
use serde::{Deserialize, Serialize};

/// One sales prospect.
///
/// Identity fields come from the lead source. Every other field is owned by
/// exactly one pipeline step and stays `None` until that step runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    /// Full name.
    pub name: String,
    /// Email address the outreach is sent to.
    pub email: String,
    /// Company name.
    pub company: String,
    /// Job title.
    pub role: String,
    /// Industry label.
    pub industry: String,
    /// Company size bucket, e.g. "50-200".
    pub company_size: String,
    /// Company website.
    #[serde(default)]
    pub website: Option<String>,

    /// Buyer persona label (enrichment).
    #[serde(default)]
    pub ai_persona: Option<String>,
    /// Priority tier (scoring).
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Priority score in `1..=10` (scoring).
    #[serde(default)]
    pub priority_score: Option<u8>,
    /// Persona notes and suggested approach (enrichment).
    #[serde(default)]
    pub enrichment_notes: Option<String>,

    /// Drafted subject (outreach).
    #[serde(default)]
    pub email_subject: Option<String>,
    /// Drafted body (outreach).
    #[serde(default)]
    pub email_body: Option<String>,
    /// When the relay accepted the message.
    #[serde(default)]
    pub email_sent_at: Option<Timestamp>,
    /// Delivery state.
    #[serde(default)]
    pub email_status: SendStatus,
}

impl Lead {
    /// Creates a lead with identity fields only.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        company: impl Into<String>,
        role: impl Into<String>,
        industry: impl Into<String>,
        company_size: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            company: company.into(),
            role: role.into(),
            industry: industry.into(),
            company_size: company_size.into(),
            website: None,
            ai_persona: None,
            priority: None,
            priority_score: None,
            enrichment_notes: None,
            email_subject: None,
            email_body: None,
            email_sent_at: None,
            email_status: SendStatus::Pending,
        }
    }

    /// Sets the website.
    #[must_use]
    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    /// First whitespace-separated token of the name, or the whole name.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }

    /// Returns true if both a subject and a body have been drafted.
    #[must_use]
    pub fn has_draft(&self) -> bool {
        self.email_subject.as_deref().is_some_and(|s| !s.is_empty())
            && self.email_body.as_deref().is_some_and(|b| !b.is_empty())
    }
}
