//! Outreach drafting stage.

use super::{call_structured, required_str, Stage, StructuredOutput};
use crate::core::{EmailDraft, Lead};
use crate::errors::MalformedResponseError;
use crate::llm::GenerativeTextClient;
use crate::templates::{fallback_template, EmailTemplate, TemplateVars};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info};

const SYSTEM_INSTRUCTION: &str = "You are an expert B2B sales copywriter.
Write short, personalized cold emails that sound human, reference the prospect's
role and company, and end with one clear call to action. No buzzwords.

Return ONLY valid JSON with exactly this structure:
{
  \"subject\": \"Email subject line\",
  \"body\": \"Email body text\",
  \"personalization_notes\": \"Why this email fits the lead\"
}";

const PRODUCT_PITCH: &str = "an AI-powered workflow automation platform that helps teams \
eliminate repetitive operational work and scale without adding headcount";

/// Notes recorded on a templated draft.
pub const FALLBACK_NOTES: &str = "Fallback template due to generation error";

impl StructuredOutput for EmailDraft {
    const FIELDS: &'static [&'static str] = &["subject", "body", "personalization_notes"];

    fn from_mapping(map: &Map<String, Value>) -> Result<Self, MalformedResponseError> {
        Ok(Self {
            subject: required_str(map, "subject")?,
            body: required_str(map, "body")?,
            personalization_notes: required_str(map, "personalization_notes")?,
        })
    }
}

/// Drafts a personalized outreach email.
///
/// Falls back to a template built from the lead's identity fields only.
#[derive(Clone)]
pub struct OutreachStage {
    client: Arc<dyn GenerativeTextClient>,
    fallback: EmailTemplate,
}

impl OutreachStage {
    /// Creates a new outreach stage with the built-in fallback template.
    #[must_use]
    pub fn new(client: Arc<dyn GenerativeTextClient>) -> Self {
        Self {
            client,
            fallback: fallback_template(),
        }
    }

    /// Replaces the fallback template.
    #[must_use]
    pub fn with_fallback_template(mut self, template: EmailTemplate) -> Self {
        self.fallback = template;
        self
    }

    /// Renders the fallback draft for `lead`.
    #[must_use]
    pub fn fallback_draft(&self, lead: &Lead) -> EmailDraft {
        let rendered = self.fallback.render_for_lead(lead, &TemplateVars::new());
        EmailDraft {
            subject: rendered.subject,
            body: rendered.body,
            personalization_notes: FALLBACK_NOTES.to_string(),
        }
    }

    fn prompt(lead: &Lead) -> String {
        let persona = lead.ai_persona.as_deref().unwrap_or("Business Professional");
        let priority = lead
            .priority
            .map_or_else(|| "Medium".to_string(), |p| p.to_string());
        let notes = lead.enrichment_notes.as_deref().unwrap_or("None");

        format!(
            "Write a personalized cold outreach email for this lead:

Recipient:
- Name: {name} (address them as {first_name})
- Role: {role}
- Company: {company}
- Industry: {industry}
- Company Size: {size}

Insights:
- Persona: {persona}
- Priority: {priority}
- Notes: {notes}

Our product: {pitch}.

Requirements:
1. Subject line under 60 characters
2. Body of 3-4 short paragraphs referencing their role and industry
3. One clear call to action
4. Plain text, no placeholders

Return JSON with subject, body and personalization_notes.",
            name = lead.name,
            first_name = lead.first_name(),
            role = lead.role,
            company = lead.company,
            industry = lead.industry,
            size = lead.company_size,
            pitch = PRODUCT_PITCH,
        )
    }
}

impl std::fmt::Debug for OutreachStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutreachStage")
            .field("fallback", &self.fallback.name)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Stage for OutreachStage {
    type Output = EmailDraft;

    fn name(&self) -> &str {
        "outreach"
    }

    async fn execute(&self, lead: &Lead) -> EmailDraft {
        let prompt = Self::prompt(lead);
        match call_structured::<EmailDraft>(
            self.client.as_ref(),
            self.name(),
            SYSTEM_INSTRUCTION,
            &prompt,
        )
        .await
        {
            Ok(draft) => {
                info!(lead = %lead.email, subject = %draft.subject, "Outreach drafted");
                draft
            }
            Err(e) => {
                error!(lead = %lead.email, stage = self.name(), error = %e, "Drafting failed, using fallback template");
                self.fallback_draft(lead)
            }
        }
    }
}
