//! Persona enrichment stage.

use super::{call_structured, required_str, Stage, StructuredOutput};
use crate::core::{EnrichmentResult, Lead};
use crate::errors::MalformedResponseError;
use crate::llm::GenerativeTextClient;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info};

const SYSTEM_INSTRUCTION: &str = "You are a B2B sales strategist specializing in buyer persona development.
Build concise buyer personas and a strategic sales approach for each lead.

Return ONLY valid JSON with exactly this structure:
{
  \"persona\": \"Brief persona title\",
  \"notes\": \"Key characteristics and motivations\",
  \"suggested_approach\": \"Recommended sales strategy\"
}";

impl StructuredOutput for EnrichmentResult {
    const FIELDS: &'static [&'static str] = &["persona", "notes", "suggested_approach"];

    fn from_mapping(map: &Map<String, Value>) -> Result<Self, MalformedResponseError> {
        Ok(Self {
            persona: required_str(map, "persona")?,
            notes: required_str(map, "notes")?,
            suggested_approach: required_str(map, "suggested_approach")?,
        })
    }
}

/// Derives a buyer persona and sales-strategy notes.
#[derive(Clone)]
pub struct EnrichmentStage {
    client: Arc<dyn GenerativeTextClient>,
}

impl EnrichmentStage {
    /// Creates a new enrichment stage.
    #[must_use]
    pub fn new(client: Arc<dyn GenerativeTextClient>) -> Self {
        Self { client }
    }

    fn prompt(lead: &Lead) -> String {
        let priority = lead
            .priority
            .map_or_else(|| "Unscored".to_string(), |p| p.to_string());
        let score = lead
            .priority_score
            .map_or_else(|| "n/a".to_string(), |s| format!("{s}/10"));

        format!(
            "Create a buyer persona profile for this lead:

Lead Profile:
- Name: {name}
- Role: {role}
- Company: {company} ({size} employees)
- Industry: {industry}
- Priority: {priority} (score {score})

Provide:
1. Persona: a descriptive title (e.g. \"Technical Decision Maker\", \"Budget Holder\", \"Innovation Champion\")
2. Notes: key characteristics, pain points and motivations
3. Suggested approach: how to approach this lead and which messaging resonates

Return JSON format.",
            name = lead.name,
            role = lead.role,
            company = lead.company,
            size = lead.company_size,
            industry = lead.industry,
        )
    }
}

impl std::fmt::Debug for EnrichmentStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrichmentStage").finish_non_exhaustive()
    }
}

#[async_trait]
impl Stage for EnrichmentStage {
    type Output = EnrichmentResult;

    fn name(&self) -> &str {
        "enrichment"
    }

    async fn execute(&self, lead: &Lead) -> EnrichmentResult {
        let prompt = Self::prompt(lead);
        match call_structured::<EnrichmentResult>(
            self.client.as_ref(),
            self.name(),
            SYSTEM_INSTRUCTION,
            &prompt,
        )
        .await
        {
            Ok(result) => {
                info!(lead = %lead.email, persona = %result.persona, "Lead enriched");
                result
            }
            Err(e) => {
                error!(lead = %lead.email, stage = self.name(), error = %e, "Enrichment failed, using standard profile");
                EnrichmentResult::fallback()
            }
        }
    }
}
