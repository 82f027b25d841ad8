//! Lead scoring stage.

use super::{call_structured, required_priority, required_score, required_str, Stage, StructuredOutput};
use crate::core::{Lead, ScoringResult};
use crate::errors::MalformedResponseError;
use crate::llm::GenerativeTextClient;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info};

const SYSTEM_INSTRUCTION: &str = "You are an expert sales lead qualification analyst.
Assess each lead on:
- Decision-making authority implied by the role
- Company size and buying power
- Industry relevance
- Likelihood to convert

Return ONLY valid JSON with exactly this structure:
{
  \"priority\": \"High|Medium|Low\",
  \"score\": <integer from 1 to 10>,
  \"reasoning\": \"Brief explanation\"
}";

impl StructuredOutput for ScoringResult {
    const FIELDS: &'static [&'static str] = &["priority", "score", "reasoning"];

    fn from_mapping(map: &Map<String, Value>) -> Result<Self, MalformedResponseError> {
        Ok(Self {
            priority: required_priority(map, "priority")?,
            score: required_score(map, "score")?,
            reasoning: required_str(map, "reasoning")?,
        })
    }
}

/// Assigns a priority tier and a 1-10 score.
#[derive(Clone)]
pub struct ScoringStage {
    client: Arc<dyn GenerativeTextClient>,
}

impl ScoringStage {
    /// Creates a new scoring stage.
    #[must_use]
    pub fn new(client: Arc<dyn GenerativeTextClient>) -> Self {
        Self { client }
    }

    fn prompt(lead: &Lead) -> String {
        format!(
            "Analyze this lead and provide a priority assessment:

Lead Information:
- Name: {name}
- Role: {role}
- Company: {company}
- Industry: {industry}
- Company Size: {size}

Consider:
1. Does the role suggest decision-making authority?
2. Is the company size a good fit for our solution?
3. Is the industry a good fit?
4. How likely is this lead to convert?

Return JSON with priority (High/Medium/Low), score (integer 1-10), and reasoning.",
            name = lead.name,
            role = lead.role,
            company = lead.company,
            industry = lead.industry,
            size = lead.company_size,
        )
    }
}

impl std::fmt::Debug for ScoringStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringStage").finish_non_exhaustive()
    }
}

#[async_trait]
impl Stage for ScoringStage {
    type Output = ScoringResult;

    fn name(&self) -> &str {
        "scoring"
    }

    async fn execute(&self, lead: &Lead) -> ScoringResult {
        let prompt = Self::prompt(lead);
        match call_structured::<ScoringResult>(
            self.client.as_ref(),
            self.name(),
            SYSTEM_INSTRUCTION,
            &prompt,
        )
        .await
        {
            Ok(result) => {
                info!(
                    lead = %lead.email,
                    priority = %result.priority,
                    score = result.score,
                    reasoning = %result.reasoning,
                    "Lead scored"
                );
                result
            }
            Err(e) => {
                error!(lead = %lead.email, stage = self.name(), error = %e, "Scoring failed, using default priority");
                ScoringResult::fallback()
            }
        }
    }
}
