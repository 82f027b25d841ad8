//! Sample leads and canned model replies.

use crate::core::Lead;
use serde_json::json;

/// The reference lead: Jane Doe, CTO at Acme (SaaS, 50-200).
#[must_use]
pub fn sample_lead() -> Lead {
    Lead::new("Jane Doe", "jane@acme.com", "Acme", "CTO", "SaaS", "50-200")
}

/// `count` distinct leads named `Lead 0`, `Lead 1`, ...
#[must_use]
pub fn sample_leads(count: usize) -> Vec<Lead> {
    (0..count)
        .map(|i| {
            Lead::new(
                format!("Lead {i}"),
                format!("lead{i}@example.com"),
                format!("Company {i}"),
                "VP Engineering",
                "Fintech",
                "200-500",
            )
        })
        .collect()
}

/// A valid scoring reply.
#[must_use]
pub fn scoring_json(priority: &str, score: u8) -> String {
    json!({
        "priority": priority,
        "score": score,
        "reasoning": "Senior decision maker at a good-fit company",
    })
    .to_string()
}

/// A valid enrichment reply.
#[must_use]
pub fn enrichment_json(persona: &str) -> String {
    json!({
        "persona": persona,
        "notes": "Cares about reliability and team velocity",
        "suggested_approach": "Lead with engineering time saved",
    })
    .to_string()
}

/// A valid outreach reply.
#[must_use]
pub fn outreach_json(subject: &str) -> String {
    json!({
        "subject": subject,
        "body": "Hi there,\n\nShort and relevant.\n\nBest",
        "personalization_notes": "Mentions their role",
    })
    .to_string()
}
