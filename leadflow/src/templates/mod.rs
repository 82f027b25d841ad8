//! Email templates with safe `$name` / `${name}` substitution.
//!
//! Substitution never fails: placeholders without a value are left in the
//! output verbatim, and `$$` renders a literal `$`.

mod library;

pub use library::{fallback_template, TemplateLibrary, FALLBACK_TEMPLATE};

use crate::core::Lead;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:(\$)|([_A-Za-z][_A-Za-z0-9]*)|\{([_A-Za-z][_A-Za-z0-9]*)\})")
        .expect("valid placeholder regex")
});

/// Variables available to a template.
pub type TemplateVars = HashMap<String, String>;

/// Replaces `$name` and `${name}` with values from `vars`.
///
/// Unknown names and malformed placeholders are kept as written.
#[must_use]
pub fn safe_substitute(template: &str, vars: &TemplateVars) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            if caps.get(1).is_some() {
                return "$".to_string();
            }
            let name = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
            vars.get(name)
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Variables derived from a lead's identity and enrichment fields.
#[must_use]
pub fn lead_vars(lead: &Lead) -> TemplateVars {
    let mut vars = TemplateVars::new();
    vars.insert("first_name".into(), lead.first_name().to_string());
    vars.insert("full_name".into(), lead.name.clone());
    vars.insert("email".into(), lead.email.clone());
    vars.insert("company".into(), lead.company.clone());
    vars.insert("role".into(), lead.role.clone());
    vars.insert("industry".into(), lead.industry.clone());
    vars.insert("company_size".into(), lead.company_size.clone());
    vars.insert(
        "persona".into(),
        lead.ai_persona.clone().unwrap_or_else(|| "Professional".into()),
    );
    vars.insert(
        "priority".into(),
        lead.priority.map_or_else(|| "Medium".into(), |p| p.to_string()),
    );
    if let Some(ref website) = lead.website {
        vars.insert("website".into(), website.clone());
    }
    vars
}

/// Template category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateType {
    /// First contact.
    ColdOutreach,
    /// Nudge after no reply.
    FollowUp,
    /// Ask for a demo slot.
    DemoRequest,
    /// Confirm a booked meeting.
    MeetingConfirmation,
    /// After a meeting.
    ThankYou,
    /// Revive a cold lead.
    ReEngagement,
    /// Announce a release.
    ProductAnnouncement,
    /// User-defined.
    Custom,
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ColdOutreach => "cold_outreach",
            Self::FollowUp => "follow_up",
            Self::DemoRequest => "demo_request",
            Self::MeetingConfirmation => "meeting_confirmation",
            Self::ThankYou => "thank_you",
            Self::ReEngagement => "re_engagement",
            Self::ProductAnnouncement => "product_announcement",
            Self::Custom => "custom",
        };
        write!(f, "{s}")
    }
}

/// Rendered subject and body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedEmail {
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub body: String,
}

/// A named subject/body template pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTemplate {
    /// Unique name within a library.
    pub name: String,
    /// Category.
    pub template_type: TemplateType,
    /// Subject template.
    pub subject_template: String,
    /// Body template.
    pub body_template: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
}

impl EmailTemplate {
    /// Creates a new template.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        template_type: TemplateType,
        subject_template: impl Into<String>,
        body_template: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            template_type,
            subject_template: subject_template.into(),
            body_template: body_template.into(),
            description: String::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Renders subject and body with `vars`.
    #[must_use]
    pub fn render(&self, vars: &TemplateVars) -> RenderedEmail {
        RenderedEmail {
            subject: safe_substitute(&self.subject_template, vars),
            body: safe_substitute(&self.body_template, vars),
        }
    }

    /// Renders for a lead; `extra` entries override lead-derived variables.
    #[must_use]
    pub fn render_for_lead(&self, lead: &Lead, extra: &TemplateVars) -> RenderedEmail {
        let mut vars = lead_vars(lead);
        vars.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.render(&vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Priority;
    use pretty_assertions::assert_eq;

    fn vars(pairs: &[(&str, &str)]) -> TemplateVars {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_substitutes_both_forms() {
        let out = safe_substitute("Hi $name, welcome to ${company}!", &vars(&[
            ("name", "Jane"),
            ("company", "Acme"),
        ]));
        assert_eq!(out, "Hi Jane, welcome to Acme!");
    }

    #[test]
    fn test_unknown_placeholders_are_kept() {
        let out = safe_substitute("Hi $name, see ${link} and $other", &vars(&[("name", "Jane")]));
        assert_eq!(out, "Hi Jane, see ${link} and $other");
    }

    #[test]
    fn test_dollar_escapes_and_strays() {
        let out = safe_substitute("Costs $$5, save $ 10, ${ bad}", &vars(&[]));
        assert_eq!(out, "Costs $5, save $ 10, ${ bad}");
    }

    #[test]
    fn test_braced_placeholder_adjacent_to_text() {
        let out = safe_substitute("${company}'s growth", &vars(&[("company", "Acme")]));
        assert_eq!(out, "Acme's growth");
    }

    #[test]
    fn test_lead_vars_defaults() {
        let lead = Lead::new("Jane Doe", "jane@acme.com", "Acme", "CTO", "SaaS", "50-200");
        let vars = lead_vars(&lead);

        assert_eq!(vars["first_name"], "Jane");
        assert_eq!(vars["persona"], "Professional");
        assert_eq!(vars["priority"], "Medium");
        assert!(!vars.contains_key("website"));
    }

    #[test]
    fn test_render_for_lead_with_overrides() {
        let mut lead = Lead::new("Jane Doe", "jane@acme.com", "Acme", "CTO", "SaaS", "50-200");
        lead.priority = Some(Priority::High);

        let template = EmailTemplate::new(
            "t",
            TemplateType::Custom,
            "[$priority] For ${company}",
            "Hi $first_name, from $sender",
        );
        let rendered = template.render_for_lead(&lead, &vars(&[("sender", "Sam")]));

        assert_eq!(rendered.subject, "[High] For Acme");
        assert_eq!(rendered.body, "Hi Jane, from Sam");
    }

    #[test]
    fn test_template_type_display_matches_serde() {
        let json = serde_json::to_string(&TemplateType::ReEngagement).unwrap();
        assert_eq!(json, format!("\"{}\"", TemplateType::ReEngagement));
    }
}
