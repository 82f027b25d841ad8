//! Built-in and custom template collection.

use super::{EmailTemplate, RenderedEmail, TemplateType, TemplateVars};
use crate::core::Lead;
use std::collections::BTreeMap;

/// Name of the template the outreach stage falls back to.
pub const FALLBACK_TEMPLATE: &str = "fallback_outreach";

/// Templates keyed by name, iterated in name order.
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    templates: BTreeMap<String, EmailTemplate>,
}

impl Default for TemplateLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateLibrary {
    /// Creates a library pre-loaded with the built-in templates.
    #[must_use]
    pub fn new() -> Self {
        let mut library = Self::empty();
        for template in builtin_templates() {
            library.add(template);
        }
        library
    }

    /// Creates a library with no templates.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            templates: BTreeMap::new(),
        }
    }

    /// Adds or replaces a template.
    pub fn add(&mut self, template: EmailTemplate) {
        self.templates.insert(template.name.clone(), template);
    }

    /// Looks up a template by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&EmailTemplate> {
        self.templates.get(name)
    }

    /// All templates of one category.
    #[must_use]
    pub fn by_type(&self, template_type: TemplateType) -> Vec<&EmailTemplate> {
        self.templates
            .values()
            .filter(|t| t.template_type == template_type)
            .collect()
    }

    /// All templates.
    pub fn iter(&self) -> impl Iterator<Item = &EmailTemplate> {
        self.templates.values()
    }

    /// Number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if the library holds no templates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Renders a named template for a lead, or `None` if the name is unknown.
    #[must_use]
    pub fn render_for_lead(
        &self,
        name: &str,
        lead: &Lead,
        extra: &TemplateVars,
    ) -> Option<RenderedEmail> {
        self.get(name).map(|t| t.render_for_lead(lead, extra))
    }
}

/// Template used when outreach generation fails; uses identity fields only.
#[must_use]
pub fn fallback_template() -> EmailTemplate {
    EmailTemplate::new(
        FALLBACK_TEMPLATE,
        TemplateType::ColdOutreach,
        "Quick question for ${company}",
        "Hi ${first_name},\n\n\
         I hope this email finds you well. I wanted to reach out because we've been helping \
         companies in ${industry} streamline their operations with AI-powered solutions.\n\n\
         Would you be open to a brief conversation about how we might help ${company}?\n\n\
         Best regards",
    )
    .with_description("Deterministic outreach used when drafting fails")
}

fn builtin_templates() -> Vec<EmailTemplate> {
    vec![
        fallback_template(),
        EmailTemplate::new(
            "cold_outreach_executive",
            TemplateType::ColdOutreach,
            "A thought on ${company}'s next stage of growth",
            "Hi ${first_name},\n\n\
             Teams in ${industry} that grow past ${company_size} people usually hit the same \
             wall: processes that worked at a smaller scale start costing real money.\n\n\
             We help ${role}s automate that busywork so growth doesn't mean more headcount.\n\n\
             Worth a short call to compare notes?\n\n\
             Best regards,\nThe Sales Team",
        )
        .with_description("Cold outreach for executives"),
        EmailTemplate::new(
            "cold_outreach_technical",
            TemplateType::ColdOutreach,
            "Automating the glue work in ${company}'s stack",
            "Hi ${first_name},\n\n\
             As ${role} at ${company} you likely own a lot of integration glue. Our platform \
             automates repetitive workflows and plugs into the tools you already run.\n\n\
             Happy to show a ten-minute demo if it's useful.\n\n\
             Cheers,\nThe Sales Team",
        )
        .with_description("Cold outreach for engineering leaders"),
        EmailTemplate::new(
            "follow_up_general",
            TemplateType::FollowUp,
            "Following up on ${company} and automation",
            "Hi ${first_name},\n\n\
             Circling back on my last note. What's the biggest operational bottleneck at \
             ${company} right now?\n\n\
             If the timing is wrong, just say so and I'll check back later.\n\n\
             Best,\nThe Sales Team",
        )
        .with_description("General follow-up"),
        EmailTemplate::new(
            "demo_request",
            TemplateType::DemoRequest,
            "15 minutes for ${company}?",
            "Hi ${first_name},\n\n\
             I'd like to walk you through how we handle ${industry}-specific workflows, with \
             results from similar companies.\n\n\
             Book any slot here: ${calendar_link}\n\n\
             Looking forward to it,\nThe Sales Team",
        )
        .with_description("Demo request"),
        EmailTemplate::new(
            "re_engagement",
            TemplateType::ReEngagement,
            "Still relevant for ${company}?",
            "Hi ${first_name},\n\n\
             I reached out a while back about automation at ${company}. If it's still on your \
             radar I'd love to reconnect; if not, let me know and I'll stop writing.\n\n\
             Best,\nThe Sales Team",
        )
        .with_description("Revive a cold lead"),
    ]
}
