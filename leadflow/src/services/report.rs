//! Campaign statistics and the markdown summary report.

use crate::config::Settings;
use crate::core::{CampaignStats, Lead, Priority, SendStatus};
use crate::utils::{display_stamp, file_stamp, now_utc, Timestamp};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{error, info};

const TOP_N: usize = 5;

/// The `TOP_N` most common values, most common first; ties keep first-seen order.
fn most_common<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| v == value) {
            Some((_, n)) => *n += 1,
            None => counts.push((value.to_string(), 1)),
        }
    }
    // stable sort keeps first appearance among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(TOP_N);
    counts
}

#[allow(clippy::cast_precision_loss)]
fn pct(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Computes statistics over processed leads.
#[must_use]
pub fn generate_stats(leads: &[Lead]) -> CampaignStats {
    let count_status = |s: SendStatus| leads.iter().filter(|l| l.email_status == s).count();
    let count_priority = |p: Priority| leads.iter().filter(|l| l.priority == Some(p)).count();

    CampaignStats {
        total_leads: leads.len(),
        emails_sent: count_status(SendStatus::Sent),
        emails_failed: count_status(SendStatus::Failed),
        high_priority: count_priority(Priority::High),
        medium_priority: count_priority(Priority::Medium),
        low_priority: count_priority(Priority::Low),
        top_personas: most_common(leads.iter().filter_map(|l| l.ai_persona.as_deref())),
        top_industries: most_common(leads.iter().map(|l| l.industry.as_str())),
    }
}

/// Markdown report over one run's statistics.
struct Report<'a> {
    stats: &'a CampaignStats,
    generated_at: &'a Timestamp,
    path: &'a Path,
}

impl Report<'_> {
    fn write_ranking(f: &mut fmt::Formatter<'_>, entries: &[(String, usize)], total: usize) -> fmt::Result {
        for (value, count) in entries {
            writeln!(f, "- **{value}**: {count} leads ({:.1}%)", pct(*count, total))?;
        }
        writeln!(f, "\n---\n")
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats;
        let total = stats.total_leads;

        writeln!(f, "# AI Sales Campaign Summary Report")?;
        writeln!(f, "**Generated:** {}\n\n---\n", display_stamp(self.generated_at))?;

        writeln!(f, "## Campaign Overview\n")?;
        writeln!(f, "| Metric | Count | Percentage |")?;
        writeln!(f, "|--------|-------|------------|")?;
        writeln!(f, "| **Total Leads Processed** | {total} | 100% |")?;
        writeln!(
            f,
            "| **Emails Successfully Sent** | {} | {:.1}% |",
            stats.emails_sent,
            pct(stats.emails_sent, total)
        )?;
        writeln!(
            f,
            "| **Emails Failed** | {} | {:.1}% |\n\n---\n",
            stats.emails_failed,
            pct(stats.emails_failed, total)
        )?;

        writeln!(f, "## Lead Prioritization\n")?;
        writeln!(f, "| Priority | Count | Percentage |")?;
        writeln!(f, "|----------|-------|------------|")?;
        for (label, count) in [
            ("High", stats.high_priority),
            ("Medium", stats.medium_priority),
            ("Low", stats.low_priority),
        ] {
            writeln!(f, "| **{label} Priority** | {count} | {:.1}% |", pct(count, total))?;
        }
        writeln!(f, "\n---\n")?;

        writeln!(f, "## Top Buyer Personas Identified\n")?;
        Self::write_ranking(f, &stats.top_personas, total)?;

        writeln!(f, "## Industry Breakdown\n")?;
        Self::write_ranking(f, &stats.top_industries, total)?;

        let top_persona = stats.top_personas.first().map_or("N/A", |(p, _)| p.as_str());
        let top_industry = stats.top_industries.first().map_or("N/A", |(i, _)| i.as_str());
        writeln!(f, "## Insights\n\n### Key Findings:")?;
        writeln!(
            f,
            "1. **High-Value Segment**: {} leads identified as high-priority based on role, company size, and industry fit",
            stats.high_priority
        )?;
        writeln!(f, "2. **Top Persona**: {top_persona} represents the largest buyer persona group")?;
        writeln!(f, "3. **Industry Focus**: {top_industry} industry shows strongest representation\n")?;
        writeln!(f, "### Recommendations:")?;
        writeln!(f, "- Follow up quickly with high-priority leads")?;
        writeln!(f, "- Personalize messaging based on identified buyer personas")?;
        writeln!(f, "- Use industry-specific value propositions for concentrated segments\n\n---\n")?;
        writeln!(f, "**Report Location:** `{}`", self.path.display())
    }
}

/// Renders the markdown report.
#[must_use]
pub fn render_report(stats: &CampaignStats, generated_at: &Timestamp, report_path: &Path) -> String {
    Report {
        stats,
        generated_at,
        path: report_path,
    }
    .to_string()
}

/// Writes campaign reports into a directory.
#[derive(Debug, Clone)]
pub struct ReportService {
    output_dir: PathBuf,
}

impl ReportService {
    /// Creates a service writing into `output_dir`.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Creates a service writing into the configured report directory.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.report_output_dir)
    }

    /// Computes statistics over processed leads.
    #[must_use]
    pub fn generate_stats(&self, leads: &[Lead]) -> CampaignStats {
        generate_stats(leads)
    }

    /// Renders and writes `campaign_YYYYMMDD_HHMMSS.md`, returning its path.
    ///
    /// A write failure is logged and the intended path is still returned.
    pub async fn generate_report(&self, leads: &[Lead]) -> PathBuf {
        let stats = generate_stats(leads);
        let now = now_utc();
        let path = self
            .output_dir
            .join(format!("campaign_{}.md", file_stamp(&now)));
        let report = render_report(&stats, &now, &path);

        let written = match tokio::fs::create_dir_all(&self.output_dir).await {
            Ok(()) => tokio::fs::write(&path, report).await,
            Err(e) => Err(e),
        };
        match written {
            Ok(()) => info!(path = %path.display(), "Report generated"),
            Err(e) => error!(path = %path.display(), error = %e, "Failed to write report"),
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_leads;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn lead(persona: Option<&str>, industry: &str, priority: Priority, status: SendStatus) -> Lead {
        let mut lead = Lead::new("A B", "a@b.co", "Co", "CEO", industry, "1-10");
        lead.ai_persona = persona.map(str::to_string);
        lead.priority = Some(priority);
        lead.email_status = status;
        lead
    }

    #[test]
    fn test_stats_counts_and_rankings() {
        let leads = vec![
            lead(Some("Budget Holder"), "Retail", Priority::High, SendStatus::Sent),
            lead(Some("Champion"), "SaaS", Priority::Low, SendStatus::Failed),
            lead(Some("Champion"), "SaaS", Priority::High, SendStatus::Sent),
            lead(None, "Retail", Priority::Medium, SendStatus::Error),
            lead(Some("Budget Holder"), "Fintech", Priority::Medium, SendStatus::Draft),
        ];

        let stats = generate_stats(&leads);
        assert_eq!(stats.total_leads, 5);
        assert_eq!((stats.emails_sent, stats.emails_failed), (2, 1));
        assert_eq!(
            (stats.high_priority, stats.medium_priority, stats.low_priority),
            (2, 2, 1)
        );
        assert_eq!(
            stats.top_personas,
            vec![("Budget Holder".to_string(), 2), ("Champion".to_string(), 2)]
        );
        assert_eq!(
            stats.top_industries,
            vec![
                ("Retail".to_string(), 2),
                ("SaaS".to_string(), 2),
                ("Fintech".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_top_lists_are_capped() {
        let leads: Vec<Lead> = (0..8)
            .map(|i| {
                let industry = format!("Industry {i}");
                lead(None, &industry, Priority::Low, SendStatus::Sent)
            })
            .collect();
        assert_eq!(generate_stats(&leads).top_industries.len(), 5);
    }

    #[test]
    fn test_empty_run_renders_zero_percent() {
        let report = render_report(&generate_stats(&[]), &now_utc(), Path::new("r.md"));
        assert!(report.contains("| **Emails Successfully Sent** | 0 | 0.0% |"));
        assert!(report.contains("**Top Persona**: N/A"));
        assert!(!report.contains("NaN"));
    }

    #[test]
    fn test_report_sections_in_order() {
        let leads = vec![
            lead(Some("Champion"), "SaaS", Priority::High, SendStatus::Sent),
            lead(Some("Champion"), "Retail", Priority::Low, SendStatus::Failed),
        ];
        let report = render_report(&generate_stats(&leads), &now_utc(), Path::new("out/r.md"));

        let positions: Vec<usize> = [
            "# AI Sales Campaign Summary Report",
            "## Campaign Overview",
            "## Lead Prioritization",
            "## Top Buyer Personas Identified",
            "## Industry Breakdown",
            "## Insights",
            "### Recommendations:",
        ]
        .iter()
        .map(|heading| report.find(heading).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        assert!(report.contains("| **High Priority** | 1 | 50.0% |"));
        assert!(report.contains("- **Champion**: 2 leads (100.0%)"));
        assert!(report.contains("- **SaaS**: 1 leads (50.0%)\n- **Retail**: 1 leads (50.0%)"));
        assert!(report.ends_with("**Report Location:** `out/r.md`\n"));
    }

    #[test]
    fn test_report_written_to_stamped_file() {
        let dir = TempDir::new().unwrap();
        let service = ReportService::new(dir.path().join("reports"));

        let path = tokio_test::block_on(service.generate_report(&sample_leads(2)));

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("campaign_") && name.ends_with(".md"));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("| **Total Leads Processed** | 2 | 100% |"));
        assert!(contents.contains("- **Fintech**: 2 leads (100.0%)"));
    }

    #[tokio::test]
    async fn test_write_failure_still_returns_path() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, "x").unwrap();

        let path = ReportService::new(&blocker).generate_report(&[]).await;
        assert!(path.starts_with(&blocker));
        assert!(!path.exists());
    }
}
