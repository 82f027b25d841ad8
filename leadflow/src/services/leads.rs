//! CSV lead source and sink.

use crate::config::Settings;
use crate::core::{Lead, SendStatus, MAX_SCORE, MIN_SCORE};
use crate::errors::{InvalidLeadError, LeadflowError};
use crate::utils::{format_iso8601, parse_timestamp};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Column order of written files.
pub const COLUMNS: [&str; 15] = [
    "name",
    "email",
    "company",
    "role",
    "industry",
    "company_size",
    "website",
    "ai_persona",
    "priority",
    "priority_score",
    "enrichment_notes",
    "email_subject",
    "email_body",
    "email_sent_at",
    "email_status",
];

/// One CSV row as read. Every column is optional so that both raw input
/// files and processed output files can be parsed.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LeadRecord {
    name: Option<String>,
    email: Option<String>,
    company: Option<String>,
    role: Option<String>,
    industry: Option<String>,
    company_size: Option<String>,
    website: Option<String>,
    ai_persona: Option<String>,
    priority: Option<String>,
    priority_score: Option<String>,
    enrichment_notes: Option<String>,
    email_subject: Option<String>,
    email_body: Option<String>,
    email_sent_at: Option<String>,
    email_status: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required(row: usize, field: &str, value: Option<String>) -> Result<String, InvalidLeadError> {
    non_blank(value)
        .map(|v| v.trim().to_string())
        .ok_or_else(|| InvalidLeadError::new(row, field, "is empty"))
}

impl LeadRecord {
    /// Validates the row; `row` is the 1-based data row number.
    fn into_lead(self, row: usize) -> Result<Lead, InvalidLeadError> {
        let email = required(row, "email", self.email)?;
        if !email.contains('@') {
            return Err(InvalidLeadError::new(row, "email", "is not an email address"));
        }

        let mut lead = Lead::new(
            required(row, "name", self.name)?,
            email,
            required(row, "company", self.company)?,
            required(row, "role", self.role)?,
            required(row, "industry", self.industry)?,
            required(row, "company_size", self.company_size)?,
        );
        lead.website = non_blank(self.website);
        lead.ai_persona = non_blank(self.ai_persona);
        lead.enrichment_notes = non_blank(self.enrichment_notes);
        lead.email_subject = non_blank(self.email_subject);
        lead.email_body = non_blank(self.email_body);

        if let Some(priority) = non_blank(self.priority) {
            lead.priority = Some(
                priority
                    .parse()
                    .map_err(|reason: String| InvalidLeadError::new(row, "priority", reason))?,
            );
        }
        if let Some(score) = non_blank(self.priority_score) {
            let n: u8 = score.trim().parse().map_err(|_| {
                InvalidLeadError::new(row, "priority_score", format!("'{score}' is not a score"))
            })?;
            if !(MIN_SCORE..=MAX_SCORE).contains(&n) {
                return Err(InvalidLeadError::new(
                    row,
                    "priority_score",
                    format!("{n} is outside {MIN_SCORE}..={MAX_SCORE}"),
                ));
            }
            lead.priority_score = Some(n);
        }
        if let Some(sent_at) = non_blank(self.email_sent_at) {
            lead.email_sent_at = Some(
                parse_timestamp(&sent_at)
                    .map_err(|e| InvalidLeadError::new(row, "email_sent_at", e.to_string()))?,
            );
        }
        if let Some(status) = non_blank(self.email_status) {
            lead.email_status = status
                .parse::<SendStatus>()
                .map_err(|reason| InvalidLeadError::new(row, "email_status", reason))?;
        }
        Ok(lead)
    }
}

fn to_row(lead: &Lead) -> [String; 15] {
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    [
        lead.name.clone(),
        lead.email.clone(),
        lead.company.clone(),
        lead.role.clone(),
        lead.industry.clone(),
        lead.company_size.clone(),
        opt(&lead.website),
        opt(&lead.ai_persona),
        lead.priority.map(|p| p.to_string()).unwrap_or_default(),
        lead.priority_score.map(|s| s.to_string()).unwrap_or_default(),
        opt(&lead.enrichment_notes),
        opt(&lead.email_subject),
        opt(&lead.email_body),
        lead.email_sent_at.as_ref().map(format_iso8601).unwrap_or_default(),
        lead.email_status.to_string(),
    ]
}

/// Reads leads from `path`.
///
/// # Errors
///
/// `NotFound` if the file does not exist, `InvalidLead` for the first row that
/// fails validation, `Csv` for malformed CSV.
pub fn read_leads(path: &Path) -> Result<Vec<Lead>, LeadflowError> {
    if !path.exists() {
        return Err(LeadflowError::NotFound(path.display().to_string()));
    }

    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_path(path)?;
    let mut leads = Vec::new();
    for (i, record) in reader.deserialize::<LeadRecord>().enumerate() {
        leads.push(record?.into_lead(i + 1)?);
    }

    info!(count = leads.len(), path = %path.display(), "Read leads");
    Ok(leads)
}

/// Writes every lead field to `path`, creating parent directories.
///
/// The header row is written even when `leads` is empty.
///
/// # Errors
///
/// `Io` or `Csv` if the file cannot be written.
pub fn write_leads(path: &Path, leads: &[Lead]) -> Result<(), LeadflowError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(COLUMNS)?;
    for lead in leads {
        writer.write_record(to_row(lead))?;
    }
    writer.flush()?;

    info!(count = leads.len(), path = %path.display(), "Wrote processed leads");
    Ok(())
}

/// The configured input and output files.
#[derive(Debug, Clone)]
pub struct LeadStore {
    input_path: PathBuf,
    output_path: PathBuf,
}

impl LeadStore {
    /// Creates a store over explicit paths.
    #[must_use]
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
        }
    }

    /// Creates a store over the configured paths.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.leads_input_path, &settings.leads_output_path)
    }

    /// Input file path.
    #[must_use]
    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    /// Output file path.
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Reads the input leads.
    pub fn read_input(&self) -> Result<Vec<Lead>, LeadflowError> {
        read_leads(&self.input_path).inspect_err(|e| {
            error!(path = %self.input_path.display(), error = %e, "Error reading leads");
        })
    }

    /// Reads the last processed output.
    pub fn read_processed(&self) -> Result<Vec<Lead>, LeadflowError> {
        read_leads(&self.output_path)
    }

    /// Replaces the processed output.
    pub fn write_processed(&self, leads: &[Lead]) -> Result<(), LeadflowError> {
        write_leads(&self.output_path, leads).inspect_err(|e| {
            error!(path = %self.output_path.display(), error = %e, "Error writing leads");
        })
    }
}
