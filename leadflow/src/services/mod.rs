//! Collaborators around the pipeline: lead files, mail delivery, reports.

mod email;
mod leads;
mod report;

pub use email::{Mailer, SmtpMailer};
#[cfg(test)]
pub use email::MockMailer;
pub use leads::{read_leads, write_leads, LeadStore, COLUMNS};
pub use report::{generate_stats, render_report, ReportService};
