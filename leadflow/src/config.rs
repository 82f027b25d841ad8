//! Application settings.
//!
//! Settings are loaded once at start-up and handed to components as
//! `Arc<Settings>`. Every field can be overridden by an environment variable
//! named after the field in upper case (`LLM_MODEL`, `SMTP_PORT`, ...). A `.env`
//! file in the working directory is read first when present.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Process-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Display name of the service.
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Service version string.
    #[serde(default = "default_app_version")]
    pub app_version: String,
    /// Deployment environment label.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// API key for the text-generation service.
    #[serde(skip_serializing)]
    pub llm_api_key: String,
    /// Base URL of an OpenAI-compatible chat completions API.
    #[serde(default = "default_llm_base_url")]
    pub llm_base_url: String,
    /// Model identifier sent with every request.
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    /// Sampling temperature.
    #[serde(default = "default_llm_temperature")]
    pub llm_temperature: f32,
    /// Maximum output tokens per call.
    #[serde(default = "default_llm_max_tokens")]
    pub llm_max_tokens: u32,
    /// Per-call timeout in seconds.
    #[serde(default = "default_llm_timeout")]
    pub llm_timeout_seconds: u64,

    /// SMTP relay host.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// Sender address.
    #[serde(default = "default_smtp_from_email")]
    pub smtp_from_email: String,
    /// Sender display name.
    #[serde(default = "default_smtp_from_name")]
    pub smtp_from_name: String,

    /// CSV file leads are read from.
    #[serde(default = "default_leads_input_path")]
    pub leads_input_path: String,
    /// CSV file processed leads are written to.
    #[serde(default = "default_leads_output_path")]
    pub leads_output_path: String,
    /// Directory campaign reports are written to.
    #[serde(default = "default_report_output_dir")]
    pub report_output_dir: String,

    /// Pause between leads, in milliseconds.
    #[serde(default = "default_lead_delay_ms")]
    pub lead_delay_ms: u64,
    /// Default log filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_app_name() -> String {
    "AI Sales Campaign CRM".to_string()
}

fn default_app_version() -> String {
    "1.0.0".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_llm_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_llm_model() -> String {
    "mixtral-8x7b-32768".to_string()
}

fn default_llm_temperature() -> f32 {
    0.7
}

fn default_llm_max_tokens() -> u32 {
    1024
}

fn default_llm_timeout() -> u64 {
    60
}

fn default_smtp_host() -> String {
    "mailhog".to_string()
}

fn default_smtp_port() -> u16 {
    1025
}

fn default_smtp_from_email() -> String {
    "sales@yourcompany.com".to_string()
}

fn default_smtp_from_name() -> String {
    "Sales Team".to_string()
}

fn default_leads_input_path() -> String {
    "./data/leads.csv".to_string()
}

fn default_leads_output_path() -> String {
    "./data/leads_processed.csv".to_string()
}

fn default_report_output_dir() -> String {
    "./reports".to_string()
}

fn default_lead_delay_ms() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

impl Settings {
    /// Creates settings with defaults and the given API key.
    #[must_use]
    pub fn new(llm_api_key: impl Into<String>) -> Self {
        Self {
            app_name: default_app_name(),
            app_version: default_app_version(),
            environment: default_environment(),
            llm_api_key: llm_api_key.into(),
            llm_base_url: default_llm_base_url(),
            llm_model: default_llm_model(),
            llm_temperature: default_llm_temperature(),
            llm_max_tokens: default_llm_max_tokens(),
            llm_timeout_seconds: default_llm_timeout(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_from_email: default_smtp_from_email(),
            smtp_from_name: default_smtp_from_name(),
            leads_input_path: default_leads_input_path(),
            leads_output_path: default_leads_output_path(),
            report_output_dir: default_report_output_dir(),
            lead_delay_ms: default_lead_delay_ms(),
            log_level: default_log_level(),
            bind_addr: default_bind_addr(),
        }
    }

    /// Loads settings from `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through an arbitrary variable lookup.
    ///
    /// `lookup` receives upper-case variable names. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("LLM_API_KEY")
            .or_else(|| get("GROQ_API_KEY"))
            .ok_or_else(|| ConfigError::Missing("LLM_API_KEY".to_string()))?;

        let mut settings = Self::new(api_key);

        override_string(&get, "APP_NAME", &mut settings.app_name);
        override_string(&get, "APP_VERSION", &mut settings.app_version);
        override_string(&get, "ENVIRONMENT", &mut settings.environment);
        override_string(&get, "LLM_BASE_URL", &mut settings.llm_base_url);
        override_string(&get, "LLM_MODEL", &mut settings.llm_model);
        override_parsed(&get, "LLM_TEMPERATURE", &mut settings.llm_temperature)?;
        override_parsed(&get, "LLM_MAX_TOKENS", &mut settings.llm_max_tokens)?;
        override_parsed(&get, "LLM_TIMEOUT_SECONDS", &mut settings.llm_timeout_seconds)?;
        override_string(&get, "SMTP_HOST", &mut settings.smtp_host);
        override_parsed(&get, "SMTP_PORT", &mut settings.smtp_port)?;
        override_string(&get, "SMTP_FROM_EMAIL", &mut settings.smtp_from_email);
        override_string(&get, "SMTP_FROM_NAME", &mut settings.smtp_from_name);
        override_string(&get, "LEADS_INPUT_PATH", &mut settings.leads_input_path);
        override_string(&get, "LEADS_OUTPUT_PATH", &mut settings.leads_output_path);
        override_string(&get, "REPORT_OUTPUT_DIR", &mut settings.report_output_dir);
        override_parsed(&get, "LEAD_DELAY_MS", &mut settings.lead_delay_ms)?;
        override_string(&get, "LOG_LEVEL", &mut settings.log_level);
        override_string(&get, "BIND_ADDR", &mut settings.bind_addr);

        Ok(settings)
    }

    /// Sets the inter-lead delay.
    #[must_use]
    pub fn with_lead_delay_ms(mut self, millis: u64) -> Self {
        self.lead_delay_ms = millis;
        self
    }

    /// Sets the CSV and report locations.
    #[must_use]
    pub fn with_paths(
        mut self,
        input: impl Into<String>,
        output: impl Into<String>,
        report_dir: impl Into<String>,
    ) -> Self {
        self.leads_input_path = input.into();
        self.leads_output_path = output.into();
        self.report_output_dir = report_dir.into();
        self
    }

    /// Pause inserted between leads.
    #[must_use]
    pub fn lead_delay(&self) -> Duration {
        Duration::from_millis(self.lead_delay_ms)
    }

    /// Timeout applied to each text-generation call.
    #[must_use]
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_seconds)
    }

    /// `From:` header value, e.g. `Sales Team <sales@yourcompany.com>`.
    #[must_use]
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.smtp_from_name, self.smtp_from_email)
    }
}

fn override_string<G>(get: &G, key: &str, target: &mut String)
where
    G: Fn(&str) -> Option<String>,
{
    if let Some(value) = get(key) {
        *target = value;
    }
}

fn override_parsed<G, T>(get: &G, key: &str, target: &mut T) -> Result<(), ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(value) = get(key) {
        *target = value.trim().parse().map_err(|_| ConfigError::Invalid {
            key: key.to_string(),
            value,
        })?;
    }
    Ok(())
}
