//! Priority tier and send status enums.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Priority tier assigned by the scoring stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Priority {
    /// Decision maker at a well-fitting company.
    High,
    /// Worth contacting; also the fallback tier.
    Medium,
    /// Unlikely to convert.
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    /// Accepts the tier name in any letter case, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(format!("expected one of High, Medium, Low, got '{other}'")),
        }
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Delivery state of a lead's outreach email.
///
/// Starts as `Pending` and is set exactly once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SendStatus {
    /// Not yet processed.
    #[default]
    Pending,
    /// Drafted but sending was disabled for the run.
    Draft,
    /// Handed to the relay successfully.
    Sent,
    /// The relay could not deliver the message.
    Failed,
    /// Processing the lead hit an unexpected fault.
    Error,
}

impl fmt::Display for SendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Draft => write!(f, "draft"),
            Self::Sent => write!(f, "sent"),
            Self::Failed => write!(f, "failed"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl FromStr for SendStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(Self::Pending),
            "draft" => Ok(Self::Draft),
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown send status '{other}'")),
        }
    }
}

impl SendStatus {
    /// Returns true once the run has decided this lead's outcome.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}
