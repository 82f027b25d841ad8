//! Send collaborator: delivers a lead's drafted email.

use crate::config::Settings;
use crate::core::Lead;
use crate::errors::TransportError;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info};

/// Delivers one lead's drafted email.
///
/// Returns `true` only if the relay accepted the message. Implementations
/// never fail the run; delivery problems are logged and reported as `false`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends `lead.email_subject` / `lead.email_body` to `lead.email`.
    async fn send(&self, lead: &Lead) -> bool;
}

/// Plain-text delivery over an unauthenticated SMTP relay.
pub struct SmtpMailer {
    from: String,
    host: String,
    port: u16,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Creates a mailer for the configured relay.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.from_header(), &settings.smtp_host, settings.smtp_port)
    }

    /// Creates a mailer for `host:port` sending as `from`.
    #[must_use]
    pub fn new(from: impl Into<String>, host: &str, port: u16) -> Self {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port)
            .build();
        Self {
            from: from.into(),
            host: host.to_string(),
            port,
            transport,
        }
    }

    /// Builds the message for `lead`.
    ///
    /// # Errors
    ///
    /// `MissingDraft` if subject or body is absent, `Address` for an
    /// unparsable sender or recipient, `Build` if assembly fails.
    pub fn build_message(&self, lead: &Lead) -> Result<Message, TransportError> {
        let (Some(subject), Some(body)) = (
            lead.email_subject.as_deref().filter(|s| !s.is_empty()),
            lead.email_body.as_deref().filter(|b| !b.is_empty()),
        ) else {
            return Err(TransportError::MissingDraft(lead.email.clone()));
        };

        let from: Mailbox = parse_mailbox(&self.from)?;
        let to: Mailbox = parse_mailbox(&lead.email)?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| TransportError::Build(e.to_string()))
    }

    async fn deliver(&self, lead: &Lead) -> Result<(), TransportError> {
        let message = self.build_message(lead)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| TransportError::Smtp(e.to_string()))?;
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, TransportError> {
    address.parse().map_err(|e: lettre::address::AddressError| TransportError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("from", &self.from)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, lead: &Lead) -> bool {
        match self.deliver(lead).await {
            Ok(()) => {
                info!(lead = %lead.email, relay = %self.host, "Email accepted by relay");
                true
            }
            Err(e) => {
                error!(lead = %lead.email, error = %e, "Failed to send email");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_lead;

    fn drafted() -> Lead {
        let mut lead = sample_lead();
        lead.email_subject = Some("Quick question for Acme".into());
        lead.email_body = Some("Hi Jane,\n\nShort note.".into());
        lead
    }

    fn mailer() -> SmtpMailer {
        SmtpMailer::from_settings(&Settings::new("k"))
    }

    #[test]
    fn test_builds_plain_text_message() {
        let message = mailer().build_message(&drafted()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Sales Team"));
        assert!(raw.contains("<sales@yourcompany.com>"));
        assert!(raw.contains("To: jane@acme.com"));
        assert!(raw.contains("Subject: Quick question for Acme"));
        assert!(raw.contains("Content-Type: text/plain"));
    }

    #[test]
    fn test_missing_draft_is_rejected() {
        let err = mailer().build_message(&sample_lead()).unwrap_err();
        assert!(matches!(err, TransportError::MissingDraft(ref e) if e == "jane@acme.com"));
    }

    #[test]
    fn test_bad_recipient_is_rejected() {
        let mut lead = drafted();
        lead.email = "jane at acme".into();
        assert!(matches!(
            mailer().build_message(&lead),
            Err(TransportError::Address { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_relay_returns_false() {
        let mailer = SmtpMailer::new("Sales <sales@example.com>", "127.0.0.1", 1);
        assert!(!mailer.send(&drafted()).await);
    }

    #[tokio::test]
    async fn test_undrafted_lead_is_not_sent() {
        let mailer = SmtpMailer::new("Sales <sales@example.com>", "127.0.0.1", 1);
        assert!(!mailer.send(&sample_lead()).await);
    }
}
