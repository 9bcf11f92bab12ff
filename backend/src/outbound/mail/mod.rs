//! SMTP mail adapter built on lettre.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::domain::ports::{MailError, MailMessage, Mailer};

/// Errors raised while configuring the SMTP transport.
#[derive(Debug, thiserror::Error)]
#[error("smtp setup failed: {message}")]
pub struct MailSetupError {
    pub message: String,
}

impl MailSetupError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Mailer delivering through a pooled SMTP connection.
#[derive(Clone, Debug)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build the transport from an `smtp://` or `smtps://` URL and verify
    /// the server accepts a connection. The transport itself connects on
    /// first send, so an unreachable relay must fail here, at bind time.
    pub async fn from_url(url: &str, from: &str) -> Result<Self, MailSetupError> {
        let from = from
            .parse::<Mailbox>()
            .map_err(|err| MailSetupError::new(format!("invalid sender address: {err}")))?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::from_url(url)
            .map_err(|err| MailSetupError::new(err.to_string()))?
            .build();
        let accepted = transport
            .test_connection()
            .await
            .map_err(|err| MailSetupError::new(err.to_string()))?;
        if !accepted {
            return Err(MailSetupError::new("smtp server refused the connection test"));
        }
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        let to = message
            .to
            .as_str()
            .parse::<Mailbox>()
            .map_err(|err| MailError::new(format!("invalid recipient: {err}")))?;
        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&message.subject)
            .body(message.body.clone())
            .map_err(|err| MailError::new(err.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|err| MailError::new(err.to_string()))?;
        debug!(to = %message.to, subject = %message.subject, "mail delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn from_url_rejects_an_invalid_sender_address() {
        let err = SmtpMailer::from_url("smtp://127.0.0.1:1", "not-an-address")
            .await
            .expect_err("sender should not parse");
        assert!(err.message.contains("invalid sender"));
    }

    #[tokio::test]
    async fn from_url_fails_fast_when_relay_is_unreachable() {
        let err = SmtpMailer::from_url("smtp://127.0.0.1:1", "no-reply@example.com")
            .await
            .expect_err("nothing listens on port 1");
        assert!(!err.message.is_empty());
    }
}
