//! Mailer port - outbound email with optional attachment.

use async_trait::async_trait;
use thiserror::Error;

/// Errors handing a message to the mail transport.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("message could not be built: {0}")]
    Build(String),

    #[error("transport failed: {0}")]
    Transport(String),
}

/// A binary attachment on an outbound message.
#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// An outbound email message.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
    /// When false the body is sent as plain text.
    pub is_html: bool,
    pub attachment: Option<EmailAttachment>,
}

impl EmailMessage {
    /// HTML message without attachment.
    pub fn html(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            is_html: true,
            attachment: None,
        }
    }

    /// Plain-text message without attachment.
    pub fn text(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            is_html: false,
            ..Self::html(to, subject, body)
        }
    }

    pub fn with_attachment(mut self, attachment: EmailAttachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// Port for the outbound mail transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError>;
}
