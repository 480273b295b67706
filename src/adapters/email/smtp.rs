//! SMTP implementation of the `Mailer` port.
//!
//! Wraps a lettre async transport. Messages with an attachment go out as
//! multipart/mixed with the HTML part first.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::EmailConfig;
use crate::ports::{EmailMessage, MailError, Mailer};

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build the relay transport from config. Fails when the relay host or
    /// the sender address is invalid.
    pub fn new(config: &EmailConfig) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| MailError::Build(e.to_string()))?
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();

        let from = config
            .from_header()
            .parse()
            .map_err(|e| MailError::Build(format!("invalid sender: {}", e)))?;

        Ok(Self { transport, from })
    }

    fn build_message(&self, message: &EmailMessage) -> Result<Message, MailError> {
        let to = message
            .to
            .parse()
            .map_err(|e| MailError::Build(format!("invalid recipient: {}", e)))?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&message.subject);

        let body_part = if message.is_html {
            SinglePart::html(message.body.clone())
        } else {
            SinglePart::plain(message.body.clone())
        };

        let built = match &message.attachment {
            Some(attachment) => {
                let content_type = attachment
                    .content_type
                    .parse::<ContentType>()
                    .map_err(|e| MailError::Build(format!("invalid content type: {}", e)))?;
                let part = Attachment::new(attachment.filename.clone())
                    .body(attachment.bytes.clone(), content_type);

                builder.multipart(MultiPart::mixed().singlepart(body_part).singlepart(part))
            }
            None => builder.singlepart(body_part),
        };

        built.map_err(|e| MailError::Build(e.to_string()))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        let email = self.build_message(&message)?;

        self.transport
            .send(email)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(())
    }
}
