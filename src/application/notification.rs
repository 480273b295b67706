//! Confirmation email composition.
//!
//! Builds the HTML confirmation for a freshly provisioned card. The same
//! HTML feeds the PDF keepsake on the premium tier; the PDF is attached to
//! the message when present.

use crate::domain::card::ProvisionedCard;
use crate::ports::{EmailAttachment, EmailMessage};

/// Subject line of the confirmation email.
const SUBJECT: &str = "Seu cartão está pronto! 💌";

/// Composes confirmation messages for provisioned cards.
pub struct NotificationComposer {
    frontend_base: String,
}

impl NotificationComposer {
    pub fn new(frontend_base: impl Into<String>) -> Self {
        Self {
            frontend_base: frontend_base.into(),
        }
    }

    /// Render the confirmation HTML for a card.
    ///
    /// Always carries the public URL and the access password; this is also
    /// the source document for the PDF keepsake.
    pub fn confirmation_html(&self, card: &ProvisionedCard) -> String {
        let url = card.public_url(&self.frontend_base);
        format!(
            concat!(
                "<html><body style=\"font-family: sans-serif;\">",
                "<h1>{title}</h1>",
                "<p>Seu cartão foi criado com sucesso!</p>",
                "<p>Acesse em: <a href=\"{url}\">{url}</a></p>",
                "<p>Senha de acesso: <strong>{password}</strong></p>",
                "<p>{message}</p>",
                "</body></html>"
            ),
            title = escape_html(&card.content.title),
            url = url,
            password = escape_html(&card.password),
            message = escape_html(&card.content.message),
        )
    }

    /// Compose the outbound message, attaching the PDF when one was rendered.
    pub fn compose(&self, card: &ProvisionedCard, pdf: Option<Vec<u8>>) -> EmailMessage {
        let message = EmailMessage::html(&card.email, SUBJECT, self.confirmation_html(card));

        match pdf {
            Some(bytes) => message.with_attachment(EmailAttachment {
                filename: format!("{}.pdf", card.slug),
                content_type: "application/pdf".to_string(),
                bytes,
            }),
            None => message,
        }
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::{CardContent, PlanTier, PublishedContent, PurchaseIntent};

    fn sample_card() -> ProvisionedCard {
        let intent = PurchaseIntent::new(
            None,
            "joao-e-maria".to_string(),
            "joao@example.com".to_string(),
            PlanTier::Premium,
            CardContent {
                title: "João & Maria".to_string(),
                message: "para sempre".to_string(),
                ..Default::default()
            },
        );
        let content = PublishedContent {
            title: intent.content.title.clone(),
            message: intent.content.message.clone(),
            ..Default::default()
        };
        ProvisionedCard::from_intent(&intent, content)
    }

    #[test]
    fn html_contains_url_and_password() {
        let composer = NotificationComposer::new("https://couplecard.app");
        let card = sample_card();

        let html = composer.confirmation_html(&card);

        assert!(html.contains("https://couplecard.app/joao-e-maria"));
        assert!(html.contains(&card.password));
    }

    #[test]
    fn html_escapes_user_text() {
        let composer = NotificationComposer::new("https://couplecard.app");
        let mut card = sample_card();
        card.content.message = "<script>alert(1)</script>".to_string();

        let html = composer.confirmation_html(&card);

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn compose_with_pdf_attaches_it() {
        let composer = NotificationComposer::new("https://couplecard.app");
        let card = sample_card();

        let message = composer.compose(&card, Some(vec![0x25, 0x50, 0x44, 0x46]));

        let attachment = message.attachment.expect("attachment");
        assert_eq!(attachment.filename, "joao-e-maria.pdf");
        assert_eq!(attachment.content_type, "application/pdf");
        assert!(!attachment.bytes.is_empty());
    }

    #[test]
    fn compose_without_pdf_has_no_attachment() {
        let composer = NotificationComposer::new("https://couplecard.app");
        let card = sample_card();

        let message = composer.compose(&card, None);

        assert!(message.attachment.is_none());
        assert_eq!(message.to, "joao@example.com");
        assert!(message.is_html);
    }
}
