//! Email configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Email configuration (SMTP)
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SMTP relay host
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    /// SMTP account username
    pub smtp_username: String,

    /// SMTP account password (app password)
    pub smtp_password: String,

    /// From email address
    #[serde(default = "default_from_email")]
    pub from_email: String,

    /// From name
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

impl EmailConfig {
    /// Get formatted "From" header value
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    /// Validate email configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.smtp_username.is_empty() {
            return Err(ValidationError::MissingRequired("SMTP_USERNAME"));
        }
        if self.smtp_password.is_empty() {
            return Err(ValidationError::MissingRequired("SMTP_PASSWORD"));
        }
        if !self.from_email.contains('@') {
            return Err(ValidationError::InvalidFromEmail);
        }
        Ok(())
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: default_from_email(),
            from_name: default_from_name(),
        }
    }
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_from_email() -> String {
    "contato@couplecard.app".to_string()
}

fn default_from_name() -> String {
    "Couplecard".to_string()
}
