//! Request and response DTOs for the HTTP API.
//!
//! Wire field names are camelCase to match the frontend client.

use serde::{Deserialize, Serialize};

use crate::domain::card::CardContent;

/// POST /create-checkout-session request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    /// Buyer account id when signed in.
    #[serde(default)]
    pub user_id: Option<String>,

    /// Slug the card will be served under.
    pub custom_url: String,

    /// Plan name; "basic" or anything else for premium.
    pub plan: String,

    /// Buyer email for the confirmation.
    pub email: String,

    /// Draft card content with embedded media.
    pub site_data: CardContent,
}

/// POST /create-checkout-session response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session_id: String,
}

/// POST /webhook acknowledgment.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

impl WebhookAck {
    pub fn ok() -> Self {
        Self { received: true }
    }
}

/// POST /send-email request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    pub to: String,
    pub subject: String,
    pub body: String,
    #[serde(default = "default_is_html")]
    pub is_html: bool,
}

fn default_is_html() -> bool {
    true
}

/// POST /send-email response.
#[derive(Debug, Serialize)]
pub struct SendEmailResponse {
    pub message: String,
}

/// Standard error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}
