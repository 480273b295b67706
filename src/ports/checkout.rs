//! CheckoutProvider port - hosted payment session creation.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the payment provider.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("provider request failed: {0}")]
    Request(String),

    /// Provider returned a non-success status for the session.
    #[error("session creation rejected: {0}")]
    Rejected(String),

    #[error("provider response could not be decoded: {0}")]
    Decode(String),
}

/// Request to create a hosted checkout session.
#[derive(Debug, Clone)]
pub struct CreateSessionRequest {
    /// Provider price id selected from the plan tier.
    pub price_id: String,

    /// Buyer email prefilled on the payment page.
    pub customer_email: String,

    /// Where the provider redirects after successful payment.
    pub success_url: String,

    /// Where the provider redirects when the buyer abandons.
    pub cancel_url: String,

    /// Correlation fields echoed back on the completed-checkout event.
    pub metadata: HashMap<String, String>,
}

/// Created session reference returned to the client.
#[derive(Debug, Clone)]
pub struct CheckoutSessionRef {
    /// Provider session id (cs_xxx format) used by the frontend redirect.
    pub session_id: String,
}

/// Port for creating hosted checkout sessions.
#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<CheckoutSessionRef, CheckoutError>;
}
