//! Stripe checkout adapter.
//!
//! Implements `CheckoutProvider` against the Stripe REST API. Sessions are
//! created with a form POST; the API key is held as a `SecretString` and
//! sent via basic auth.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::warn;

use crate::ports::{CheckoutError, CheckoutProvider, CheckoutSessionRef, CreateSessionRequest};

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for the Stripe API (default: https://api.stripe.com).
    api_base_url: String,
}

impl StripeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: "https://api.stripe.com".to_string(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Checkout session response from Stripe.
#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
}

/// Stripe implementation of `CheckoutProvider`.
pub struct StripeCheckoutAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripeCheckoutAdapter {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CheckoutProvider for StripeCheckoutAdapter {
    async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<CheckoutSessionRef, CheckoutError> {
        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let mut params = vec![
            ("mode", "payment".to_string()),
            ("customer_email", request.customer_email),
            ("line_items[0][price]", request.price_id),
            ("line_items[0][quantity]", "1".to_string()),
            ("success_url", request.success_url),
            ("cancel_url", request.cancel_url),
        ];

        let metadata_params: Vec<(String, String)> = request
            .metadata
            .into_iter()
            .map(|(key, value)| (format!("metadata[{}]", key), value))
            .collect();
        for (key, value) in &metadata_params {
            params.push((key.as_str(), value.clone()));
        }

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(|e| CheckoutError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!(%status, error = %error_text, "Stripe rejected session creation");
            return Err(CheckoutError::Rejected(format!(
                "{}: {}",
                status, error_text
            )));
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| CheckoutError::Decode(e.to_string()))?;

        Ok(CheckoutSessionRef {
            session_id: session.id,
        })
    }
}
