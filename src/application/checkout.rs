//! CreateCheckoutHandler - stages a purchase intent and opens a hosted
//! checkout session.
//!
//! The intent is written FIRST: if staging fails there is no session, so a
//! payment can never complete without a resolvable intent behind it.

use std::sync::Arc;

use axum::http::StatusCode;
use thiserror::Error;
use tracing::info;

use crate::domain::card::{CardContent, PlanTier, PurchaseIntent};
use crate::domain::payment::CheckoutMetadata;
use crate::ports::{
    CardStore, CheckoutError, CheckoutProvider, CreateSessionRequest, StoreError,
};

/// Errors opening a checkout session.
#[derive(Debug, Error)]
pub enum CheckoutFlowError {
    /// Staging the purchase intent failed; no session was created.
    #[error("intent could not be staged: {0}")]
    Staging(#[from] StoreError),

    /// The payment provider refused or failed to create the session.
    #[error("session creation failed: {0}")]
    SessionCreation(#[from] CheckoutError),
}

impl CheckoutFlowError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CheckoutFlowError::Staging(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CheckoutFlowError::SessionCreation(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Command to open a checkout session for a draft card.
#[derive(Debug, Clone)]
pub struct CreateCheckoutCommand {
    pub user_id: Option<String>,
    pub custom_url: String,
    pub email: String,
    pub plan: PlanTier,
    pub content: CardContent,
}

/// Price ids and redirect base used when building sessions.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub basic_price_id: String,
    pub premium_price_id: String,
    pub frontend_base: String,
}

impl CheckoutSettings {
    fn price_for(&self, plan: PlanTier) -> &str {
        match plan {
            PlanTier::Basic => &self.basic_price_id,
            PlanTier::Premium => &self.premium_price_id,
        }
    }
}

/// Handler for `/create-checkout-session`.
pub struct CreateCheckoutHandler {
    card_store: Arc<dyn CardStore>,
    provider: Arc<dyn CheckoutProvider>,
    settings: CheckoutSettings,
}

impl CreateCheckoutHandler {
    pub fn new(
        card_store: Arc<dyn CardStore>,
        provider: Arc<dyn CheckoutProvider>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            card_store,
            provider,
            settings,
        }
    }

    /// Stage the intent, then create the provider session.
    ///
    /// Returns the provider session id for the frontend redirect.
    pub async fn handle(&self, cmd: CreateCheckoutCommand) -> Result<String, CheckoutFlowError> {
        let intent = PurchaseIntent::new(
            cmd.user_id,
            cmd.custom_url,
            cmd.email,
            cmd.plan,
            cmd.content,
        );

        self.card_store.save_intent(&intent).await?;

        let metadata = CheckoutMetadata {
            intent_id: intent.id,
            user_id: intent.user_id.clone(),
            custom_url: intent.slug.clone(),
            email: intent.email.clone(),
            plan: intent.plan,
        };

        let frontend = self.settings.frontend_base.trim_end_matches('/');
        let request = CreateSessionRequest {
            price_id: self.settings.price_for(intent.plan).to_string(),
            customer_email: intent.email.clone(),
            success_url: format!("{}/dashboard?success=true&slug={}", frontend, intent.slug),
            cancel_url: format!("{}/dashboard?canceled=true", frontend),
            metadata: metadata.to_map(),
        };

        let session = self.provider.create_session(request).await?;

        info!(
            intent_id = %intent.id,
            slug = %intent.slug,
            plan = intent.plan.as_str(),
            session_id = %session.session_id,
            "checkout session created"
        );

        Ok(session.session_id)
    }
}
