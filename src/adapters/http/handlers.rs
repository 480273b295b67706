//! HTTP handlers wiring axum routes to application handlers.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::{error, warn};

use crate::application::{
    CheckoutFlowError, CheckoutSettings, CreateCheckoutCommand, CreateCheckoutHandler,
    ProvisionCardHandler,
};
use crate::domain::card::PlanTier;
use crate::domain::payment::{ProvisionError, VerifyError, WebhookVerifier};
use crate::ports::{
    BlobStore, CardStore, CheckoutProvider, DocumentRenderer, EmailMessage, MailError, Mailer,
    ProcessedEventLog,
};

use super::dto::{
    CheckoutResponse, CreateCheckoutRequest, ErrorResponse, SendEmailRequest, SendEmailResponse,
    WebhookAck,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state, cloned per request; dependencies are
/// Arc-wrapped adapters built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub card_store: Arc<dyn CardStore>,
    pub blob_store: Arc<dyn BlobStore>,
    pub checkout_provider: Arc<dyn CheckoutProvider>,
    pub renderer: Arc<dyn DocumentRenderer>,
    pub mailer: Arc<dyn Mailer>,
    pub event_log: Arc<dyn ProcessedEventLog>,
    pub verifier: Arc<WebhookVerifier>,
    pub checkout_settings: CheckoutSettings,
}

impl AppState {
    /// Create handlers on demand from the shared state.
    pub fn create_checkout_handler(&self) -> CreateCheckoutHandler {
        CreateCheckoutHandler::new(
            self.card_store.clone(),
            self.checkout_provider.clone(),
            self.checkout_settings.clone(),
        )
    }

    pub fn provision_handler(&self) -> ProvisionCardHandler {
        ProvisionCardHandler::new(
            self.card_store.clone(),
            self.blob_store.clone(),
            self.renderer.clone(),
            self.mailer.clone(),
            self.event_log.clone(),
            self.checkout_settings.frontend_base.clone(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /create-checkout-session - stage an intent and open a session.
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(request): Json<CreateCheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.create_checkout_handler();
    let cmd = CreateCheckoutCommand {
        user_id: request.user_id,
        custom_url: request.custom_url,
        email: request.email,
        plan: PlanTier::parse(&request.plan),
        content: request.site_data,
    };

    let session_id = handler.handle(cmd).await?;

    Ok(Json(CheckoutResponse { session_id }))
}

/// POST /webhook - verified payment provider notifications.
///
/// The raw body bytes feed signature verification untouched; axum's `Bytes`
/// extractor guarantees no re-serialization happens first.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::MissingSignature)?;

    let event = state.verifier.verify_and_parse(&body, signature)?;

    let handler = state.provision_handler();
    handler.handle(event).await?;

    Ok(Json(WebhookAck::ok()))
}

/// POST /send-email - manual passthrough to the mail transport.
pub async fn send_email(
    State(state): State<AppState>,
    Json(request): Json<SendEmailRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = if request.is_html {
        EmailMessage::html(request.to, request.subject, request.body)
    } else {
        EmailMessage::text(request.to, request.subject, request.body)
    };

    state.mailer.send(message).await?;

    Ok(Json(SendEmailResponse {
        message: "E-mail enviado com sucesso!".to_string(),
    }))
}

/// GET /health - liveness probe.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type converting domain errors to HTTP responses.
///
/// The status codes drive the payment provider's retry behavior, so the
/// mapping defers to each error's own `status_code()`.
#[derive(Debug)]
pub enum ApiError {
    MissingSignature,
    Verify(VerifyError),
    Provision(ProvisionError),
    Checkout(CheckoutFlowError),
    Mail(MailError),
}

impl From<VerifyError> for ApiError {
    fn from(err: VerifyError) -> Self {
        Self::Verify(err)
    }
}

impl From<ProvisionError> for ApiError {
    fn from(err: ProvisionError) -> Self {
        Self::Provision(err)
    }
}

impl From<CheckoutFlowError> for ApiError {
    fn from(err: CheckoutFlowError) -> Self {
        Self::Checkout(err)
    }
}

impl From<MailError> for ApiError {
    fn from(err: MailError) -> Self {
        Self::Mail(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match &self {
            ApiError::MissingSignature => (
                StatusCode::BAD_REQUEST,
                "MISSING_SIGNATURE",
                "Missing stripe-signature header".to_string(),
            ),
            ApiError::Verify(err) => {
                warn!(error = %err, "webhook verification failed");
                (err.status_code(), "VERIFICATION_FAILED", err.to_string())
            }
            ApiError::Provision(err) => {
                error!(error = %err, retryable = err.is_retryable(), "provisioning failed");
                (err.status_code(), "PROVISIONING_FAILED", err.to_string())
            }
            ApiError::Checkout(err) => {
                error!(error = %err, "checkout failed");
                (err.status_code(), "CHECKOUT_FAILED", err.to_string())
            }
            ApiError::Mail(err) => {
                error!(error = %err, "email dispatch failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EMAIL_FAILED",
                    err.to_string(),
                )
            }
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}
