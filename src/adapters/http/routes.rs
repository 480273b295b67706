//! Axum router configuration.
//!
//! # Routes
//!
//! - `POST /create-checkout-session` - stage a purchase intent, open checkout
//! - `POST /webhook` - signed payment provider notifications (no auth,
//!   signature verified)
//! - `POST /send-email` - manual email passthrough
//! - `GET /health` - liveness probe

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{create_checkout_session, handle_webhook, health, send_email, AppState};

/// Create the API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/create-checkout-session", post(create_checkout_session))
        .route("/webhook", post(handle_webhook))
        .route("/send-email", post(send_email))
        .route("/health", get(health))
}
