//! Couplecard server binary.
//!
//! Loads configuration, wires the adapters to the application handlers and
//! serves the HTTP API.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use couplecard::adapters::email::SmtpMailer;
use couplecard::adapters::http::{api_routes, AppState};
use couplecard::adapters::render::PdfRenderer;
use couplecard::adapters::stripe::{StripeCheckoutAdapter, StripeConfig};
use couplecard::adapters::supabase::{
    SupabaseBlobStore, SupabaseCardStore, SupabaseClient, SupabaseEventLog,
};
use couplecard::application::CheckoutSettings;
use couplecard::config::AppConfig;
use couplecard::domain::payment::WebhookVerifier;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.server.log_level.clone().into()),
        )
        .init();

    config.validate()?;

    info!(
        environment = ?config.server.environment,
        test_mode = config.payment.is_test_mode(),
        "starting couplecard server"
    );

    let state = build_state(&config)?;

    let app = api_routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors_layer(&config));

    let addr = config.server.socket_addr();
    info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_state(config: &AppConfig) -> Result<AppState, Box<dyn std::error::Error>> {
    let supabase = SupabaseClient::new(config.storage.base_url(), &config.storage.supabase_key);

    let card_store = Arc::new(SupabaseCardStore::new(supabase.clone()));
    let blob_store = Arc::new(SupabaseBlobStore::new(
        supabase.clone(),
        &config.storage.media_bucket,
    ));
    let event_log = Arc::new(SupabaseEventLog::new(supabase));

    let checkout_provider = Arc::new(StripeCheckoutAdapter::new(StripeConfig::new(
        &config.payment.stripe_api_key,
    )));

    let mailer = Arc::new(SmtpMailer::new(&config.email)?);
    let renderer = Arc::new(PdfRenderer::new());
    let verifier = Arc::new(WebhookVerifier::new(&config.payment.stripe_webhook_secret));

    let checkout_settings = CheckoutSettings {
        basic_price_id: config.payment.basic_price_id.clone(),
        premium_price_id: config.payment.premium_price_id.clone(),
        frontend_base: config.server.frontend_base().to_string(),
    };

    Ok(AppState {
        card_store,
        blob_store,
        checkout_provider,
        renderer,
        mailer,
        event_log,
        verifier,
        checkout_settings,
    })
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}
