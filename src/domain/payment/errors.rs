//! Error types for payment event handling.
//!
//! Two layers: `VerifyError` for everything that can go wrong before an
//! event is trusted, and `ProvisionError` for the orchestration that runs
//! after. HTTP status codes determine the provider's retry behavior, so
//! each variant maps explicitly.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::card::MediaCategory;

/// Errors raised while authenticating an incoming payment event.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Signature did not match the payload.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Event timestamp is older than the replay window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse the signature header or the JSON payload.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl VerifyError {
    /// Maps the error to an HTTP status code.
    ///
    /// All verification failures are client errors; the provider must not
    /// retry with the same bytes.
    pub fn status_code(&self) -> StatusCode {
        match self {
            VerifyError::InvalidSignature | VerifyError::TimestampOutOfRange => {
                StatusCode::UNAUTHORIZED
            }
            VerifyError::InvalidTimestamp | VerifyError::ParseError(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Errors raised while provisioning a card from a confirmed payment.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Event metadata is missing or malformed; retrying cannot fix it.
    #[error("Invalid metadata: {0}")]
    Metadata(String),

    /// The staged purchase intent could not be resolved.
    #[error("Intent not found: {0}")]
    Resolution(String),

    /// One media item failed to upload; the whole batch is aborted.
    #[error("Upload failed for {category} item {index}: {message}")]
    MediaUpload {
        category: MediaCategory,
        index: usize,
        message: String,
    },

    /// Writing or deleting a durable record failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Document rendering failed.
    #[error("Render error: {0}")]
    Render(String),

    /// Handing the confirmation email to the transport failed.
    #[error("Notification error: {0}")]
    Notification(String),
}

impl ProvisionError {
    /// Returns true if the provider should retry delivering this event.
    ///
    /// Resolution failures are retryable because the intent write may not
    /// be visible yet; upload and persistence failures are transient
    /// infrastructure faults.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProvisionError::Resolution(_)
                | ProvisionError::MediaUpload { .. }
                | ProvisionError::Persistence(_)
        )
    }

    /// Maps the error to an HTTP status code.
    ///
    /// - 4xx: permanent, the provider stops retrying
    /// - 5xx: transient, the provider retries with backoff
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProvisionError::Metadata(_) => StatusCode::BAD_REQUEST,

            ProvisionError::Resolution(_)
            | ProvisionError::MediaUpload { .. }
            | ProvisionError::Persistence(_)
            | ProvisionError::Render(_)
            | ProvisionError::Notification(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
