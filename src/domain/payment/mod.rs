//! Payment domain: provider events, metadata, signature verification and
//! the provisioning error taxonomy.

mod errors;
mod event;
mod metadata;
mod verifier;

pub use errors::{ProvisionError, VerifyError};
pub use event::{CheckoutSession, PaymentEvent, PaymentEventData, PaymentEventType};
pub use metadata::CheckoutMetadata;
pub use verifier::{SignatureHeader, WebhookVerifier};

#[cfg(test)]
pub use event::PaymentEventBuilder;
#[cfg(test)]
pub use verifier::compute_test_signature;
