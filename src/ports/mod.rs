//! Ports: narrow async interfaces to external collaborators.
//!
//! Adapters implement these traits; application handlers depend on them as
//! `Arc<dyn Trait>` so tests can substitute in-memory fakes.

mod blob_store;
mod card_store;
mod checkout;
mod event_log;
mod mailer;
mod renderer;

pub use blob_store::{BlobError, BlobStore};
pub use card_store::{CardStore, StoreError};
pub use checkout::{CheckoutError, CheckoutProvider, CheckoutSessionRef, CreateSessionRequest};
pub use event_log::{EventLogError, InsertOutcome, ProcessedEvent, ProcessedEventLog};
pub use mailer::{EmailAttachment, EmailMessage, MailError, Mailer};
pub use renderer::{DocumentRenderer, RenderError};
