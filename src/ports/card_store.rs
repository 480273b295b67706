//! CardStore port - durable records for intents, cards and buyer plans.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::card::{PlanTier, ProvisionedCard, PurchaseIntent};

/// Errors from the persistent record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request to the store failed (network, 5xx, timeout).
    #[error("store request failed: {0}")]
    Request(String),

    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The store returned a payload we could not decode.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Port for the durable record store.
///
/// Implementations must enforce uniqueness on the card slug and on the
/// intent id so a duplicate provisioning run cannot write twice.
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Stage a purchase intent ahead of payment.
    async fn save_intent(&self, intent: &PurchaseIntent) -> Result<(), StoreError>;

    /// Resolve a staged intent by id. Returns `None` when it does not exist
    /// or has already been consumed.
    async fn find_intent(&self, id: Uuid) -> Result<Option<PurchaseIntent>, StoreError>;

    /// Delete a consumed intent. Deleting a missing intent is not an error.
    async fn delete_intent(&self, id: Uuid) -> Result<(), StoreError>;

    /// Insert the provisioned card record.
    async fn insert_card(&self, card: &ProvisionedCard) -> Result<(), StoreError>;

    /// Upsert the buyer's plan record keyed by user id.
    async fn upsert_user_plan(
        &self,
        user_id: &str,
        plan: PlanTier,
        purchased_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}
