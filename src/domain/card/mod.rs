//! Card domain: plans, content, staged intents and provisioned cards.

mod card;
mod content;
mod intent;
mod plan;

pub use card::{CardStatus, ProvisionedCard};
pub use content::{
    CardContent, DecodedMedia, EmbeddedMedia, MediaCategory, MediaDecodeError, PublishedContent,
};
pub use intent::{PurchaseIntent, INTENT_TTL_HOURS};
pub use plan::PlanTier;
