//! Provisioned cards.
//!
//! A `ProvisionedCard` is the durable record created when a payment
//! confirmation has been fully processed: media uploaded, content published,
//! and the card reachable at its slug.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::content::PublishedContent;
use super::intent::PurchaseIntent;
use super::plan::PlanTier;

/// Lifecycle status of a card record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    /// Created but payment not yet confirmed.
    Pending,
    /// Payment confirmed; card is live.
    Active,
}

impl CardStatus {
    /// Whether a transition to `next` is allowed. The only legal move is
    /// pending to active; activation is never reversed.
    pub fn can_transition_to(&self, next: CardStatus) -> bool {
        matches!((self, next), (CardStatus::Pending, CardStatus::Active))
    }
}

/// Durable card record written after successful provisioning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionedCard {
    pub id: Uuid,

    /// URL slug; unique across all cards.
    pub slug: String,

    /// Buyer account id, when known.
    pub user_id: Option<String>,

    /// Buyer email the confirmation was sent to.
    pub email: String,

    pub plan: PlanTier,

    /// Access password the visitor enters to open the card.
    pub password: String,

    /// Published content with durable media locators.
    pub content: PublishedContent,

    pub status: CardStatus,

    pub created_at: DateTime<Utc>,
}

impl ProvisionedCard {
    /// Build an active card from a consumed intent and its published content.
    pub fn from_intent(intent: &PurchaseIntent, content: PublishedContent) -> Self {
        Self {
            id: Uuid::new_v4(),
            slug: intent.slug.clone(),
            user_id: intent.user_id.clone(),
            email: intent.email.clone(),
            plan: intent.plan,
            password: intent.password.clone(),
            content,
            status: CardStatus::Active,
            created_at: Utc::now(),
        }
    }

    /// Public page URL for this card under the given frontend base.
    pub fn public_url(&self, frontend_base: &str) -> String {
        format!("{}/{}", frontend_base.trim_end_matches('/'), self.slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::content::{CardContent, PublishedContent};

    fn sample_card() -> ProvisionedCard {
        let intent = PurchaseIntent::new(
            Some("user-1".to_string()),
            "joao-e-maria".to_string(),
            "joao@example.com".to_string(),
            PlanTier::Basic,
            CardContent::default(),
        );
        ProvisionedCard::from_intent(&intent, PublishedContent::default())
    }

    #[test]
    fn from_intent_builds_active_card() {
        let card = sample_card();
        assert_eq!(card.status, CardStatus::Active);
        assert_eq!(card.slug, "joao-e-maria");
        assert_eq!(card.user_id.as_deref(), Some("user-1"));
        assert_eq!(card.password.len(), 8);
    }

    #[test]
    fn public_url_joins_base_and_slug() {
        let card = sample_card();
        assert_eq!(
            card.public_url("https://couplecard.app/"),
            "https://couplecard.app/joao-e-maria"
        );
    }

    #[test]
    fn status_transitions() {
        assert!(CardStatus::Pending.can_transition_to(CardStatus::Active));
        assert!(!CardStatus::Active.can_transition_to(CardStatus::Pending));
        assert!(!CardStatus::Active.can_transition_to(CardStatus::Active));
    }
}
