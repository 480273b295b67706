//! Supabase implementation of the `CardStore` port.
//!
//! Rows go through PostgREST. Uniqueness on `purchase_intents.id` and
//! `cards.slug` is enforced by the database; a 409 from PostgREST maps to
//! `StoreError::Conflict`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::client::SupabaseClient;
use crate::domain::card::{
    CardContent, CardStatus, PlanTier, ProvisionedCard, PublishedContent, PurchaseIntent,
};
use crate::ports::{CardStore, StoreError};

const INTENTS_TABLE: &str = "purchase_intents";
const CARDS_TABLE: &str = "cards";
const USER_PLANS_TABLE: &str = "user_plans";

/// Row shape of `purchase_intents`.
#[derive(Debug, Serialize, Deserialize)]
struct IntentRow {
    id: Uuid,
    user_id: Option<String>,
    slug: String,
    email: String,
    plan: PlanTier,
    password: String,
    content: CardContent,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<&PurchaseIntent> for IntentRow {
    fn from(intent: &PurchaseIntent) -> Self {
        Self {
            id: intent.id,
            user_id: intent.user_id.clone(),
            slug: intent.slug.clone(),
            email: intent.email.clone(),
            plan: intent.plan,
            password: intent.password.clone(),
            content: intent.content.clone(),
            created_at: intent.created_at,
            expires_at: intent.expires_at,
        }
    }
}

impl From<IntentRow> for PurchaseIntent {
    fn from(row: IntentRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            slug: row.slug,
            email: row.email,
            plan: row.plan,
            password: row.password,
            content: row.content,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

/// Row shape of `cards`.
#[derive(Debug, Serialize)]
struct CardRow<'a> {
    id: Uuid,
    slug: &'a str,
    user_id: Option<&'a str>,
    email: &'a str,
    plan: PlanTier,
    password: &'a str,
    content: &'a PublishedContent,
    status: CardStatus,
    created_at: DateTime<Utc>,
}

impl<'a> From<&'a ProvisionedCard> for CardRow<'a> {
    fn from(card: &'a ProvisionedCard) -> Self {
        Self {
            id: card.id,
            slug: &card.slug,
            user_id: card.user_id.as_deref(),
            email: &card.email,
            plan: card.plan,
            password: &card.password,
            content: &card.content,
            status: card.status,
            created_at: card.created_at,
        }
    }
}

/// Row shape of `user_plans` (upserted on purchase).
#[derive(Debug, Serialize)]
struct UserPlanRow<'a> {
    user_id: &'a str,
    package_type: PlanTier,
    purchase_date: DateTime<Utc>,
}

/// Supabase-backed record store.
pub struct SupabaseCardStore {
    client: SupabaseClient,
}

impl SupabaseCardStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    async fn check_write(response: reqwest::Response) -> Result<(), StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::CONFLICT {
            Err(StoreError::Conflict(body))
        } else {
            Err(StoreError::Request(format!("{}: {}", status, body)))
        }
    }
}

#[async_trait]
impl CardStore for SupabaseCardStore {
    async fn save_intent(&self, intent: &PurchaseIntent) -> Result<(), StoreError> {
        let response = self
            .client
            .post(&self.client.table_url(INTENTS_TABLE))
            .header("Prefer", "return=minimal")
            .json(&IntentRow::from(intent))
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        Self::check_write(response).await
    }

    async fn find_intent(&self, id: Uuid) -> Result<Option<PurchaseIntent>, StoreError> {
        let url = format!("{}?id=eq.{}&select=*", self.client.table_url(INTENTS_TABLE), id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Request(format!("{}: {}", status, body)));
        }

        let mut rows: Vec<IntentRow> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        Ok(rows.pop().map(PurchaseIntent::from))
    }

    async fn delete_intent(&self, id: Uuid) -> Result<(), StoreError> {
        let url = format!("{}?id=eq.{}", self.client.table_url(INTENTS_TABLE), id);
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        Self::check_write(response).await
    }

    async fn insert_card(&self, card: &ProvisionedCard) -> Result<(), StoreError> {
        let response = self
            .client
            .post(&self.client.table_url(CARDS_TABLE))
            .header("Prefer", "return=minimal")
            .json(&CardRow::from(card))
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        Self::check_write(response).await
    }

    async fn upsert_user_plan(
        &self,
        user_id: &str,
        plan: PlanTier,
        purchased_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let row = UserPlanRow {
            user_id,
            package_type: plan,
            purchase_date: purchased_at,
        };

        let url = format!(
            "{}?on_conflict=user_id",
            self.client.table_url(USER_PLANS_TABLE)
        );
        let response = self
            .client
            .post(&url)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&row)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        Self::check_write(response).await
    }
}
