//! Staged purchase intents.
//!
//! A `PurchaseIntent` captures everything the client submitted at checkout
//! time. It is written before redirecting to the payment provider and
//! consumed (deleted) once the matching payment confirmation has been fully
//! provisioned. Intents that never convert are swept by their expiry
//! timestamp.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::content::CardContent;
use super::plan::PlanTier;

/// Hours an unconverted intent stays resolvable.
pub const INTENT_TTL_HOURS: i64 = 24;

/// Length of the generated access password.
const PASSWORD_LEN: usize = 8;

/// Draft card staged ahead of payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseIntent {
    pub id: Uuid,

    /// Buyer account id when the purchase was made while signed in.
    pub user_id: Option<String>,

    /// URL slug chosen by the buyer; unique per intent.
    pub slug: String,

    /// Buyer email, used as the recipient of the confirmation.
    pub email: String,

    /// Plan tier the buyer selected.
    pub plan: PlanTier,

    /// Generated access password, sent in the confirmation email.
    pub password: String,

    /// Full draft content, media still embedded inline.
    pub content: CardContent,

    pub created_at: DateTime<Utc>,

    /// After this instant the intent is no longer resolvable.
    pub expires_at: DateTime<Utc>,
}

impl PurchaseIntent {
    /// Stage a new intent with a fresh id, generated password and the
    /// standard TTL.
    pub fn new(
        user_id: Option<String>,
        slug: String,
        email: String,
        plan: PlanTier,
        content: CardContent,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            slug,
            email,
            plan,
            password: generate_password(),
            content,
            created_at: now,
            expires_at: now + Duration::hours(INTENT_TTL_HOURS),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Short random access password derived from a v4 UUID.
fn generate_password() -> String {
    Uuid::new_v4().simple().to_string()[..PASSWORD_LEN].to_string()
}
