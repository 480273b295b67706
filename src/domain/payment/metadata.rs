//! Checkout metadata decoding.
//!
//! Correlation fields attached to the checkout session at creation time come
//! back on the completed-checkout event as a string map. Decoding is strict
//! and happens in one step so a malformed event fails before any side effect.

use std::collections::HashMap;

use uuid::Uuid;

use super::errors::ProvisionError;
use crate::domain::card::PlanTier;

/// Correlation metadata round-tripped through the payment provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutMetadata {
    /// Id of the staged purchase intent to provision.
    pub intent_id: Uuid,

    /// Buyer account id, when the purchase was made while signed in.
    pub user_id: Option<String>,

    /// Slug the card will be served under.
    pub custom_url: String,

    /// Buyer email for the confirmation.
    pub email: String,

    pub plan: PlanTier,
}

impl CheckoutMetadata {
    /// Keys written into the session metadata at checkout creation.
    pub const INTENT_ID: &'static str = "intent_id";
    pub const USER_ID: &'static str = "user_id";
    pub const CUSTOM_URL: &'static str = "custom_url";
    pub const EMAIL: &'static str = "email";
    pub const PLAN: &'static str = "plan";

    /// Strict decode of the provider metadata map.
    ///
    /// # Errors
    ///
    /// Returns `ProvisionError::Metadata` when a required key is missing,
    /// empty, or (for `intent_id`) not a valid UUID.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, ProvisionError> {
        let intent_id = required(map, Self::INTENT_ID)?;
        let intent_id = Uuid::parse_str(intent_id)
            .map_err(|_| ProvisionError::Metadata(format!("{} is not a uuid", Self::INTENT_ID)))?;

        let custom_url = required(map, Self::CUSTOM_URL)?.to_string();
        let email = required(map, Self::EMAIL)?.to_string();
        let plan = PlanTier::parse(required(map, Self::PLAN)?);

        let user_id = map
            .get(Self::USER_ID)
            .filter(|v| !v.is_empty())
            .cloned();

        Ok(Self {
            intent_id,
            user_id,
            custom_url,
            email,
            plan,
        })
    }

    /// The inverse of `from_map`: the exact map attached at session creation.
    pub fn to_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert(Self::INTENT_ID.to_string(), self.intent_id.to_string());
        map.insert(Self::CUSTOM_URL.to_string(), self.custom_url.clone());
        map.insert(Self::EMAIL.to_string(), self.email.clone());
        map.insert(Self::PLAN.to_string(), self.plan.as_str().to_string());
        if let Some(user_id) = &self.user_id {
            map.insert(Self::USER_ID.to_string(), user_id.clone());
        }
        map
    }
}

fn required<'a>(
    map: &'a HashMap<String, String>,
    key: &'static str,
) -> Result<&'a str, ProvisionError> {
    match map.get(key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ProvisionError::Metadata(format!("missing {}", key))),
    }
}
