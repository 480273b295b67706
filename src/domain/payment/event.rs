//! Payment provider event types.
//!
//! Structures for parsing provider webhook payloads. Only fields relevant
//! to our processing are captured.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Payment provider webhook event (simplified).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Type of event (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    pub created: i64,

    /// Object containing event-specific data.
    pub data: PaymentEventData,

    /// Whether this is a live mode event (vs test mode).
    #[serde(default)]
    pub livemode: bool,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentEventData {
    /// The object that triggered the event (polymorphic based on event type).
    pub object: serde_json::Value,
}

impl PaymentEvent {
    pub fn is_live(&self) -> bool {
        self.livemode
    }

    /// Parse the event type into a known enum variant.
    pub fn parsed_type(&self) -> PaymentEventType {
        PaymentEventType::from_str(&self.event_type)
    }

    /// Attempts to deserialize the data object as the specified type.
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }
}

/// Known provider event types that we handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentEventType {
    /// Checkout session completed successfully; triggers provisioning.
    CheckoutSessionCompleted,
    /// Unknown or unhandled event type; acknowledged without action.
    Unknown,
}

impl PaymentEventType {
    /// Parse event type from string.
    pub fn from_str(s: &str) -> Self {
        match s {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckoutSessionCompleted => "checkout.session.completed",
            Self::Unknown => "unknown",
        }
    }
}

/// Checkout session object carried in a completed-checkout event.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckoutSession {
    /// Session identifier (cs_xxx format).
    pub id: String,

    /// Correlation metadata attached when the session was created.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Builder for creating test PaymentEvent instances.
#[cfg(test)]
pub struct PaymentEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: serde_json::Value,
    livemode: bool,
}

#[cfg(test)]
impl Default for PaymentEventBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: "checkout.session.completed".to_string(),
            created: chrono::Utc::now().timestamp(),
            object: serde_json::json!({}),
            livemode: false,
        }
    }
}

#[cfg(test)]
impl PaymentEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn livemode(mut self, livemode: bool) -> Self {
        self.livemode = livemode;
        self
    }

    pub fn build(self) -> PaymentEvent {
        PaymentEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: PaymentEventData {
                object: self.object,
            },
            livemode: self.livemode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ══════════════════════════════════════════════════════════════
    // Deserialization Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn deserialize_minimal_event() {
        let json = r#"{
            "id": "evt_1234567890",
            "type": "checkout.session.completed",
            "created": 1704067200,
            "data": {
                "object": {}
            },
            "livemode": false
        }"#;

        let event: PaymentEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.id, "evt_1234567890");
        assert_eq!(event.event_type, "checkout.session.completed");
        assert_eq!(event.created, 1704067200);
        assert!(!event.is_live());
    }

    #[test]
    fn deserialize_tolerates_missing_livemode() {
        let json = r#"{
            "id": "evt_x",
            "type": "checkout.session.completed",
            "created": 1704067200,
            "data": {"object": {}}
        }"#;

        let event: PaymentEvent = serde_json::from_str(json).unwrap();
        assert!(!event.livemode);
    }

    #[test]
    fn deserialize_session_with_metadata() {
        let event = PaymentEventBuilder::new()
            .object(json!({
                "id": "cs_test_abc123",
                "metadata": {
                    "intent_id": "6e2b8a4f-0000-0000-0000-000000000001",
                    "plan": "premium"
                }
            }))
            .build();

        let session: CheckoutSession = event.deserialize_object().unwrap();

        assert_eq!(session.id, "cs_test_abc123");
        assert_eq!(session.metadata["plan"], "premium");
    }

    #[test]
    fn deserialize_session_without_metadata() {
        let event = PaymentEventBuilder::new()
            .object(json!({"id": "cs_bare"}))
            .build();

        let session: CheckoutSession = event.deserialize_object().unwrap();
        assert!(session.metadata.is_empty());
    }

    // ══════════════════════════════════════════════════════════════
    // Event Type Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn event_type_checkout_completed() {
        assert_eq!(
            PaymentEventType::from_str("checkout.session.completed"),
            PaymentEventType::CheckoutSessionCompleted
        );
    }

    #[test]
    fn event_type_unknown() {
        assert_eq!(
            PaymentEventType::from_str("invoice.payment_failed"),
            PaymentEventType::Unknown
        );
    }

    #[test]
    fn parsed_type_returns_correct_variant() {
        let event = PaymentEventBuilder::new()
            .event_type("checkout.session.completed")
            .build();
        assert_eq!(
            event.parsed_type(),
            PaymentEventType::CheckoutSessionCompleted
        );

        let other = PaymentEventBuilder::new().event_type("charge.refunded").build();
        assert_eq!(other.parsed_type(), PaymentEventType::Unknown);
    }
}
