//! ProcessedEventLog port - idempotent webhook delivery tracking.
//!
//! Payment providers deliver the same event more than once: network
//! timeouts, 5xx responses from our endpoint, or an acknowledgment the
//! provider never received. The log records each fully processed event id
//! so a redelivery becomes a no-op instead of a second provisioning run.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors from the delivered-events log.
#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("event log request failed: {0}")]
    Request(String),
}

/// Record of one fully processed provider event.
#[derive(Debug, Clone)]
pub struct ProcessedEvent {
    /// Provider event id (evt_xxx format).
    pub event_id: String,

    /// Provider event type string.
    pub event_type: String,

    pub processed_at: DateTime<Utc>,
}

impl ProcessedEvent {
    pub fn new(event_id: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            processed_at: Utc::now(),
        }
    }
}

/// Result of attempting to record a processed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// First time seeing this event.
    Inserted,
    /// Another run already recorded it; the caller lost the race.
    Duplicate,
}

/// Port for the delivered-events log.
///
/// Implementations must back `record` with a uniqueness constraint on the
/// event id so two concurrent deliveries cannot both observe `Inserted`.
#[async_trait]
pub trait ProcessedEventLog: Send + Sync {
    /// Look up an event by its provider id. `None` means not yet processed.
    async fn find(&self, event_id: &str) -> Result<Option<ProcessedEvent>, EventLogError>;

    /// Record a fully processed event; insert-wins on conflict.
    async fn record(&self, event: ProcessedEvent) -> Result<InsertOutcome, EventLogError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    /// In-memory implementation for testing.
    struct InMemoryEventLog {
        records: RwLock<HashMap<String, ProcessedEvent>>,
    }

    impl InMemoryEventLog {
        fn new() -> Self {
            Self {
                records: RwLock::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl ProcessedEventLog for InMemoryEventLog {
        async fn find(&self, event_id: &str) -> Result<Option<ProcessedEvent>, EventLogError> {
            Ok(self.records.read().await.get(event_id).cloned())
        }

        async fn record(&self, event: ProcessedEvent) -> Result<InsertOutcome, EventLogError> {
            let mut records = self.records.write().await;
            if records.contains_key(&event.event_id) {
                Ok(InsertOutcome::Duplicate)
            } else {
                records.insert(event.event_id.clone(), event);
                Ok(InsertOutcome::Inserted)
            }
        }
    }

    #[tokio::test]
    async fn find_returns_none_for_new_event() {
        let log = InMemoryEventLog::new();
        assert!(log.find("evt_new").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn record_then_find() {
        let log = InMemoryEventLog::new();
        let outcome = log
            .record(ProcessedEvent::new("evt_1", "checkout.session.completed"))
            .await
            .unwrap();

        assert_eq!(outcome, InsertOutcome::Inserted);
        let found = log.find("evt_1").await.unwrap().unwrap();
        assert_eq!(found.event_type, "checkout.session.completed");
    }

    #[tokio::test]
    async fn second_record_is_duplicate() {
        let log = InMemoryEventLog::new();
        log.record(ProcessedEvent::new("evt_dup", "t")).await.unwrap();

        let outcome = log.record(ProcessedEvent::new("evt_dup", "t")).await.unwrap();

        assert_eq!(outcome, InsertOutcome::Duplicate);
    }
}
