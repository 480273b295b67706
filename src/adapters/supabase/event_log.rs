//! Supabase implementation of the `ProcessedEventLog` port.
//!
//! One row per processed provider event, primary-keyed on the event id.
//! A 409 from PostgREST is the insert-wins signal for a lost race.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::client::SupabaseClient;
use crate::ports::{EventLogError, InsertOutcome, ProcessedEvent, ProcessedEventLog};

const TABLE: &str = "processed_events";

#[derive(Debug, Serialize, Deserialize)]
struct EventRow {
    event_id: String,
    event_type: String,
    processed_at: DateTime<Utc>,
}

pub struct SupabaseEventLog {
    client: SupabaseClient,
}

impl SupabaseEventLog {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProcessedEventLog for SupabaseEventLog {
    async fn find(&self, event_id: &str) -> Result<Option<ProcessedEvent>, EventLogError> {
        let url = format!(
            "{}?event_id=eq.{}&select=*",
            self.client.table_url(TABLE),
            event_id
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| EventLogError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EventLogError::Request(format!("{}: {}", status, body)));
        }

        let mut rows: Vec<EventRow> = response
            .json()
            .await
            .map_err(|e| EventLogError::Request(e.to_string()))?;

        Ok(rows.pop().map(|row| ProcessedEvent {
            event_id: row.event_id,
            event_type: row.event_type,
            processed_at: row.processed_at,
        }))
    }

    async fn record(&self, event: ProcessedEvent) -> Result<InsertOutcome, EventLogError> {
        let row = EventRow {
            event_id: event.event_id,
            event_type: event.event_type,
            processed_at: event.processed_at,
        };

        let response = self
            .client
            .post(&self.client.table_url(TABLE))
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await
            .map_err(|e| EventLogError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(InsertOutcome::Inserted)
        } else if status == StatusCode::CONFLICT {
            Ok(InsertOutcome::Duplicate)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(EventLogError::Request(format!("{}: {}", status, body)))
        }
    }
}
