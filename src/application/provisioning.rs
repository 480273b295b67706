//! ProvisionCardHandler - turns a verified completed-checkout event into a
//! live card.
//!
//! Strict order: decode metadata, duplicate gate, resolve intent, upload
//! media, insert card, render documents, send confirmation, clean up, record
//! the event. Side effects only start after the duplicate gate; the event is
//! recorded only after every durable write succeeded, so a failed run stays
//! invisible to the gate and the provider's retry can complete it.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::application::media::MediaUploader;
use crate::application::notification::NotificationComposer;
use crate::domain::card::ProvisionedCard;
use crate::domain::payment::{
    CheckoutMetadata, CheckoutSession, PaymentEvent, PaymentEventType, ProvisionError,
};
use crate::ports::{
    BlobStore, CardStore, DocumentRenderer, InsertOutcome, Mailer, ProcessedEvent,
    ProcessedEventLog, StoreError,
};

/// Result of handling a payment event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// A card was provisioned and the confirmation dispatched.
    Provisioned { slug: String },
    /// The event id was already processed; nothing was done.
    Duplicate,
    /// Event type is not handled; acknowledged without action.
    Ignored,
}

/// Handler for verified payment provider events.
pub struct ProvisionCardHandler {
    card_store: Arc<dyn CardStore>,
    uploader: MediaUploader,
    renderer: Arc<dyn DocumentRenderer>,
    mailer: Arc<dyn Mailer>,
    event_log: Arc<dyn ProcessedEventLog>,
    composer: NotificationComposer,
}

impl ProvisionCardHandler {
    pub fn new(
        card_store: Arc<dyn CardStore>,
        blob_store: Arc<dyn BlobStore>,
        renderer: Arc<dyn DocumentRenderer>,
        mailer: Arc<dyn Mailer>,
        event_log: Arc<dyn ProcessedEventLog>,
        frontend_base: impl Into<String>,
    ) -> Self {
        Self {
            card_store,
            uploader: MediaUploader::new(blob_store),
            renderer,
            mailer,
            event_log,
            composer: NotificationComposer::new(frontend_base),
        }
    }

    /// Handle a verified event. Only `checkout.session.completed` triggers
    /// provisioning; every other type is acknowledged and ignored.
    pub async fn handle(&self, event: PaymentEvent) -> Result<ProvisionOutcome, ProvisionError> {
        match event.parsed_type() {
            PaymentEventType::CheckoutSessionCompleted => self.provision(event).await,
            PaymentEventType::Unknown => {
                info!(event_id = %event.id, event_type = %event.event_type, "event ignored");
                Ok(ProvisionOutcome::Ignored)
            }
        }
    }

    async fn provision(&self, event: PaymentEvent) -> Result<ProvisionOutcome, ProvisionError> {
        let session: CheckoutSession = event
            .deserialize_object()
            .map_err(|e| ProvisionError::Metadata(e.to_string()))?;
        let metadata = CheckoutMetadata::from_map(&session.metadata)?;

        // Duplicate gate: redeliveries of a fully processed event are no-ops.
        let seen = self
            .event_log
            .find(&event.id)
            .await
            .map_err(|e| ProvisionError::Persistence(e.to_string()))?;
        if seen.is_some() {
            info!(event_id = %event.id, "duplicate delivery suppressed");
            return Ok(ProvisionOutcome::Duplicate);
        }

        let intent = self
            .card_store
            .find_intent(metadata.intent_id)
            .await
            .map_err(|e| ProvisionError::Persistence(e.to_string()))?
            .ok_or_else(|| {
                ProvisionError::Resolution(format!("intent {} not found", metadata.intent_id))
            })?;

        let (photo_urls, music_urls) = self
            .uploader
            .upload_all(&intent.slug, &intent.content)
            .await?;

        let published = intent.content.clone().publish(photo_urls, music_urls);
        let card = ProvisionedCard::from_intent(&intent, published);

        match self.card_store.insert_card(&card).await {
            Ok(()) => {}
            // A retry after a partial run finds the card already written;
            // resume instead of failing.
            Err(StoreError::Conflict(reason)) => {
                warn!(slug = %card.slug, %reason, "card already written, resuming");
            }
            Err(e) => return Err(ProvisionError::Persistence(e.to_string())),
        }

        let html = self.composer.confirmation_html(&card);
        let pdf = if card.plan.includes_pdf() {
            Some(
                self.renderer
                    .render_pdf(&html)
                    .map_err(|e| ProvisionError::Render(e.to_string()))?,
            )
        } else {
            None
        };

        // Confirmation failure after the card is durable is logged, not
        // surfaced: a retry here would provision twice.
        let message = self.composer.compose(&card, pdf);
        if let Err(e) = self.mailer.send(message).await {
            warn!(slug = %card.slug, error = %e, "confirmation email failed");
        }

        self.card_store
            .delete_intent(intent.id)
            .await
            .map_err(|e| ProvisionError::Persistence(e.to_string()))?;

        if let Some(user_id) = &intent.user_id {
            self.card_store
                .upsert_user_plan(user_id, intent.plan, Utc::now())
                .await
                .map_err(|e| ProvisionError::Persistence(e.to_string()))?;
        }

        match self
            .event_log
            .record(ProcessedEvent::new(&event.id, &event.event_type))
            .await
        {
            Ok(InsertOutcome::Inserted) => {}
            Ok(InsertOutcome::Duplicate) => {
                warn!(event_id = %event.id, "lost the event log race after provisioning");
            }
            // The card insert uniqueness backstops double provisioning, so
            // a log write failure is not worth a provider retry.
            Err(e) => warn!(event_id = %event.id, error = %e, "event log write failed"),
        }

        info!(
            event_id = %event.id,
            slug = %card.slug,
            plan = card.plan.as_str(),
            "card provisioned"
        );

        Ok(ProvisionOutcome::Provisioned { slug: card.slug })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use base64::Engine as _;
    use chrono::DateTime;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use uuid::Uuid;

    use crate::domain::card::{CardContent, EmbeddedMedia, PlanTier, PurchaseIntent};
    use crate::domain::payment::PaymentEventBuilder;
    use crate::ports::{
        BlobError, EmailMessage, EventLogError, MailError, RenderError,
    };

    // ══════════════════════════════════════════════════════════════
    // Mocks
    // ══════════════════════════════════════════════════════════════

    #[derive(Default)]
    struct MockCardStore {
        intents: Mutex<HashMap<Uuid, PurchaseIntent>>,
        cards: Mutex<Vec<ProvisionedCard>>,
        plans: Mutex<Vec<(String, PlanTier)>>,
        fail_insert: bool,
        conflict_insert: bool,
    }

    impl MockCardStore {
        fn with_intent(intent: PurchaseIntent) -> Self {
            let store = Self::default();
            store.intents.lock().unwrap().insert(intent.id, intent);
            store
        }
    }

    #[async_trait]
    impl CardStore for MockCardStore {
        async fn save_intent(&self, intent: &PurchaseIntent) -> Result<(), StoreError> {
            self.intents
                .lock()
                .unwrap()
                .insert(intent.id, intent.clone());
            Ok(())
        }

        async fn find_intent(&self, id: Uuid) -> Result<Option<PurchaseIntent>, StoreError> {
            Ok(self.intents.lock().unwrap().get(&id).cloned())
        }

        async fn delete_intent(&self, id: Uuid) -> Result<(), StoreError> {
            self.intents.lock().unwrap().remove(&id);
            Ok(())
        }

        async fn insert_card(&self, card: &ProvisionedCard) -> Result<(), StoreError> {
            if self.fail_insert {
                return Err(StoreError::Request("insert failed".to_string()));
            }
            if self.conflict_insert {
                return Err(StoreError::Conflict("slug taken".to_string()));
            }
            self.cards.lock().unwrap().push(card.clone());
            Ok(())
        }

        async fn upsert_user_plan(
            &self,
            user_id: &str,
            plan: PlanTier,
            _purchased_at: DateTime<Utc>,
        ) -> Result<(), StoreError> {
            self.plans.lock().unwrap().push((user_id.to_string(), plan));
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeBlobStore {
        uploads: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl BlobStore for FakeBlobStore {
        async fn upload(
            &self,
            path: &str,
            _content_type: &str,
            _bytes: Vec<u8>,
        ) -> Result<String, BlobError> {
            if self.fail {
                return Err(BlobError::Request("bucket down".to_string()));
            }
            self.uploads.lock().unwrap().push(path.to_string());
            Ok(format!("https://cdn.example/{}", path))
        }
    }

    #[derive(Default)]
    struct MockRenderer {
        fail: bool,
        calls: Mutex<usize>,
    }

    impl DocumentRenderer for MockRenderer {
        fn render_pdf(&self, _html: &str) -> Result<Vec<u8>, RenderError> {
            *self.calls.lock().unwrap() += 1;
            if self.fail {
                return Err(RenderError::Failed("renderer broke".to_string()));
            }
            Ok(b"%PDF-1.4 fake".to_vec())
        }
    }

    #[derive(Default)]
    struct MockMailer {
        sent: Mutex<Vec<EmailMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl Mailer for MockMailer {
        async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::Transport("smtp down".to_string()));
            }
            self.sent.lock().unwrap().push(message);
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockEventLog {
        records: Mutex<HashMap<String, ProcessedEvent>>,
    }

    impl MockEventLog {
        fn with_seen(event_id: &str) -> Self {
            let log = Self::default();
            log.records.lock().unwrap().insert(
                event_id.to_string(),
                ProcessedEvent::new(event_id, "checkout.session.completed"),
            );
            log
        }
    }

    #[async_trait]
    impl ProcessedEventLog for MockEventLog {
        async fn find(&self, event_id: &str) -> Result<Option<ProcessedEvent>, EventLogError> {
            Ok(self.records.lock().unwrap().get(event_id).cloned())
        }

        async fn record(&self, event: ProcessedEvent) -> Result<InsertOutcome, EventLogError> {
            let mut records = self.records.lock().unwrap();
            if records.contains_key(&event.event_id) {
                Ok(InsertOutcome::Duplicate)
            } else {
                records.insert(event.event_id.clone(), event);
                Ok(InsertOutcome::Inserted)
            }
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Fixtures
    // ══════════════════════════════════════════════════════════════

    struct Fixture {
        store: Arc<MockCardStore>,
        blobs: Arc<FakeBlobStore>,
        renderer: Arc<MockRenderer>,
        mailer: Arc<MockMailer>,
        log: Arc<MockEventLog>,
    }

    impl Fixture {
        fn handler(&self) -> ProvisionCardHandler {
            ProvisionCardHandler::new(
                self.store.clone(),
                self.blobs.clone(),
                self.renderer.clone(),
                self.mailer.clone(),
                self.log.clone(),
                "https://couplecard.app",
            )
        }
    }

    fn embedded(name: &str) -> EmbeddedMedia {
        let encoded = base64::engine::general_purpose::STANDARD.encode([1u8, 2, 3]);
        EmbeddedMedia {
            name: name.to_string(),
            data: format!("data:image/png;base64,{}", encoded),
        }
    }

    fn intent(plan: PlanTier) -> PurchaseIntent {
        PurchaseIntent::new(
            Some("user-1".to_string()),
            "joao-e-maria".to_string(),
            "joao@example.com".to_string(),
            plan,
            CardContent {
                title: "João & Maria".to_string(),
                photos: vec![embedded("a.png"), embedded("b.png")],
                musics: vec![embedded("song.mp3")],
                ..Default::default()
            },
        )
    }

    fn completed_event(event_id: &str, intent: &PurchaseIntent) -> PaymentEvent {
        PaymentEventBuilder::new()
            .id(event_id)
            .object(json!({
                "id": "cs_test_1",
                "metadata": {
                    "intent_id": intent.id.to_string(),
                    "user_id": intent.user_id.clone().unwrap_or_default(),
                    "custom_url": intent.slug,
                    "email": intent.email,
                    "plan": intent.plan.as_str(),
                }
            }))
            .build()
    }

    fn fixture(intent: PurchaseIntent) -> Fixture {
        Fixture {
            store: Arc::new(MockCardStore::with_intent(intent)),
            blobs: Arc::new(FakeBlobStore::default()),
            renderer: Arc::new(MockRenderer::default()),
            mailer: Arc::new(MockMailer::default()),
            log: Arc::new(MockEventLog::default()),
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Happy Path Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn provisions_card_end_to_end() {
        let staged = intent(PlanTier::Premium);
        let intent_id = staged.id;
        let event = completed_event("evt_1", &staged);
        let fx = fixture(staged);

        let outcome = fx.handler().handle(event).await.unwrap();

        assert_eq!(
            outcome,
            ProvisionOutcome::Provisioned {
                slug: "joao-e-maria".to_string()
            }
        );

        // media uploaded before the card was written
        assert_eq!(fx.blobs.uploads.lock().unwrap().len(), 3);

        let cards = fx.store.cards.lock().unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].content.photos.len(), 2);
        assert_eq!(cards[0].content.musics.len(), 1);

        // intent consumed, plan upserted, event recorded
        assert!(!fx.store.intents.lock().unwrap().contains_key(&intent_id));
        assert_eq!(fx.store.plans.lock().unwrap().len(), 1);
        assert!(fx.log.records.lock().unwrap().contains_key("evt_1"));

        // confirmation sent with the PDF attached
        let sent = fx.mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].attachment.is_some());
        assert!(sent[0].body.contains("https://couplecard.app/joao-e-maria"));
    }

    #[tokio::test]
    async fn basic_plan_sends_no_attachment() {
        let staged = intent(PlanTier::Basic);
        let event = completed_event("evt_basic", &staged);
        let fx = fixture(staged);

        fx.handler().handle(event).await.unwrap();

        let sent = fx.mailer.sent.lock().unwrap();
        assert!(sent[0].attachment.is_none());
        assert_eq!(*fx.renderer.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn anonymous_buyer_skips_plan_upsert() {
        let mut staged = intent(PlanTier::Basic);
        staged.user_id = None;
        let event = completed_event("evt_anon", &staged);
        let fx = fixture(staged);

        fx.handler().handle(event).await.unwrap();

        assert!(fx.store.plans.lock().unwrap().is_empty());
    }

    // ══════════════════════════════════════════════════════════════
    // Idempotency Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn duplicate_event_is_suppressed_with_no_side_effects() {
        let staged = intent(PlanTier::Premium);
        let event = completed_event("evt_dup", &staged);
        let fx = Fixture {
            log: Arc::new(MockEventLog::with_seen("evt_dup")),
            ..fixture(staged)
        };

        let outcome = fx.handler().handle(event).await.unwrap();

        assert_eq!(outcome, ProvisionOutcome::Duplicate);
        assert!(fx.blobs.uploads.lock().unwrap().is_empty());
        assert!(fx.store.cards.lock().unwrap().is_empty());
        assert!(fx.mailer.sent.lock().unwrap().is_empty());
        assert_eq!(fx.store.intents.lock().unwrap().len(), 1, "intent untouched");
    }

    #[tokio::test]
    async fn replaying_a_processed_event_is_a_no_op() {
        let staged = intent(PlanTier::Basic);
        let event = completed_event("evt_replay", &staged);
        let fx = fixture(staged);
        let handler = fx.handler();

        let first = handler.handle(event.clone()).await.unwrap();
        let second = handler.handle(event).await.unwrap();

        assert!(matches!(first, ProvisionOutcome::Provisioned { .. }));
        assert_eq!(second, ProvisionOutcome::Duplicate);
        assert_eq!(fx.store.cards.lock().unwrap().len(), 1);
        assert_eq!(fx.mailer.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_event_type_is_ignored() {
        let staged = intent(PlanTier::Basic);
        let fx = fixture(staged);
        let event = PaymentEventBuilder::new()
            .id("evt_other")
            .event_type("charge.refunded")
            .build();

        let outcome = fx.handler().handle(event).await.unwrap();

        assert_eq!(outcome, ProvisionOutcome::Ignored);
        assert!(fx.store.cards.lock().unwrap().is_empty());
        assert!(fx.blobs.uploads.lock().unwrap().is_empty());
    }

    // ══════════════════════════════════════════════════════════════
    // Failure Ordering Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn missing_metadata_fails_before_any_side_effect() {
        let staged = intent(PlanTier::Basic);
        let fx = fixture(staged);
        let event = PaymentEventBuilder::new()
            .id("evt_bad_meta")
            .object(json!({"id": "cs_1", "metadata": {"plan": "basic"}}))
            .build();

        let result = fx.handler().handle(event).await;

        assert!(matches!(result, Err(ProvisionError::Metadata(_))));
        assert!(fx.blobs.uploads.lock().unwrap().is_empty());
        assert!(fx.store.cards.lock().unwrap().is_empty());
        assert!(fx.log.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unresolvable_intent_yields_resolution_error() {
        let staged = intent(PlanTier::Basic);
        let orphan = intent(PlanTier::Basic);
        let event = completed_event("evt_orphan", &orphan);
        let fx = fixture(staged);

        let result = fx.handler().handle(event).await;

        match result {
            Err(err @ ProvisionError::Resolution(_)) => assert!(err.is_retryable()),
            other => panic!("expected Resolution error, got {:?}", other),
        }
        assert!(fx.blobs.uploads.lock().unwrap().is_empty());
        assert!(fx.store.cards.lock().unwrap().is_empty());
        assert!(fx.mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn upload_failure_writes_no_card_and_keeps_intent() {
        let staged = intent(PlanTier::Premium);
        let intent_id = staged.id;
        let event = completed_event("evt_upload_fail", &staged);
        let fx = Fixture {
            blobs: Arc::new(FakeBlobStore {
                fail: true,
                ..Default::default()
            }),
            ..fixture(staged)
        };

        let result = fx.handler().handle(event).await;

        assert!(matches!(result, Err(ProvisionError::MediaUpload { .. })));
        assert!(fx.store.cards.lock().unwrap().is_empty());
        assert!(fx.store.intents.lock().unwrap().contains_key(&intent_id));
        assert!(fx.mailer.sent.lock().unwrap().is_empty());
        assert!(
            fx.log.records.lock().unwrap().is_empty(),
            "failed run must stay invisible to the duplicate gate"
        );
    }

    #[tokio::test]
    async fn insert_failure_keeps_intent_for_retry() {
        let staged = intent(PlanTier::Basic);
        let intent_id = staged.id;
        let event = completed_event("evt_insert_fail", &staged);
        let fx = Fixture {
            store: Arc::new(MockCardStore {
                fail_insert: true,
                ..MockCardStore::with_intent(staged)
            }),
            blobs: Arc::new(FakeBlobStore::default()),
            renderer: Arc::new(MockRenderer::default()),
            mailer: Arc::new(MockMailer::default()),
            log: Arc::new(MockEventLog::default()),
        };

        let result = fx.handler().handle(event).await;

        assert!(matches!(result, Err(ProvisionError::Persistence(_))));
        assert!(fx.store.intents.lock().unwrap().contains_key(&intent_id));
        assert!(fx.mailer.sent.lock().unwrap().is_empty());
        assert!(fx.log.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_conflict_resumes_the_run() {
        let staged = intent(PlanTier::Basic);
        let intent_id = staged.id;
        let event = completed_event("evt_conflict", &staged);
        let fx = Fixture {
            store: Arc::new(MockCardStore {
                conflict_insert: true,
                ..MockCardStore::with_intent(staged)
            }),
            blobs: Arc::new(FakeBlobStore::default()),
            renderer: Arc::new(MockRenderer::default()),
            mailer: Arc::new(MockMailer::default()),
            log: Arc::new(MockEventLog::default()),
        };

        let outcome = fx.handler().handle(event).await.unwrap();

        assert!(matches!(outcome, ProvisionOutcome::Provisioned { .. }));
        assert!(!fx.store.intents.lock().unwrap().contains_key(&intent_id));
        assert_eq!(fx.mailer.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn render_failure_aborts_before_email() {
        let staged = intent(PlanTier::Premium);
        let event = completed_event("evt_render_fail", &staged);
        let fx = Fixture {
            renderer: Arc::new(MockRenderer {
                fail: true,
                ..Default::default()
            }),
            ..fixture(staged)
        };

        let result = fx.handler().handle(event).await;

        assert!(matches!(result, Err(ProvisionError::Render(_))));
        assert!(fx.mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn mailer_failure_is_absorbed_after_persistence() {
        let staged = intent(PlanTier::Basic);
        let intent_id = staged.id;
        let event = completed_event("evt_mail_fail", &staged);
        let fx = Fixture {
            mailer: Arc::new(MockMailer {
                fail: true,
                ..Default::default()
            }),
            ..fixture(staged)
        };

        let outcome = fx.handler().handle(event).await.unwrap();

        assert!(matches!(outcome, ProvisionOutcome::Provisioned { .. }));
        assert_eq!(fx.store.cards.lock().unwrap().len(), 1);
        assert!(!fx.store.intents.lock().unwrap().contains_key(&intent_id));
        assert!(fx.log.records.lock().unwrap().contains_key("evt_mail_fail"));
    }
}
