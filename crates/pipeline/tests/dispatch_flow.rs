//! End-to-end dispatch behaviour against an in-memory store and a scripted
//! provider.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use beacon_core::campaign::CampaignOutcome;
use beacon_core::filters::ResolvedFilters;
use beacon_core::status::{CampaignStatus, SubscriberSource, SubscriberStatus};
use beacon_core::template::{EmailRenderer, RECIPIENT_EMAIL_PLACEHOLDER};
use beacon_core::types::DbId;
use beacon_db::models::campaign::Campaign;
use beacon_db::models::profile::SenderProfile;
use beacon_db::models::subscriber::RecipientRow;
use beacon_events::bus::{EVENT_CAMPAIGN_FAILED, EVENT_CAMPAIGN_SENDING, EVENT_CAMPAIGN_SENT};
use beacon_events::{
    BatchDelivery, DeliveryConfig, EventBus, ProviderError, SendReceipt, TransactionalEmail,
    TransactionalEmailProvider,
};
use beacon_pipeline::{CampaignDispatcher, DispatchError, DispatchStore};
use chrono::Utc;

const TENANT_A: DbId = 1;
const TENANT_B: DbId = 2;

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

struct StoredSubscriber {
    tenant_id: DbId,
    row: RecipientRow,
    source: SubscriberSource,
    tags: Vec<String>,
}

#[derive(Default)]
struct MemoryState {
    campaigns: Vec<Campaign>,
    profiles: HashMap<DbId, SenderProfile>,
    subscribers: Vec<StoredSubscriber>,
    /// When set, `complete` reports this many rows without writing.
    complete_rows_override: Option<u64>,
    /// When set, `begin_sending` loses the claim as if another dispatch won.
    lose_claim: bool,
    mark_failed_calls: usize,
}

#[derive(Default)]
struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    fn campaign(&self, id: DbId) -> Campaign {
        let state = self.state.lock().unwrap();
        state.campaigns.iter().find(|c| c.id == id).cloned().unwrap()
    }

    fn status_of(&self, id: DbId) -> CampaignStatus {
        CampaignStatus::from_id(self.campaign(id).status_id).unwrap()
    }

    fn add_campaign(&self, id: DbId, tenant_id: DbId, filters: serde_json::Value) {
        let now = Utc::now();
        self.state.lock().unwrap().campaigns.push(Campaign {
            id,
            user_id: tenant_id,
            subject: "Spring newsletter".to_string(),
            content: "<p>Hello <strong>friends</strong></p>".to_string(),
            template_id: None,
            recipient_filters: filters,
            status_id: CampaignStatus::Draft.id(),
            total_recipients: 0,
            sent_count: 0,
            open_count: 0,
            click_count: 0,
            bounce_count: 0,
            unsubscribe_count: 0,
            created_at: now,
            updated_at: now,
            sent_at: None,
        });
    }

    fn set_status(&self, id: DbId, status: CampaignStatus) {
        let mut state = self.state.lock().unwrap();
        let campaign = state.campaigns.iter_mut().find(|c| c.id == id).unwrap();
        campaign.status_id = status.id();
    }

    fn add_profile(&self, tenant_id: DbId, name: Option<&str>) {
        let now = Utc::now();
        self.state.lock().unwrap().profiles.insert(
            tenant_id,
            SenderProfile {
                user_id: tenant_id,
                full_name: name.map(str::to_string),
                company_name: None,
                email: Some(format!("owner{tenant_id}@example.com")),
                years_of_experience: Some(12),
                created_at: now,
                updated_at: now,
            },
        );
    }

    fn add_subscribers(
        &self,
        tenant_id: DbId,
        count: usize,
        status: SubscriberStatus,
        source: SubscriberSource,
        tags: &[&str],
    ) {
        let mut state = self.state.lock().unwrap();
        for _ in 0..count {
            let id = state.subscribers.len() as DbId + 1;
            state.subscribers.push(StoredSubscriber {
                tenant_id,
                row: RecipientRow {
                    id,
                    name: format!("Reader {id}"),
                    email: format!("reader{id}@example.com"),
                    status_id: status.id(),
                },
                source,
                tags: tags.iter().map(|t| t.to_string()).collect(),
            });
        }
    }
}

#[async_trait]
impl DispatchStore for MemoryStore {
    async fn load_campaign(
        &self,
        tenant_id: DbId,
        id: DbId,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .campaigns
            .iter()
            .find(|c| c.id == id && c.user_id == tenant_id)
            .cloned())
    }

    async fn load_sender(&self, tenant_id: DbId) -> Result<Option<SenderProfile>, sqlx::Error> {
        Ok(self.state.lock().unwrap().profiles.get(&tenant_id).cloned())
    }

    async fn find_recipients(
        &self,
        tenant_id: DbId,
        filters: &ResolvedFilters,
    ) -> Result<Vec<RecipientRow>, sqlx::Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .subscribers
            .iter()
            .filter(|s| s.tenant_id == tenant_id)
            .filter(|s| {
                let status = SubscriberStatus::from_id(s.row.status_id).unwrap();
                filters.matches(status, s.source, &s.tags)
            })
            .map(|s| s.row.clone())
            .collect())
    }

    async fn begin_sending(&self, tenant_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        if state.lose_claim {
            return Ok(false);
        }
        match state
            .campaigns
            .iter_mut()
            .find(|c| {
                c.id == id && c.user_id == tenant_id && c.status_id == CampaignStatus::Draft.id()
            })
        {
            Some(c) => {
                c.status_id = CampaignStatus::Sending.id();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn complete(
        &self,
        tenant_id: DbId,
        id: DbId,
        outcome: &CampaignOutcome,
    ) -> Result<u64, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        if let Some(rows) = state.complete_rows_override {
            return Ok(rows);
        }
        let allowed = [CampaignStatus::Sending.id(), outcome.status.id()];
        match state
            .campaigns
            .iter_mut()
            .find(|c| c.id == id && c.user_id == tenant_id && allowed.contains(&c.status_id))
        {
            Some(c) => {
                c.status_id = outcome.status.id();
                c.total_recipients = outcome.total_recipients;
                c.sent_count = outcome.sent_count;
                if outcome.status == CampaignStatus::Sent {
                    c.sent_at = Some(Utc::now());
                }
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn mark_failed(&self, tenant_id: DbId, id: DbId) -> Result<u64, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        state.mark_failed_calls += 1;
        let allowed = [CampaignStatus::Sending.id(), CampaignStatus::Failed.id()];
        match state
            .campaigns
            .iter_mut()
            .find(|c| c.id == id && c.user_id == tenant_id && allowed.contains(&c.status_id))
        {
            Some(c) => {
                c.status_id = CampaignStatus::Failed.id();
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

// ---------------------------------------------------------------------------
// Scripted provider
// ---------------------------------------------------------------------------

/// Records every message and rejects the calls listed in `fail_calls`
/// (1-based).
#[derive(Default)]
struct ScriptedProvider {
    sent: Mutex<Vec<TransactionalEmail>>,
    fail_calls: Vec<usize>,
    fail_all: bool,
}

impl ScriptedProvider {
    fn failing(calls: &[usize]) -> Self {
        Self {
            fail_calls: calls.to_vec(),
            ..Self::default()
        }
    }

    fn failing_all() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    fn batch_sizes(&self) -> Vec<usize> {
        self.sent.lock().unwrap().iter().map(|m| m.to.len()).collect()
    }

    fn sent(&self) -> Vec<TransactionalEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionalEmailProvider for ScriptedProvider {
    async fn send(&self, email: &TransactionalEmail) -> Result<SendReceipt, ProviderError> {
        let call = {
            let mut sent = self.sent.lock().unwrap();
            sent.push(email.clone());
            sent.len()
        };
        if self.fail_all || self.fail_calls.contains(&call) {
            return Err(ProviderError::Api {
                status: 400,
                body: "invalid recipient".to_string(),
            });
        }
        Ok(SendReceipt {
            message_id: Some(format!("<{call}@provider>")),
        })
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    store: Arc<MemoryStore>,
    provider: Arc<ScriptedProvider>,
    bus: Arc<EventBus>,
    dispatcher: CampaignDispatcher,
}

fn harness(provider: ScriptedProvider) -> Harness {
    let store = Arc::new(MemoryStore::default());
    let provider = Arc::new(provider);
    let bus = Arc::new(EventBus::default());
    let delivery = BatchDelivery::new(
        provider.clone(),
        DeliveryConfig {
            batch_size: 50,
            batch_delay: Duration::from_secs(1),
            batch_timeout: Duration::from_secs(30),
            retry_delays: vec![],
        },
    );
    let dispatcher = CampaignDispatcher::new(
        store.clone(),
        delivery,
        EmailRenderer::new("https://app.example.com"),
        bus.clone(),
    );
    Harness {
        store,
        provider,
        bus,
        dispatcher,
    }
}

fn no_filters() -> serde_json::Value {
    serde_json::json!({})
}

fn drain_event_types(
    rx: &mut tokio::sync::broadcast::Receiver<beacon_events::CampaignEvent>,
) -> Vec<String> {
    let mut types = Vec::new();
    while let Ok(event) = rx.try_recv() {
        types.push(event.event_type);
    }
    types
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn successful_dispatch_marks_campaign_sent() {
    let h = harness(ScriptedProvider::default());
    h.store.add_profile(TENANT_A, Some("Dana Reyes"));
    h.store
        .add_subscribers(TENANT_A, 30, SubscriberStatus::Active, SubscriberSource::Website, &[]);
    h.store.add_campaign(10, TENANT_A, no_filters());
    let mut rx = h.bus.subscribe();

    let result = h.dispatcher.dispatch(TENANT_A, 10).await.unwrap();

    assert!(result.success);
    assert_eq!(result.recipient_count, 30);
    assert_eq!(result.message, "Campaign sent to 30 recipients");

    let campaign = h.store.campaign(10);
    assert_eq!(h.store.status_of(10), CampaignStatus::Sent);
    assert_eq!(campaign.total_recipients, 30);
    assert!(campaign.sent_count <= campaign.total_recipients);
    assert!(campaign.sent_at.is_some());

    assert_eq!(
        drain_event_types(&mut rx),
        vec![EVENT_CAMPAIGN_SENDING, EVENT_CAMPAIGN_SENT]
    );
}

#[tokio::test(start_paused = true)]
async fn envelope_uses_owner_as_sender_and_reply_to() {
    let h = harness(ScriptedProvider::default());
    h.store.add_profile(TENANT_A, Some("Dana Reyes"));
    h.store
        .add_subscribers(TENANT_A, 2, SubscriberStatus::Active, SubscriberSource::Manual, &[]);
    h.store.add_campaign(10, TENANT_A, no_filters());

    h.dispatcher.dispatch(TENANT_A, 10).await.unwrap();

    let sent = h.provider.sent();
    assert_eq!(sent.len(), 1);
    let message = &sent[0];
    assert_eq!(message.subject, "Spring newsletter");
    assert_eq!(message.sender.email, "owner1@example.com");
    assert_eq!(message.sender.name.as_deref(), Some("Dana Reyes"));
    assert_eq!(message.reply_to, message.sender);
    assert!(message.html_content.contains("<strong>friends</strong>"));
    assert!(message.html_content.contains("12 years of experience"));
    assert!(message.html_content.contains(RECIPIENT_EMAIL_PLACEHOLDER));
}

#[tokio::test(start_paused = true)]
async fn one_failed_batch_of_three_is_partial_failure() {
    let h = harness(ScriptedProvider::failing(&[2]));
    h.store.add_profile(TENANT_A, Some("Dana Reyes"));
    h.store
        .add_subscribers(TENANT_A, 120, SubscriberStatus::Active, SubscriberSource::Import, &[]);
    h.store.add_campaign(10, TENANT_A, no_filters());
    let mut rx = h.bus.subscribe();

    let result = h.dispatcher.dispatch(TENANT_A, 10).await.unwrap();

    assert_eq!(h.provider.batch_sizes(), vec![50, 50, 20]);
    assert!(!result.success);
    assert_eq!(result.report.total_batches, 3);
    assert_eq!(result.report.successful_batches, 2);
    assert_eq!(result.report.failed_batches, 1);
    assert_eq!(result.message, "Campaign partially sent: 1 of 3 batches failed");

    let campaign = h.store.campaign(10);
    assert_eq!(h.store.status_of(10), CampaignStatus::Failed);
    assert_eq!(campaign.total_recipients, 120);
    assert_eq!(campaign.sent_count, 70);
    assert!(campaign.sent_at.is_none());

    assert_eq!(
        drain_event_types(&mut rx),
        vec![EVENT_CAMPAIGN_SENDING, EVENT_CAMPAIGN_FAILED]
    );
}

#[tokio::test(start_paused = true)]
async fn all_batches_failing_is_total_failure() {
    let h = harness(ScriptedProvider::failing_all());
    h.store.add_profile(TENANT_A, Some("Dana Reyes"));
    h.store
        .add_subscribers(TENANT_A, 60, SubscriberStatus::Active, SubscriberSource::Api, &[]);
    h.store.add_campaign(10, TENANT_A, no_filters());

    let err = h.dispatcher.dispatch(TENANT_A, 10).await.unwrap_err();

    assert_matches!(err, DispatchError::ProviderTotalFailure { failed_batches: 2, .. });
    assert_eq!(h.store.status_of(10), CampaignStatus::Failed);
    assert_eq!(h.store.campaign(10).sent_count, 0);
    assert_eq!(h.provider.batch_sizes(), vec![50, 10]);
}

#[tokio::test(start_paused = true)]
async fn non_draft_campaign_is_rejected_without_sending() {
    for status in [
        CampaignStatus::Scheduled,
        CampaignStatus::Sending,
        CampaignStatus::Sent,
        CampaignStatus::Failed,
    ] {
        let h = harness(ScriptedProvider::default());
        h.store.add_profile(TENANT_A, Some("Dana Reyes"));
        h.store
            .add_subscribers(TENANT_A, 5, SubscriberStatus::Active, SubscriberSource::Manual, &[]);
        h.store.add_campaign(10, TENANT_A, no_filters());
        h.store.set_status(10, status);

        let err = h.dispatcher.dispatch(TENANT_A, 10).await.unwrap_err();

        assert_matches!(err, DispatchError::InvalidState(_));
        assert!(h.provider.sent().is_empty());
        assert_eq!(h.store.status_of(10), status);
    }
}

#[tokio::test(start_paused = true)]
async fn no_matching_recipients_leaves_campaign_draft() {
    let h = harness(ScriptedProvider::default());
    h.store.add_profile(TENANT_A, Some("Dana Reyes"));
    h.store
        .add_subscribers(TENANT_A, 5, SubscriberStatus::Inactive, SubscriberSource::Manual, &[]);
    h.store
        .add_campaign(10, TENANT_A, serde_json::json!({ "statuses": ["active"] }));

    let err = h.dispatcher.dispatch(TENANT_A, 10).await.unwrap_err();

    assert_matches!(err, DispatchError::NoRecipients { campaign_id: 10 });
    assert_eq!(h.store.status_of(10), CampaignStatus::Draft);
    assert!(h.provider.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn missing_campaign_is_not_found() {
    let h = harness(ScriptedProvider::default());
    h.store.add_profile(TENANT_A, Some("Dana Reyes"));

    let err = h.dispatcher.dispatch(TENANT_A, 404).await.unwrap_err();

    assert_matches!(err, DispatchError::NotFound { entity: "Campaign", id: 404 });
}

#[tokio::test(start_paused = true)]
async fn other_tenants_campaign_is_not_found() {
    let h = harness(ScriptedProvider::default());
    h.store.add_profile(TENANT_A, Some("Dana Reyes"));
    h.store.add_profile(TENANT_B, Some("Sam Okafor"));
    h.store
        .add_subscribers(TENANT_B, 5, SubscriberStatus::Active, SubscriberSource::Manual, &[]);
    h.store.add_campaign(10, TENANT_B, no_filters());

    let err = h.dispatcher.dispatch(TENANT_A, 10).await.unwrap_err();

    assert_matches!(err, DispatchError::NotFound { entity: "Campaign", .. });
    assert_eq!(h.store.status_of(10), CampaignStatus::Draft);
}

#[tokio::test(start_paused = true)]
async fn recipients_never_cross_tenants() {
    let h = harness(ScriptedProvider::default());
    h.store.add_profile(TENANT_A, Some("Dana Reyes"));
    h.store.add_subscribers(
        TENANT_A,
        3,
        SubscriberStatus::Active,
        SubscriberSource::Website,
        &["vip"],
    );
    h.store.add_subscribers(
        TENANT_B,
        40,
        SubscriberStatus::Active,
        SubscriberSource::Website,
        &["vip"],
    );
    h.store.add_campaign(
        10,
        TENANT_A,
        serde_json::json!({ "statuses": ["active"], "sources": ["website"], "tags": ["vip"] }),
    );

    let result = h.dispatcher.dispatch(TENANT_A, 10).await.unwrap();

    assert_eq!(result.recipient_count, 3);
    let addressed: Vec<String> = h
        .provider
        .sent()
        .into_iter()
        .flat_map(|m| m.to.into_iter().map(|to| to.email))
        .collect();
    assert_eq!(
        addressed,
        vec!["reader1@example.com", "reader2@example.com", "reader3@example.com"]
    );
}

#[tokio::test(start_paused = true)]
async fn tag_filter_matches_any_listed_tag() {
    let h = harness(ScriptedProvider::default());
    h.store.add_profile(TENANT_A, Some("Dana Reyes"));
    h.store
        .add_subscribers(TENANT_A, 2, SubscriberStatus::Active, SubscriberSource::Manual, &["vip"]);
    h.store.add_subscribers(
        TENANT_A,
        3,
        SubscriberStatus::Pending,
        SubscriberSource::Import,
        &["beta"],
    );
    h.store.add_subscribers(
        TENANT_A,
        4,
        SubscriberStatus::Active,
        SubscriberSource::Manual,
        &["other"],
    );
    h.store
        .add_campaign(10, TENANT_A, serde_json::json!({ "tags": ["vip", "beta"] }));

    let result = h.dispatcher.dispatch(TENANT_A, 10).await.unwrap();

    assert_eq!(result.recipient_count, 5);
}

#[tokio::test(start_paused = true)]
async fn unknown_filter_name_fails_validation() {
    let h = harness(ScriptedProvider::default());
    h.store.add_profile(TENANT_A, Some("Dana Reyes"));
    h.store
        .add_subscribers(TENANT_A, 5, SubscriberStatus::Active, SubscriberSource::Manual, &[]);
    h.store
        .add_campaign(10, TENANT_A, serde_json::json!({ "statuses": ["subscribed"] }));

    let err = h.dispatcher.dispatch(TENANT_A, 10).await.unwrap_err();

    assert_matches!(err, DispatchError::Validation(_));
    assert_eq!(h.store.status_of(10), CampaignStatus::Draft);
}

#[tokio::test(start_paused = true)]
async fn sender_without_name_is_incomplete() {
    let h = harness(ScriptedProvider::default());
    h.store.add_profile(TENANT_A, Some("   "));
    h.store
        .add_subscribers(TENANT_A, 5, SubscriberStatus::Active, SubscriberSource::Manual, &[]);
    h.store.add_campaign(10, TENANT_A, no_filters());

    let err = h.dispatcher.dispatch(TENANT_A, 10).await.unwrap_err();

    assert_matches!(err, DispatchError::IncompleteSender(_));
    assert_eq!(h.store.status_of(10), CampaignStatus::Draft);
}

#[tokio::test(start_paused = true)]
async fn missing_sender_profile_is_not_found() {
    let h = harness(ScriptedProvider::default());
    h.store
        .add_subscribers(TENANT_A, 5, SubscriberStatus::Active, SubscriberSource::Manual, &[]);
    h.store.add_campaign(10, TENANT_A, no_filters());

    let err = h.dispatcher.dispatch(TENANT_A, 10).await.unwrap_err();

    assert_matches!(err, DispatchError::NotFound { entity: "Sender profile", id: TENANT_A });
}

#[tokio::test(start_paused = true)]
async fn zero_row_completion_is_persistence_failure_and_recovers() {
    let h = harness(ScriptedProvider::default());
    h.store.add_profile(TENANT_A, Some("Dana Reyes"));
    h.store
        .add_subscribers(TENANT_A, 5, SubscriberStatus::Active, SubscriberSource::Manual, &[]);
    h.store.add_campaign(10, TENANT_A, no_filters());
    h.store.state.lock().unwrap().complete_rows_override = Some(0);
    let mut rx = h.bus.subscribe();

    let err = h.dispatcher.dispatch(TENANT_A, 10).await.unwrap_err();

    assert_matches!(err, DispatchError::Persistence(_));
    assert_eq!(h.store.state.lock().unwrap().mark_failed_calls, 1);
    assert_eq!(h.store.status_of(10), CampaignStatus::Failed);
    assert_eq!(
        drain_event_types(&mut rx),
        vec![EVENT_CAMPAIGN_SENDING, EVENT_CAMPAIGN_FAILED]
    );
}

#[tokio::test(start_paused = true)]
async fn second_dispatch_of_sent_campaign_is_rejected() {
    let h = harness(ScriptedProvider::default());
    h.store.add_profile(TENANT_A, Some("Dana Reyes"));
    h.store
        .add_subscribers(TENANT_A, 5, SubscriberStatus::Active, SubscriberSource::Manual, &[]);
    h.store.add_campaign(10, TENANT_A, no_filters());

    h.dispatcher.dispatch(TENANT_A, 10).await.unwrap();
    let err = h.dispatcher.dispatch(TENANT_A, 10).await.unwrap_err();

    assert_matches!(err, DispatchError::InvalidState(_));
    assert_eq!(h.provider.batch_sizes(), vec![5]);
}

#[tokio::test(start_paused = true)]
async fn lost_claim_is_invalid_state_without_sending_or_recovery() {
    let h = harness(ScriptedProvider::default());
    h.store.add_profile(TENANT_A, Some("Dana Reyes"));
    h.store
        .add_subscribers(TENANT_A, 5, SubscriberStatus::Active, SubscriberSource::Manual, &[]);
    h.store.add_campaign(10, TENANT_A, no_filters());
    h.store.state.lock().unwrap().lose_claim = true;
    let mut rx = h.bus.subscribe();

    let err = h.dispatcher.dispatch(TENANT_A, 10).await.unwrap_err();

    assert_matches!(err, DispatchError::InvalidState(_));
    assert!(h.provider.sent().is_empty());
    assert_eq!(h.store.state.lock().unwrap().mark_failed_calls, 0);
    assert!(drain_event_types(&mut rx).is_empty());
    assert_eq!(h.store.status_of(10), CampaignStatus::Draft);
}

#[tokio::test(start_paused = true)]
async fn dropped_caller_does_not_strand_campaign_in_sending() {
    let h = harness(ScriptedProvider::default());
    h.store.add_profile(TENANT_A, Some("Dana Reyes"));
    h.store.add_subscribers(
        TENANT_A,
        120,
        SubscriberStatus::Active,
        SubscriberSource::Website,
        &[],
    );
    h.store.add_campaign(10, TENANT_A, no_filters());
    let mut rx = h.bus.subscribe();

    // Gives up between the second and third batch.
    let waited = tokio::time::timeout(
        Duration::from_millis(1500),
        h.dispatcher.dispatch(TENANT_A, 10),
    )
    .await;
    assert!(waited.is_err());

    tokio::time::sleep(Duration::from_secs(3600)).await;

    assert_eq!(h.provider.batch_sizes(), vec![50, 50, 20]);
    let campaign = h.store.campaign(10);
    assert_eq!(h.store.status_of(10), CampaignStatus::Sent);
    assert_eq!(campaign.sent_count, 120);
    assert_eq!(
        drain_event_types(&mut rx),
        vec![EVENT_CAMPAIGN_SENDING, EVENT_CAMPAIGN_SENT]
    );
}
