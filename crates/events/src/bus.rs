//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`CampaignEvent`]s. It is
//! designed to be shared via `Arc<EventBus>` across the application.

use beacon_core::status::CampaignStatus;
use beacon_core::types::{DbId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Emitted once a campaign has been claimed for sending.
pub const EVENT_CAMPAIGN_SENDING: &str = "campaign.sending";
/// Emitted when every batch of a campaign was accepted.
pub const EVENT_CAMPAIGN_SENT: &str = "campaign.sent";
/// Emitted when a dispatch ends with any failed batch or aborts.
pub const EVENT_CAMPAIGN_FAILED: &str = "campaign.failed";

// ---------------------------------------------------------------------------
// CampaignEvent
// ---------------------------------------------------------------------------

/// A campaign status change.
///
/// Constructed via [`CampaignEvent::new`] and enriched with
/// [`with_payload`](CampaignEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignEvent {
    /// Dot-separated event name, e.g. `"campaign.sent"`.
    pub event_type: String,

    /// Owning tenant.
    pub tenant_id: DbId,

    pub campaign_id: DbId,

    /// Status the campaign moved to.
    pub status: CampaignStatus,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: Timestamp,
}

impl CampaignEvent {
    /// Create an event for a status change.
    pub fn new(
        event_type: impl Into<String>,
        tenant_id: DbId,
        campaign_id: DbId,
        status: CampaignStatus,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            tenant_id,
            campaign_id,
            status,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Shorthand for the event matching a status the dispatcher writes.
    pub fn for_status(tenant_id: DbId, campaign_id: DbId, status: CampaignStatus) -> Self {
        let event_type = match status {
            CampaignStatus::Sent => EVENT_CAMPAIGN_SENT,
            CampaignStatus::Failed => EVENT_CAMPAIGN_FAILED,
            _ => EVENT_CAMPAIGN_SENDING,
        };
        Self::new(event_type, tenant_id, campaign_id, status)
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`CampaignEvent`].
pub struct EventBus {
    sender: broadcast::Sender<CampaignEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: CampaignEvent) {
        // Ignore the SendError; it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<CampaignEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
