//! Cache revalidation hook.
//!
//! [`RevalidationHook`] forwards campaign status changes from the
//! [`EventBus`](crate::EventBus) to the presentation layer so pages listing
//! campaigns refresh. Delivery is fire-and-forget: failures are retried with
//! backoff (1 s, 2 s, 4 s), then logged and dropped.

use std::time::Duration;

use tokio::sync::broadcast;

use crate::bus::CampaignEvent;

/// Retry delays in seconds (exponential backoff: 1s, 2s, 4s).
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for revalidation delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// RevalidationHook
// ---------------------------------------------------------------------------

/// Posts campaign events to a single revalidation endpoint.
pub struct RevalidationHook {
    client: reqwest::Client,
    url: String,
    retry_delays: Vec<Duration>,
}

impl RevalidationHook {
    /// Create a hook posting to `url`.
    pub fn new(url: impl Into<String>) -> Result<Self, WebhookError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
            retry_delays: RETRY_DELAYS_SECS
                .iter()
                .map(|s| Duration::from_secs(*s))
                .collect(),
        })
    }

    /// Build the hook from `REVALIDATE_URL`.
    ///
    /// Returns `Ok(None)` when the variable is unset or blank, which disables
    /// revalidation.
    pub fn from_env() -> Result<Option<Self>, WebhookError> {
        match std::env::var("REVALIDATE_URL") {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()).map(Some),
            _ => Ok(None),
        }
    }

    /// Override the backoff schedule.
    pub fn with_retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.retry_delays = delays;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Deliver one event, retrying on failure.
    ///
    /// Returns `Ok(())` on the first successful attempt.
    pub async fn deliver(&self, event: &CampaignEvent) -> Result<(), WebhookError> {
        let payload = revalidation_payload(event);

        for (attempt, delay) in self.retry_delays.iter().enumerate() {
            match self.try_send(&payload).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        url = %self.url,
                        campaign_id = event.campaign_id,
                        error = %e,
                        "Revalidation attempt failed, retrying"
                    );
                    tokio::time::sleep(*delay).await;
                }
            }
        }

        // Final attempt after the last backoff.
        self.try_send(&payload).await.inspect_err(|e| {
            tracing::error!(
                url = %self.url,
                campaign_id = event.campaign_id,
                error = %e,
                "Revalidation failed after all retries"
            );
        })
    }

    /// Consume events from the bus until it closes.
    ///
    /// Each event is delivered on its own task so a slow endpoint never
    /// holds up the receiver.
    pub async fn run(self, mut receiver: broadcast::Receiver<CampaignEvent>) {
        let hook = std::sync::Arc::new(self);
        tracing::info!(url = %hook.url, "Revalidation hook started");

        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let hook = hook.clone();
                    tokio::spawn(async move {
                        // Errors are already logged inside `deliver`.
                        let _ = hook.deliver(&event).await;
                    });
                }
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    tracing::warn!(count, "Revalidation hook lagged, skipped events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, revalidation hook shutting down");
                    break;
                }
            }
        }
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, payload: &serde_json::Value) -> Result<(), WebhookError> {
        let response = self.client.post(&self.url).json(payload).send().await?;
        if !response.status().is_success() {
            return Err(WebhookError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Body sent to the revalidation endpoint.
fn revalidation_payload(event: &CampaignEvent) -> serde_json::Value {
    serde_json::json!({
        "event_type": event.event_type,
        "tenant_id": event.tenant_id,
        "campaign_id": event.campaign_id,
        "status": event.status,
        "paths": ["/campaigns", format!("/campaigns/{}", event.campaign_id)],
        "timestamp": event.timestamp,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
