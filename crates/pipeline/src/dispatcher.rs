//! Campaign dispatch orchestration.
//!
//! The dispatcher is the only component that changes a campaign's status.
//! Work before the `Draft -> Sending` claim is read-only, so any failure
//! there leaves the campaign untouched. Once claimed, every exit path ends
//! with the campaign in `Sent` or `Failed`.

use std::sync::Arc;

use beacon_core::campaign::{ensure_dispatchable, CampaignOutcome};
use beacon_core::delivery::{DeliveryReport, Mailbox, SenderIdentity};
use beacon_core::status::CampaignStatus;
use beacon_core::template::{EmailRenderer, TemplateSender};
use beacon_core::types::DbId;
use beacon_db::models::campaign::Campaign;
use beacon_db::models::profile::SenderProfile;
use beacon_events::{BatchDelivery, CampaignEvent, EventBus};
use serde::Serialize;

use crate::error::DispatchError;
use crate::recipients::{resolve_recipients, to_mailboxes};
use crate::store::DispatchStore;

/// Result of a dispatch that reached the provider.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchResult {
    /// `true` iff every batch was accepted.
    pub success: bool,
    pub message: String,
    pub recipient_count: usize,
    pub report: DeliveryReport,
}

/// Everything needed to send, gathered before the campaign is claimed.
struct PreparedSend {
    subject: String,
    html: String,
    sender: SenderIdentity,
    recipients: Vec<Mailbox>,
}

/// Drives campaigns through the dispatch state machine.
pub struct CampaignDispatcher {
    store: Arc<dyn DispatchStore>,
    delivery: BatchDelivery,
    renderer: EmailRenderer,
    events: Arc<EventBus>,
}

impl CampaignDispatcher {
    pub fn new(
        store: Arc<dyn DispatchStore>,
        delivery: BatchDelivery,
        renderer: EmailRenderer,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            store,
            delivery,
            renderer,
            events,
        }
    }

    /// Send campaign `campaign_id` owned by `tenant_id`.
    ///
    /// Returns `Ok` once delivery ran and the outcome was recorded, with
    /// `success == false` when some batches failed. Errors when nothing
    /// could be sent, when every batch failed, or when the final status
    /// could not be written.
    ///
    /// Everything from the `Draft -> Sending` claim onward runs on a
    /// detached task. Dropping the returned future (a request timeout, a
    /// disconnected client) stops the wait, not the dispatch.
    pub async fn dispatch(
        &self,
        tenant_id: DbId,
        campaign_id: DbId,
    ) -> Result<DispatchResult, DispatchError> {
        let prepared = self.prepare(tenant_id, campaign_id).await?;

        let run = DispatchRun {
            store: Arc::clone(&self.store),
            delivery: self.delivery.clone(),
            events: Arc::clone(&self.events),
            tenant_id,
            campaign_id,
        };
        match tokio::spawn(run.execute(prepared)).await {
            Ok(result) => result,
            Err(join_err) => {
                let err =
                    DispatchError::Internal(format!("dispatch task aborted: {join_err}"));
                recover(self.store.as_ref(), &self.events, tenant_id, campaign_id, &err).await;
                Err(err)
            }
        }
    }

    /// Load, validate, resolve and render. Performs no writes.
    async fn prepare(
        &self,
        tenant_id: DbId,
        campaign_id: DbId,
    ) -> Result<PreparedSend, DispatchError> {
        let campaign = self
            .store
            .load_campaign(tenant_id, campaign_id)
            .await?
            .ok_or(DispatchError::NotFound {
                entity: "Campaign",
                id: campaign_id,
            })?;
        ensure_dispatchable(campaign.status()?)?;

        let profile = self
            .store
            .load_sender(tenant_id)
            .await?
            .ok_or(DispatchError::NotFound {
                entity: "Sender profile",
                id: tenant_id,
            })?;
        let sender = template_sender(&profile)?;

        let filters = campaign.filters()?;
        let rows =
            resolve_recipients(self.store.as_ref(), tenant_id, campaign_id, &filters).await?;

        let html = self.render(&campaign, &sender)?;
        Ok(PreparedSend {
            subject: campaign.subject,
            html,
            sender: SenderIdentity {
                name: sender.name,
                email: sender.email,
            },
            recipients: to_mailboxes(&rows),
        })
    }

    fn render(
        &self,
        campaign: &Campaign,
        sender: &TemplateSender,
    ) -> Result<String, DispatchError> {
        Ok(self
            .renderer
            .render(&campaign.subject, &campaign.content, sender)?)
    }
}

/// The part of a dispatch that mutates the campaign. Owns its handles so it
/// can run on its own task.
struct DispatchRun {
    store: Arc<dyn DispatchStore>,
    delivery: BatchDelivery,
    events: Arc<EventBus>,
    tenant_id: DbId,
    campaign_id: DbId,
}

impl DispatchRun {
    async fn execute(self, prepared: PreparedSend) -> Result<DispatchResult, DispatchError> {
        let (tenant_id, campaign_id) = (self.tenant_id, self.campaign_id);

        if !self.store.begin_sending(tenant_id, campaign_id).await? {
            tracing::warn!(tenant_id, campaign_id, "Campaign was claimed concurrently");
            return Err(DispatchError::InvalidState(format!(
                "campaign {campaign_id} is no longer a draft"
            )));
        }
        tracing::info!(
            tenant_id,
            campaign_id,
            recipient_count = prepared.recipients.len(),
            "Campaign marked as sending"
        );
        self.events.publish(
            CampaignEvent::for_status(tenant_id, campaign_id, CampaignStatus::Sending)
                .with_payload(serde_json::json!({
                    "recipient_count": prepared.recipients.len(),
                })),
        );

        let (outcome, report) = match self.deliver(&prepared).await {
            Ok(done) => done,
            Err(e) => {
                recover(self.store.as_ref(), &self.events, tenant_id, campaign_id, &e).await;
                return Err(e);
            }
        };

        self.events.publish(
            CampaignEvent::for_status(tenant_id, campaign_id, outcome.status).with_payload(
                serde_json::json!({
                    "total_recipients": outcome.total_recipients,
                    "sent_count": outcome.sent_count,
                    "successful_batches": report.successful_batches,
                    "failed_batches": report.failed_batches,
                }),
            ),
        );

        if report.all_failed() {
            let message = report.first_error().unwrap_or("unknown error").to_string();
            tracing::error!(
                tenant_id,
                campaign_id,
                failed_batches = report.failed_batches,
                error = %message,
                "Every batch failed"
            );
            return Err(DispatchError::ProviderTotalFailure {
                failed_batches: report.failed_batches,
                message,
            });
        }

        let recipient_count = prepared.recipients.len();
        let message = if report.success() {
            format!("Campaign sent to {recipient_count} recipients")
        } else {
            format!(
                "Campaign partially sent: {} of {} batches failed",
                report.failed_batches, report.total_batches
            )
        };
        tracing::info!(
            tenant_id,
            campaign_id,
            status = %outcome.status,
            sent_count = outcome.sent_count,
            "Campaign dispatch finished"
        );

        Ok(DispatchResult {
            success: report.success(),
            message,
            recipient_count,
            report,
        })
    }

    /// Send every batch and record the terminal status.
    async fn deliver(
        &self,
        prepared: &PreparedSend,
    ) -> Result<(CampaignOutcome, DeliveryReport), DispatchError> {
        let report = self
            .delivery
            .send_batched(
                &prepared.recipients,
                &prepared.subject,
                &prepared.html,
                &prepared.sender,
            )
            .await;

        let outcome = CampaignOutcome::from_report(&report);
        let rows = self
            .store
            .complete(self.tenant_id, self.campaign_id, &outcome)
            .await?;
        if rows == 0 {
            return Err(DispatchError::Persistence(format!(
                "status update to {} for campaign {} affected no rows",
                outcome.status, self.campaign_id
            )));
        }
        Ok((outcome, report))
    }
}

/// Force a claimed campaign to `Failed` after an aborted dispatch.
///
/// Best effort: a failure here is logged and the original error wins.
async fn recover(
    store: &dyn DispatchStore,
    events: &EventBus,
    tenant_id: DbId,
    campaign_id: DbId,
    cause: &DispatchError,
) {
    tracing::error!(
        tenant_id,
        campaign_id,
        error = %cause,
        "Dispatch aborted, marking campaign failed"
    );
    match store.mark_failed(tenant_id, campaign_id).await {
        Ok(0) => {
            tracing::error!(tenant_id, campaign_id, "Recovery write affected no rows");
        }
        Ok(_) => {
            events.publish(
                CampaignEvent::for_status(tenant_id, campaign_id, CampaignStatus::Failed)
                    .with_payload(serde_json::json!({ "error": cause.to_string() })),
            );
        }
        Err(e) => {
            tracing::error!(tenant_id, campaign_id, error = %e, "Recovery write failed");
        }
    }
}

/// Validate the owner's profile for use as sender.
fn template_sender(profile: &SenderProfile) -> Result<TemplateSender, DispatchError> {
    let name = profile
        .display_name()
        .ok_or_else(|| DispatchError::IncompleteSender("sender name is required".into()))?;
    let email = profile
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| DispatchError::IncompleteSender("sender email is required".into()))?;

    Ok(TemplateSender {
        name: name.to_string(),
        company_name: profile.company_name.clone(),
        email: email.to_string(),
        years_of_experience: profile.years_of_experience,
    })
}
