//! Campaign lifecycle state machine.
//!
//! ```text
//! Draft ──► Sending ──► Sent
//!   ▲  │              └─► Failed
//!   │  ▼
//! Scheduled
//! ```
//!
//! Only `Draft` campaigns may be dispatched. `Scheduled` is owned by an
//! external scheduler which moves it back to `Draft` before dispatch.

use serde::Serialize;

use crate::delivery::DeliveryReport;
use crate::error::CoreError;
use crate::status::CampaignStatus;

/// Whether the lifecycle allows moving from `from` to `to`.
pub fn can_transition(from: CampaignStatus, to: CampaignStatus) -> bool {
    use CampaignStatus::*;
    matches!(
        (from, to),
        (Draft, Sending)
            | (Draft, Scheduled)
            | (Scheduled, Draft)
            | (Sending, Sent)
            | (Sending, Failed)
    )
}

/// Guard run before any dispatch work: the campaign must be exactly `Draft`.
pub fn ensure_dispatchable(status: CampaignStatus) -> Result<(), CoreError> {
    if can_transition(status, CampaignStatus::Sending) {
        Ok(())
    } else {
        Err(CoreError::InvalidState(format!(
            "campaign is {status}, only draft campaigns can be sent"
        )))
    }
}

/// Final persisted result of a dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CampaignOutcome {
    /// `Sent` when every batch succeeded, otherwise `Failed`.
    pub status: CampaignStatus,
    pub total_recipients: i32,
    /// Recipients in successful batches. Never exceeds `total_recipients`.
    pub sent_count: i32,
}

impl CampaignOutcome {
    /// Derive the terminal status and counts from a delivery report.
    pub fn from_report(report: &DeliveryReport) -> Self {
        let status = if report.success() {
            CampaignStatus::Sent
        } else {
            CampaignStatus::Failed
        };
        let total = saturating_i32(report.total_recipients);
        let sent = saturating_i32(report.delivered_recipients()).min(total);
        Self {
            status,
            total_recipients: total,
            sent_count: sent,
        }
    }
}

fn saturating_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}
