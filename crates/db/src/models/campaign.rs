//! Campaign entity model and DTOs.

use beacon_core::error::CoreError;
use beacon_core::filters::RecipientFilters;
use beacon_core::status::{CampaignStatus, StatusId};
use beacon_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `campaigns` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Campaign {
    pub id: DbId,
    pub user_id: DbId,
    pub subject: String,
    pub content: String,
    pub template_id: Option<DbId>,
    pub recipient_filters: serde_json::Value,
    pub status_id: StatusId,
    pub total_recipients: i32,
    pub sent_count: i32,
    pub open_count: i32,
    pub click_count: i32,
    pub bounce_count: i32,
    pub unsubscribe_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub sent_at: Option<Timestamp>,
}

impl Campaign {
    /// Decode `status_id`.
    ///
    /// Fails on ids outside the lookup table rather than guessing.
    pub fn status(&self) -> Result<CampaignStatus, CoreError> {
        CampaignStatus::from_id(self.status_id).ok_or_else(|| {
            CoreError::Internal(format!(
                "campaign {} has unknown status_id {}",
                self.id, self.status_id
            ))
        })
    }

    /// Decode the JSONB audience filters.
    pub fn filters(&self) -> Result<RecipientFilters, CoreError> {
        RecipientFilters::from_json(&self.recipient_filters)
    }
}

/// DTO for creating a draft campaign.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaign {
    pub subject: String,
    pub content: String,
    pub template_id: Option<DbId>,
    #[serde(default)]
    pub recipient_filters: RecipientFilters,
}
