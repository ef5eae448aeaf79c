//! Subscriber entity model, recipient projection and DTOs.

use beacon_core::status::{StatusId, SubscriberSource, SubscriberStatus};
use beacon_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `subscribers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscriber {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub email: String,
    pub status_id: StatusId,
    pub source_id: StatusId,
    pub tags: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The minimal subscriber projection needed for delivery.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct RecipientRow {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub status_id: StatusId,
}

/// DTO for creating a subscriber.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscriber {
    pub name: String,
    pub email: String,
    pub status: Option<SubscriberStatus>,
    pub source: Option<SubscriberSource>,
    #[serde(default)]
    pub tags: Vec<String>,
}
