//! Sender profile model.
//!
//! Every column except `user_id` is nullable; callers coalesce.

use beacon_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `profiles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SenderProfile {
    pub user_id: DbId,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub years_of_experience: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SenderProfile {
    /// Trimmed display name, `None` when blank or missing.
    pub fn display_name(&self) -> Option<&str> {
        self.full_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

/// DTO for creating or replacing a profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpsertProfile {
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub years_of_experience: Option<i32>,
}
