//! Repository for the `campaigns` table.
//!
//! Status writes used by dispatch are guarded on the current `status_id`
//! and report `rows_affected`, so callers can tell a lost race or a stale
//! row from a successful write.

use beacon_core::campaign::CampaignOutcome;
use beacon_core::status::CampaignStatus;
use beacon_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::campaign::{Campaign, CreateCampaign};

/// Column list for `campaigns` queries.
const COLUMNS: &str = "\
    id, user_id, subject, content, template_id, recipient_filters, status_id, \
    total_recipients, sent_count, open_count, click_count, bounce_count, \
    unsubscribe_count, created_at, updated_at, sent_at";

/// Provides CRUD and status transitions for campaigns.
pub struct CampaignRepo;

impl CampaignRepo {
    /// Create a new draft campaign for a tenant.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateCampaign,
    ) -> Result<Campaign, sqlx::Error> {
        let query = format!(
            "INSERT INTO campaigns \
             (user_id, subject, content, template_id, recipient_filters, status_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(user_id)
            .bind(&input.subject)
            .bind(&input.content)
            .bind(input.template_id)
            .bind(Json(&input.recipient_filters))
            .bind(CampaignStatus::Draft.id())
            .fetch_one(pool)
            .await
    }

    /// Find a campaign owned by `user_id`.
    ///
    /// A campaign belonging to another tenant is indistinguishable from a
    /// missing one.
    pub async fn find_for_user(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campaigns WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Compare-and-swap `Draft -> Sending`.
    ///
    /// Returns `true` only if this call performed the transition. A `false`
    /// means the campaign was missing or no longer `Draft` (e.g. a concurrent
    /// dispatch got there first).
    pub async fn begin_sending(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE campaigns \
             SET status_id = $3, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND status_id = $4",
        )
        .bind(id)
        .bind(user_id)
        .bind(CampaignStatus::Sending.id())
        .bind(CampaignStatus::Draft.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record the terminal status and delivery counts.
    ///
    /// Accepts a campaign currently `Sending` or already in the target status,
    /// so repeating the same write is harmless. `sent_at` is stamped once,
    /// when the outcome is `Sent`. Returns the number of rows updated.
    pub async fn complete(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
        outcome: &CampaignOutcome,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE campaigns \
             SET status_id = $3, total_recipients = $4, sent_count = $5, \
                 sent_at = CASE WHEN $3 = $6 THEN COALESCE(sent_at, NOW()) ELSE sent_at END, \
                 updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND status_id IN ($7, $3)",
        )
        .bind(id)
        .bind(user_id)
        .bind(outcome.status.id())
        .bind(outcome.total_recipients)
        .bind(outcome.sent_count)
        .bind(CampaignStatus::Sent.id())
        .bind(CampaignStatus::Sending.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Force `Sending -> Failed` after an aborted dispatch.
    ///
    /// Also matches rows already `Failed`. Returns the number of rows updated.
    pub async fn mark_failed(pool: &PgPool, user_id: DbId, id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE campaigns \
             SET status_id = $3, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND status_id IN ($4, $3)",
        )
        .bind(id)
        .bind(user_id)
        .bind(CampaignStatus::Failed.id())
        .bind(CampaignStatus::Sending.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// List a tenant's campaigns stuck in `Sending` since before `older_than`.
    ///
    /// Such rows mark a dispatch that crashed mid-send. They are surfaced for
    /// operators and never re-dispatched automatically.
    pub async fn list_stale_sending(
        pool: &PgPool,
        user_id: DbId,
        older_than: Timestamp,
    ) -> Result<Vec<Campaign>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM campaigns \
             WHERE user_id = $1 AND status_id = $2 AND updated_at < $3 \
             ORDER BY updated_at ASC"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(user_id)
            .bind(CampaignStatus::Sending.id())
            .bind(older_than)
            .fetch_all(pool)
            .await
    }
}
