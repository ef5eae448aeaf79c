//! Repository for the `subscribers` table.

use beacon_core::filters::ResolvedFilters;
use beacon_core::status::{SubscriberSource, SubscriberStatus};
use beacon_core::types::DbId;
use sqlx::PgPool;

use crate::models::subscriber::{CreateSubscriber, RecipientRow, Subscriber};

/// Column list for `subscribers` queries.
const COLUMNS: &str =
    "id, user_id, name, email, status_id, source_id, tags, created_at, updated_at";

/// Provides tenant-scoped access to subscribers.
pub struct SubscriberRepo;

impl SubscriberRepo {
    /// Insert a subscriber for a tenant, returning the full row.
    ///
    /// Emails are unique per tenant ignoring case (`uq_subscribers_user_email`).
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateSubscriber,
    ) -> Result<Subscriber, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscribers (user_id, name, email, status_id, source_id, tags) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscriber>(&query)
            .bind(user_id)
            .bind(input.name.trim())
            .bind(input.email.trim())
            .bind(input.status.unwrap_or(SubscriberStatus::Active).id())
            .bind(input.source.unwrap_or(SubscriberSource::Manual).id())
            .bind(&input.tags)
            .fetch_one(pool)
            .await
    }

    /// List the delivery projection of every subscriber of `user_id`
    /// matching `filters`.
    ///
    /// The tenant constraint is always applied. An empty filter dimension is
    /// bound as `NULL` and places no restriction; tags use array overlap
    /// (`&&`), so a subscriber matches if it has any of the requested tags.
    pub async fn list_matching(
        pool: &PgPool,
        user_id: DbId,
        filters: &ResolvedFilters,
    ) -> Result<Vec<RecipientRow>, sqlx::Error> {
        let statuses = non_empty(filters.status_ids());
        let sources = non_empty(filters.source_ids());
        let tags = non_empty(filters.tags.clone());

        let rows = sqlx::query_as::<_, RecipientRow>(
            "SELECT id, name, email, status_id FROM subscribers \
             WHERE user_id = $1 \
               AND ($2::SMALLINT[] IS NULL OR status_id = ANY($2)) \
               AND ($3::SMALLINT[] IS NULL OR source_id = ANY($3)) \
               AND ($4::TEXT[] IS NULL OR tags && $4) \
             ORDER BY id ASC",
        )
        .bind(user_id)
        .bind(statuses)
        .bind(sources)
        .bind(tags)
        .fetch_all(pool)
        .await?;

        tracing::debug!(user_id, matched = rows.len(), "Resolved subscriber filters");
        Ok(rows)
    }

    /// Count all subscribers of a tenant.
    pub async fn count_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM subscribers WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }
}

/// `None` for an empty list, so the query skips that dimension.
fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}
