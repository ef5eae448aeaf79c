//! Persistence seam for the dispatcher.
//!
//! Every method takes the tenant id explicitly; implementations must scope
//! each read and write by it.

use async_trait::async_trait;
use beacon_core::campaign::CampaignOutcome;
use beacon_core::filters::ResolvedFilters;
use beacon_core::types::DbId;
use beacon_db::models::campaign::Campaign;
use beacon_db::models::profile::SenderProfile;
use beacon_db::models::subscriber::RecipientRow;
use beacon_db::repositories::{CampaignRepo, ProfileRepo, SubscriberRepo, UserRepo};
use beacon_db::DbPool;

#[async_trait]
pub trait DispatchStore: Send + Sync {
    /// Campaign `id` if it belongs to `tenant_id`.
    async fn load_campaign(
        &self,
        tenant_id: DbId,
        id: DbId,
    ) -> Result<Option<Campaign>, sqlx::Error>;

    /// The tenant's sender profile.
    async fn load_sender(&self, tenant_id: DbId) -> Result<Option<SenderProfile>, sqlx::Error>;

    /// The tenant's subscribers matching `filters`, in stable order.
    async fn find_recipients(
        &self,
        tenant_id: DbId,
        filters: &ResolvedFilters,
    ) -> Result<Vec<RecipientRow>, sqlx::Error>;

    /// `Draft -> Sending`. `false` if the campaign was not `Draft`.
    async fn begin_sending(&self, tenant_id: DbId, id: DbId) -> Result<bool, sqlx::Error>;

    /// Write the terminal status and counts. Returns rows affected.
    async fn complete(
        &self,
        tenant_id: DbId,
        id: DbId,
        outcome: &CampaignOutcome,
    ) -> Result<u64, sqlx::Error>;

    /// `Sending -> Failed`. Returns rows affected.
    async fn mark_failed(&self, tenant_id: DbId, id: DbId) -> Result<u64, sqlx::Error>;
}

/// [`DispatchStore`] over the PostgreSQL repositories.
#[derive(Clone)]
pub struct PgDispatchStore {
    pool: DbPool,
}

impl PgDispatchStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DispatchStore for PgDispatchStore {
    async fn load_campaign(
        &self,
        tenant_id: DbId,
        id: DbId,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        CampaignRepo::find_for_user(&self.pool, tenant_id, id).await
    }

    /// Falls back to the account email when the profile has none.
    async fn load_sender(&self, tenant_id: DbId) -> Result<Option<SenderProfile>, sqlx::Error> {
        let Some(mut profile) = ProfileRepo::find_by_user(&self.pool, tenant_id).await? else {
            return Ok(None);
        };
        let has_email = profile
            .email
            .as_deref()
            .is_some_and(|e| !e.trim().is_empty());
        if !has_email {
            profile.email = UserRepo::find_by_id(&self.pool, tenant_id)
                .await?
                .map(|u| u.email);
        }
        Ok(Some(profile))
    }

    async fn find_recipients(
        &self,
        tenant_id: DbId,
        filters: &ResolvedFilters,
    ) -> Result<Vec<RecipientRow>, sqlx::Error> {
        SubscriberRepo::list_matching(&self.pool, tenant_id, filters).await
    }

    async fn begin_sending(&self, tenant_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        CampaignRepo::begin_sending(&self.pool, tenant_id, id).await
    }

    async fn complete(
        &self,
        tenant_id: DbId,
        id: DbId,
        outcome: &CampaignOutcome,
    ) -> Result<u64, sqlx::Error> {
        CampaignRepo::complete(&self.pool, tenant_id, id, outcome).await
    }

    async fn mark_failed(&self, tenant_id: DbId, id: DbId) -> Result<u64, sqlx::Error> {
        CampaignRepo::mark_failed(&self.pool, tenant_id, id).await
    }
}
