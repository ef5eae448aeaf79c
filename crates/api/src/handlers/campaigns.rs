//! Handlers for the `/campaigns` resource.
//!
//! Sending runs the whole dispatch inside the request; the response carries
//! the outcome and per-batch report.

use axum::extract::{Path, Query, State};
use axum::Json;
use beacon_core::types::DbId;
use beacon_db::models::campaign::Campaign;
use beacon_db::repositories::CampaignRepo;
use beacon_pipeline::DispatchResult;
use chrono::{Duration, Utc};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::tenant::TenantId;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default age after which a `sending` campaign counts as stale.
const DEFAULT_STALE_MINUTES: i64 = 30;

/// POST /api/v1/campaigns/{id}/send
///
/// Dispatch a draft campaign. Returns 200 with `success: false` when some
/// batches failed; see [`AppError`] for the failure statuses.
pub async fn send_campaign(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DispatchResult>>> {
    let dispatcher = state.dispatcher.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("Campaign sending is not configured".into())
    })?;

    tracing::info!(tenant_id, campaign_id = id, "Campaign send requested");
    let result = dispatcher.dispatch(tenant_id, id).await?;
    Ok(Json(DataResponse { data: result }))
}

/// Query parameters for the stale listing endpoint.
#[derive(Debug, Deserialize)]
pub struct StaleQuery {
    /// Minimum minutes since the last status change (default 30).
    pub older_than_minutes: Option<i64>,
}

/// GET /api/v1/campaigns/stale-sending
///
/// List the tenant's campaigns left in `sending` by a crashed dispatch.
/// These are never re-sent automatically.
pub async fn list_stale_sending(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Query(params): Query<StaleQuery>,
) -> AppResult<Json<DataResponse<Vec<Campaign>>>> {
    let minutes = params.older_than_minutes.unwrap_or(DEFAULT_STALE_MINUTES);
    if minutes <= 0 {
        return Err(AppError::BadRequest(
            "older_than_minutes must be positive".into(),
        ));
    }

    let cutoff = Duration::try_minutes(minutes)
        .and_then(|age| Utc::now().checked_sub_signed(age))
        .ok_or_else(|| AppError::BadRequest("older_than_minutes is out of range".into()))?;
    let campaigns = CampaignRepo::list_stale_sending(&state.pool, tenant_id, cutoff).await?;
    Ok(Json(DataResponse { data: campaigns }))
}
