//! Tenant extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use beacon_core::types::DbId;

use crate::error::AppError;

/// Header carrying the authenticated tenant id, set by the auth gateway.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// The tenant on whose behalf the request runs.
///
/// Authentication happens upstream; this only reads the resolved id. Every
/// tenant-owned query is scoped with it.
///
/// ```ignore
/// async fn my_handler(TenantId(tenant_id): TenantId) -> AppResult<Json<()>> {
///     tracing::info!(tenant_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantId(pub DbId);

impl<S> FromRequestParts<S> for TenantId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(TENANT_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing x-tenant-id header".into()))?;

        raw.trim()
            .parse::<DbId>()
            .ok()
            .filter(|id| *id > 0)
            .map(TenantId)
            .ok_or_else(|| AppError::Unauthorized("Invalid x-tenant-id header".into()))
    }
}
