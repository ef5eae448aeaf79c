pub mod campaigns;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /campaigns/stale-sending                         campaigns stuck in sending
/// /campaigns/{id}/send                             dispatch a draft (POST)
/// ```
///
/// Every route requires the `x-tenant-id` header.
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/campaigns", campaigns::router())
}
