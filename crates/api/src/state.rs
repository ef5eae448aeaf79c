use std::sync::Arc;

use beacon_pipeline::CampaignDispatcher;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: beacon_db::DbPool,
    /// Campaign dispatcher. `None` when no email provider is configured.
    pub dispatcher: Option<Arc<CampaignDispatcher>>,
}
