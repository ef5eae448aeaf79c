//! Route definitions for the `/campaigns` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::campaigns;
use crate::state::AppState;

/// Routes mounted at `/campaigns`.
///
/// ```text
/// GET    /stale-sending     -> list_stale_sending  (?older_than_minutes=N)
/// POST   /{id}/send         -> send_campaign
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stale-sending", get(campaigns::list_stale_sending))
        .route("/{id}/send", post(campaigns::send_campaign))
}
