//! Campaign dispatch pipeline.
//!
//! [`CampaignDispatcher`] drives one campaign from `Draft` to `Sent` or
//! `Failed`: it loads the campaign and its owner, resolves the audience,
//! renders the email, claims the campaign, delivers in batches and records
//! the outcome. Persistence goes through the [`DispatchStore`] trait so the
//! orchestration can be exercised without a database.

pub mod dispatcher;
pub mod error;
pub mod recipients;
pub mod store;

pub use dispatcher::{CampaignDispatcher, DispatchResult};
pub use error::DispatchError;
pub use recipients::resolve_recipients;
pub use store::{DispatchStore, PgDispatchStore};
