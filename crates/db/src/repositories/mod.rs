//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Every query on
//! tenant-owned tables takes the tenant's `user_id` explicitly.

pub mod campaign_repo;
pub mod profile_repo;
pub mod subscriber_repo;
pub mod user_repo;

pub use campaign_repo::CampaignRepo;
pub use profile_repo::ProfileRepo;
pub use subscriber_repo::SubscriberRepo;
pub use user_repo::UserRepo;
