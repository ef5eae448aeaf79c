//! Outbound side of the campaign dispatch pipeline.
//!
//! - [`delivery::provider`]: client for the transactional email provider.
//! - [`delivery::batch`]: sequential, rate-limited batch sending with
//!   per-batch failure isolation.
//! - [`EventBus`]: in-process publish/subscribe hub for campaign status
//!   changes.
//! - [`RevalidationHook`]: forwards status changes to the presentation
//!   layer so cached pages refresh.

pub mod bus;
pub mod delivery;

pub use bus::{CampaignEvent, EventBus};
pub use delivery::batch::{BatchDelivery, DeliveryConfig};
pub use delivery::provider::{
    HttpEmailProvider, ProviderConfig, ProviderError, SendReceipt, TransactionalEmail,
    TransactionalEmailProvider,
};
pub use delivery::webhook::{RevalidationHook, WebhookError};
