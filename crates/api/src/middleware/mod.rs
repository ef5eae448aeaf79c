//! Request extractors shared by handlers.
//!
//! - [`tenant::TenantId`] -- the tenant resolved by the upstream auth gateway.

pub mod tenant;
