//! External delivery channels.
//!
//! Campaign email goes out through the transactional provider in batches;
//! status changes go to the presentation layer's revalidation webhook.

pub mod batch;
pub mod provider;
pub mod webhook;
