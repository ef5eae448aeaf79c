//! Pure domain logic for the campaign dispatch pipeline.
//!
//! Nothing in this crate performs I/O. The persistence layer, the email
//! provider client and the orchestrator all build on these types.

pub mod campaign;
pub mod delivery;
pub mod error;
pub mod filters;
pub mod status;
pub mod template;
pub mod types;
