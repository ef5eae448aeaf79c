use beacon_core::error::CoreError;
use beacon_core::types::DbId;

/// Why a dispatch attempt did not complete.
///
/// A partial delivery is not an error: it comes back as a
/// [`DispatchResult`](crate::DispatchResult) with `success == false`.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// The campaign's filters match no subscriber of its owner.
    #[error("No recipients match the filters of campaign {campaign_id}")]
    NoRecipients { campaign_id: DbId },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The owner's profile lacks the identity needed for the envelope.
    #[error("Sender profile incomplete: {0}")]
    IncompleteSender(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Every batch was rejected by the provider.
    #[error("All {failed_batches} batches failed: {message}")]
    ProviderTotalFailure {
        failed_batches: usize,
        message: String,
    },

    /// A status write failed or matched no row.
    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CoreError> for DispatchError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, id } => Self::NotFound { entity, id },
            CoreError::Validation(msg) => Self::Validation(msg),
            CoreError::InvalidState(msg) => Self::InvalidState(msg),
            CoreError::Internal(msg) => Self::Internal(msg),
        }
    }
}
