//! Recipient resolution.

use beacon_core::delivery::Mailbox;
use beacon_core::filters::RecipientFilters;
use beacon_core::types::DbId;
use beacon_db::models::subscriber::RecipientRow;

use crate::error::DispatchError;
use crate::store::DispatchStore;

/// Resolve the audience of `campaign_id` among `tenant_id`'s subscribers.
///
/// Unknown status or source names fail validation. An empty result is an
/// error: a campaign is never sent to nobody.
pub async fn resolve_recipients(
    store: &dyn DispatchStore,
    tenant_id: DbId,
    campaign_id: DbId,
    filters: &RecipientFilters,
) -> Result<Vec<RecipientRow>, DispatchError> {
    let resolved = filters.resolve()?;
    let recipients = store.find_recipients(tenant_id, &resolved).await?;

    if recipients.is_empty() {
        tracing::info!(tenant_id, campaign_id, "No subscribers match campaign filters");
        return Err(DispatchError::NoRecipients { campaign_id });
    }

    tracing::debug!(
        tenant_id,
        campaign_id,
        recipient_count = recipients.len(),
        unrestricted = resolved.is_unrestricted(),
        "Resolved campaign recipients"
    );
    Ok(recipients)
}

/// Delivery envelope entries for resolved recipients.
pub fn to_mailboxes(recipients: &[RecipientRow]) -> Vec<Mailbox> {
    recipients
        .iter()
        .map(|r| Mailbox::new(r.email.as_str(), r.name.as_str()))
        .collect()
}
