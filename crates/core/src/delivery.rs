//! Batch delivery bookkeeping.
//!
//! Pure types shared by the provider client and the orchestrator: address
//! envelopes, recipient partitioning, and the per-send [`DeliveryReport`].

use serde::{Deserialize, Serialize};

/// Largest batch the transactional provider accepts per call.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// An addressee as the provider expects it: `{ "email": ..., "name": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mailbox {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Mailbox {
    /// Build a mailbox, dropping a blank display name.
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let trimmed = name.trim();
        Self {
            email: email.into().trim().to_string(),
            name: (!trimmed.is_empty()).then(|| trimmed.to_string()),
        }
    }
}

/// The campaign owner as shown in the `sender` and `replyTo` envelope fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SenderIdentity {
    pub name: String,
    pub email: String,
}

/// Split `items` into consecutive batches of at most `batch_size`.
///
/// A zero `batch_size` is treated as one.
pub fn partition<T>(items: &[T], batch_size: usize) -> std::slice::Chunks<'_, T> {
    items.chunks(batch_size.max(1))
}

/// Number of batches `total` recipients occupy at `batch_size`.
pub fn batch_count(total: usize, batch_size: usize) -> usize {
    total.div_ceil(batch_size.max(1))
}

/// Outcome of one provider call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    /// Zero-based position of the batch in send order.
    pub index: usize,
    pub recipient_count: usize,
    pub success: bool,
    /// Provider calls made for this batch, including retries.
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchOutcome {
    pub fn succeeded(
        index: usize,
        recipient_count: usize,
        attempts: u32,
        message_id: Option<String>,
    ) -> Self {
        Self {
            index,
            recipient_count,
            success: true,
            attempts,
            message_id,
            error: None,
        }
    }

    pub fn failed(
        index: usize,
        recipient_count: usize,
        attempts: u32,
        error: impl Into<String>,
    ) -> Self {
        Self {
            index,
            recipient_count,
            success: false,
            attempts,
            message_id: None,
            error: Some(error.into()),
        }
    }
}

/// Aggregate of every batch in one send.
///
/// `successful_batches + failed_batches == total_batches` by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub total_recipients: usize,
    pub total_batches: usize,
    pub successful_batches: usize,
    pub failed_batches: usize,
    pub batches: Vec<BatchOutcome>,
}

impl DeliveryReport {
    /// Fold per-batch outcomes into a report.
    pub fn from_batches(batches: Vec<BatchOutcome>) -> Self {
        let successful_batches = batches.iter().filter(|b| b.success).count();
        Self {
            total_recipients: batches.iter().map(|b| b.recipient_count).sum(),
            total_batches: batches.len(),
            successful_batches,
            failed_batches: batches.len() - successful_batches,
            batches,
        }
    }

    /// `true` iff at least one batch ran and none failed.
    pub fn success(&self) -> bool {
        self.total_batches > 0 && self.failed_batches == 0
    }

    /// `true` when batches ran and every one of them failed.
    pub fn all_failed(&self) -> bool {
        self.total_batches > 0 && self.successful_batches == 0
    }

    /// Recipients addressed by successful batches.
    ///
    /// The provider acknowledges a batch as a whole, so this is an upper
    /// bound on actual deliveries.
    pub fn delivered_recipients(&self) -> usize {
        self.batches
            .iter()
            .filter(|b| b.success)
            .map(|b| b.recipient_count)
            .sum()
    }

    /// First recorded batch error, if any.
    pub fn first_error(&self) -> Option<&str> {
        self.batches.iter().find_map(|b| b.error.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_120_by_50_gives_50_50_20() {
        let recipients: Vec<usize> = (0..120).collect();
        let sizes: Vec<usize> = partition(&recipients, 50).map(<[usize]>::len).collect();
        assert_eq!(sizes, vec![50, 50, 20]);
        assert_eq!(batch_count(120, 50), 3);
    }

    #[test]
    fn partition_exact_multiple_has_no_empty_tail() {
        let recipients: Vec<usize> = (0..100).collect();
        assert_eq!(partition(&recipients, 50).count(), 2);
        assert_eq!(batch_count(100, 50), 2);
    }

    #[test]
    fn zero_batch_size_is_clamped() {
        let recipients = [1, 2, 3];
        assert_eq!(partition(&recipients, 0).count(), 3);
        assert_eq!(batch_count(3, 0), 3);
    }

    #[test]
    fn report_counts_always_add_up() {
        let report = DeliveryReport::from_batches(vec![
            BatchOutcome::succeeded(0, 50, 1, None),
            BatchOutcome::failed(1, 50, 3, "HTTP 503"),
            BatchOutcome::succeeded(2, 20, 1, None),
        ]);
        assert_eq!(report.total_batches, 3);
        assert_eq!(report.successful_batches, 2);
        assert_eq!(report.failed_batches, 1);
        assert_eq!(
            report.successful_batches + report.failed_batches,
            report.total_batches
        );
        assert_eq!(report.total_recipients, 120);
        assert_eq!(report.delivered_recipients(), 70);
        assert!(!report.success());
        assert!(!report.all_failed());
        assert_eq!(report.first_error(), Some("HTTP 503"));
    }

    #[test]
    fn all_failed_report() {
        let report = DeliveryReport::from_batches(vec![
            BatchOutcome::failed(0, 2, 1, "unauthorized"),
            BatchOutcome::failed(1, 1, 1, "unauthorized"),
        ]);
        assert!(report.all_failed());
        assert_eq!(report.delivered_recipients(), 0);
    }

    #[test]
    fn mailbox_drops_blank_names() {
        assert_eq!(Mailbox::new("a@example.com", "  ").name, None);
        let mailbox = Mailbox::new(" b@example.com ", "Bea");
        assert_eq!(mailbox.email, "b@example.com");
        assert_eq!(mailbox.name.as_deref(), Some("Bea"));

        let json = serde_json::to_value(Mailbox::new("c@example.com", "")).unwrap();
        assert_eq!(json, serde_json::json!({ "email": "c@example.com" }));
    }
}
