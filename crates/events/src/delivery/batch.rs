//! Rate-limited batch delivery.
//!
//! [`BatchDelivery`] splits recipients into provider-sized batches and sends
//! them strictly one after another, pausing between calls. Each batch is
//! isolated: an error, a timeout or a rejected call is recorded on that
//! batch and the loop moves on to the next one.

use std::sync::Arc;
use std::time::Duration;

use beacon_core::delivery::{
    batch_count, partition, BatchOutcome, DeliveryReport, Mailbox, SenderIdentity,
    DEFAULT_BATCH_SIZE,
};

use super::provider::{ProviderError, TransactionalEmail, TransactionalEmailProvider};

/// Default pause between successive provider calls.
const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(1000);

/// Default upper bound on a single provider call.
const DEFAULT_BATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default retry delays for transient failures (two retries: 1 s, 2 s).
const DEFAULT_RETRY_DELAYS_MS: [u64; 2] = [1000, 2000];

// ---------------------------------------------------------------------------
// DeliveryConfig
// ---------------------------------------------------------------------------

/// Tuning for the batch loop.
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// Recipients per provider call (the provider's per-call ceiling).
    pub batch_size: usize,
    /// Pause inserted between batches. Not applied after the last one.
    pub batch_delay: Duration,
    /// Upper bound on each provider call; elapsed means the batch failed.
    pub batch_timeout: Duration,
    /// Wait before each retry of a transient failure. The length is the
    /// maximum number of retries per batch.
    pub retry_delays: Vec<Duration>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
            batch_timeout: DEFAULT_BATCH_TIMEOUT,
            retry_delays: DEFAULT_RETRY_DELAYS_MS
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
        }
    }
}

impl DeliveryConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default     |
    /// |-------------------------------|-------------|
    /// | `DISPATCH_BATCH_SIZE`         | `50`        |
    /// | `DISPATCH_BATCH_DELAY_MS`     | `1000`      |
    /// | `DISPATCH_BATCH_TIMEOUT_SECS` | `30`        |
    /// | `DISPATCH_RETRY_DELAYS_MS`    | `1000,2000` |
    ///
    /// Unparseable values fall back to the default. An empty
    /// `DISPATCH_RETRY_DELAYS_MS` disables retries.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let batch_size = env_parse("DISPATCH_BATCH_SIZE")
            .filter(|n: &usize| *n > 0)
            .unwrap_or(defaults.batch_size);
        let batch_delay = env_parse("DISPATCH_BATCH_DELAY_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.batch_delay);
        let batch_timeout = env_parse("DISPATCH_BATCH_TIMEOUT_SECS")
            .filter(|n: &u64| *n > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.batch_timeout);
        let retry_delays = match std::env::var("DISPATCH_RETRY_DELAYS_MS") {
            Ok(raw) => parse_delays(&raw).unwrap_or(defaults.retry_delays),
            Err(_) => defaults.retry_delays,
        };

        Self {
            batch_size,
            batch_delay,
            batch_timeout,
            retry_delays,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Parse a comma-separated list of millisecond delays.
fn parse_delays(raw: &str) -> Option<Vec<Duration>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u64>().ok().map(Duration::from_millis))
        .collect()
}

// ---------------------------------------------------------------------------
// BatchDelivery
// ---------------------------------------------------------------------------

/// Sends one rendered campaign to its recipients in sequential batches.
#[derive(Clone)]
pub struct BatchDelivery {
    provider: Arc<dyn TransactionalEmailProvider>,
    config: DeliveryConfig,
}

impl BatchDelivery {
    pub fn new(provider: Arc<dyn TransactionalEmailProvider>, config: DeliveryConfig) -> Self {
        Self { provider, config }
    }

    /// Deliver `html` to every recipient, one batch at a time.
    ///
    /// Never fails as a whole: every provider error is captured in the
    /// returned report against the batch that produced it.
    pub async fn send_batched(
        &self,
        recipients: &[Mailbox],
        subject: &str,
        html: &str,
        sender: &SenderIdentity,
    ) -> DeliveryReport {
        let total_batches = batch_count(recipients.len(), self.config.batch_size);
        tracing::info!(
            recipients = recipients.len(),
            total_batches,
            batch_size = self.config.batch_size,
            "Starting batch delivery"
        );

        let mut outcomes = Vec::with_capacity(total_batches);
        for (index, batch) in partition(recipients, self.config.batch_size).enumerate() {
            if index > 0 && !self.config.batch_delay.is_zero() {
                tokio::time::sleep(self.config.batch_delay).await;
            }

            let email = TransactionalEmail::new(batch, sender, subject, html);
            outcomes.push(self.send_batch(index, &email).await);
        }

        let report = DeliveryReport::from_batches(outcomes);
        tracing::info!(
            total_batches = report.total_batches,
            successful_batches = report.successful_batches,
            failed_batches = report.failed_batches,
            "Batch delivery finished"
        );
        report
    }

    /// Send one batch, retrying transient failures per the configured delays.
    async fn send_batch(&self, index: usize, email: &TransactionalEmail) -> BatchOutcome {
        let recipient_count = email.to.len();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            match self.call_with_timeout(email).await {
                Ok(receipt) => {
                    tracing::debug!(
                        batch_index = index,
                        recipient_count,
                        attempts,
                        message_id = receipt.message_id.as_deref().unwrap_or(""),
                        "Batch accepted by provider"
                    );
                    return BatchOutcome::succeeded(
                        index,
                        recipient_count,
                        attempts,
                        receipt.message_id,
                    );
                }
                Err(e) => {
                    let retry_delay = self.config.retry_delays.get(attempts as usize - 1);
                    match retry_delay {
                        Some(delay) if e.is_transient() => {
                            tracing::warn!(
                                batch_index = index,
                                attempt = attempts,
                                error = %e,
                                "Batch send failed, retrying"
                            );
                            tokio::time::sleep(*delay).await;
                        }
                        _ => {
                            tracing::error!(
                                batch_index = index,
                                recipient_count,
                                attempts,
                                error = %e,
                                "Batch send failed"
                            );
                            return BatchOutcome::failed(
                                index,
                                recipient_count,
                                attempts,
                                e.to_string(),
                            );
                        }
                    }
                }
            }
        }
    }

    async fn call_with_timeout(
        &self,
        email: &TransactionalEmail,
    ) -> Result<super::provider::SendReceipt, ProviderError> {
        match tokio::time::timeout(self.config.batch_timeout, self.provider.send(email)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.config.batch_timeout)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
