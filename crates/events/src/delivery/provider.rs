//! Transactional email provider client.
//!
//! [`HttpEmailProvider`] posts one HTML message per call to the provider's
//! `/v3/smtp/email` endpoint, addressed to every recipient of a batch as a
//! direct `to` addressee. The [`TransactionalEmailProvider`] trait is the
//! seam the batch sender depends on.

use async_trait::async_trait;
use beacon_core::delivery::{Mailbox, SenderIdentity};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default provider API root.
const DEFAULT_API_URL: &str = "https://api.brevo.com";

/// Path of the transactional send endpoint, relative to the API root.
const SEND_PATH: &str = "/v3/smtp/email";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for provider calls.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The underlying HTTP request failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Provider returned HTTP {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// No response within the per-batch timeout.
    #[error("Provider call timed out after {0:?}")]
    Timeout(Duration),
}

impl ProviderError {
    /// Whether retrying the same call may succeed.
    ///
    /// Rate limiting, provider-side errors and connection failures are
    /// transient. Timeouts are not: the provider may have accepted the
    /// message, and a retry would send it twice.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(e) => e.is_connect(),
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Timeout(_) => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One provider call: a single HTML message to a batch of recipients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionalEmail {
    pub to: Vec<Mailbox>,
    pub sender: Mailbox,
    pub reply_to: Mailbox,
    pub subject: String,
    pub html_content: String,
}

impl TransactionalEmail {
    /// Build a message from the campaign owner to `recipients`.
    ///
    /// The owner is both sender and reply-to.
    pub fn new(
        recipients: &[Mailbox],
        sender: &SenderIdentity,
        subject: &str,
        html_content: &str,
    ) -> Self {
        let from = Mailbox::new(sender.email.as_str(), sender.name.as_str());
        Self {
            to: recipients.to_vec(),
            reply_to: from.clone(),
            sender: from,
            subject: subject.to_string(),
            html_content: html_content.to_string(),
        }
    }
}

/// Successful send acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SendReceipt {
    #[serde(rename = "messageId")]
    pub message_id: Option<String>,
}

/// Anything that can accept one transactional message per call.
#[async_trait]
pub trait TransactionalEmailProvider: Send + Sync {
    async fn send(&self, email: &TransactionalEmail) -> Result<SendReceipt, ProviderError>;
}

// ---------------------------------------------------------------------------
// ProviderConfig
// ---------------------------------------------------------------------------

/// Configuration for the HTTP provider client.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API root, e.g. `https://api.brevo.com`.
    pub api_url: String,
    /// Value of the `api-key` header.
    pub api_key: String,
}

impl ProviderConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `EMAIL_API_KEY` is not set, signalling that
    /// campaign sending is not configured.
    ///
    /// | Variable        | Required | Default                  |
    /// |-----------------|----------|--------------------------|
    /// | `EMAIL_API_KEY` | yes      | —                        |
    /// | `EMAIL_API_URL` | no       | `https://api.brevo.com`  |
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("EMAIL_API_KEY").ok()?;
        Some(Self {
            api_url: std::env::var("EMAIL_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            api_key,
        })
    }

    fn send_url(&self) -> String {
        format!("{}{SEND_PATH}", self.api_url.trim_end_matches('/'))
    }
}

// ---------------------------------------------------------------------------
// HttpEmailProvider
// ---------------------------------------------------------------------------

/// HTTP client for the transactional email provider.
pub struct HttpEmailProvider {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl HttpEmailProvider {
    /// Create a client with its own connection pool.
    pub fn new(config: ProviderConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: ProviderConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl TransactionalEmailProvider for HttpEmailProvider {
    async fn send(&self, email: &TransactionalEmail) -> Result<SendReceipt, ProviderError> {
        let response = self
            .client
            .post(self.config.send_url())
            .header("api-key", &self.config.api_key)
            .header("accept", "application/json")
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(accepted_receipt(response.bytes().await))
    }
}

/// Build the receipt for a message the provider already accepted.
///
/// The status line is authoritative: an empty, malformed or truncated body
/// still counts as sent, just without a message id.
fn accepted_receipt<B: AsRef<[u8]>, E: std::fmt::Display>(body: Result<B, E>) -> SendReceipt {
    match body {
        Ok(bytes) => serde_json::from_slice(bytes.as_ref()).unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Provider accepted the message but the body was unreadable");
            SendReceipt::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
