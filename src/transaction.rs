//! Polling of server-side asynchronous transactions
//!
//! Every mutating API call answers with a transaction record. The poller
//! fetches that record at a fixed interval until it reaches `DONE` or
//! `ERROR`, bounded by an optional deadline and interruptible through a
//! [`CancellationToken`].

use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::http::{ApiClient, ApiError};
use crate::models::{CdoTransaction, TransactionStatus};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("Transaction {uid} failed: {}", describe_failure(.message.as_deref(), .details))]
    Failed {
        uid: String,
        message: Option<String>,
        details: Map<String, Value>,
    },
    #[error("Transaction {uid} did not finish within {timeout:?} (last status: {last_status:?})")]
    TimedOut {
        uid: String,
        timeout: Duration,
        last_status: TransactionStatus,
    },
    #[error("Stopped waiting for transaction {uid}")]
    Cancelled { uid: String },
    #[error("Could not fetch transaction {uid}")]
    Api {
        uid: String,
        #[source]
        source: ApiError,
    },
}

fn describe_failure(message: Option<&str>, details: &Map<String, Value>) -> String {
    let message = message.unwrap_or("no error message");
    if details.is_empty() {
        return message.to_string();
    }
    format!("{} {}", message, Value::Object(details.clone()))
}

/// Polling schedule shared by every wait in one invocation
#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    /// `None` waits until a terminal status or cancellation
    pub timeout: Option<Duration>,
    pub cancel: CancellationToken,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: Some(DEFAULT_TIMEOUT),
            cancel: CancellationToken::new(),
        }
    }
}

/// Waits for transactions through one authenticated client
pub struct TransactionPoller<'a> {
    client: &'a ApiClient,
    settings: PollSettings,
}

impl<'a> TransactionPoller<'a> {
    pub fn new(client: &'a ApiClient, settings: PollSettings) -> Self {
        Self { client, settings }
    }

    /// Fetches the current state of a transaction
    pub async fn get_transaction(&self, transaction_uid: &str) -> Result<CdoTransaction, TransactionError> {
        self.client
            .get_json(&format!("/v1/transactions/{}", transaction_uid), &[])
            .await
            .map_err(|source| TransactionError::Api {
                uid: transaction_uid.to_string(),
                source,
            })
    }

    /// Blocks until the transaction reaches a terminal status
    ///
    /// Returns the final record on `DONE`. `ERROR` yields
    /// [`TransactionError::Failed`] carrying the server's details; running
    /// past the deadline or cancellation yield their own variants.
    pub async fn wait_for_transaction_to_finish(
        &self,
        transaction_uid: &str,
    ) -> Result<CdoTransaction, TransactionError> {
        let started = Instant::now();
        let deadline = self.settings.timeout.map(|timeout| started + timeout);

        let mut transaction = self.get_transaction(transaction_uid).await?;
        while !transaction.cdo_transaction_status.is_terminal() {
            // The last poll lands on the deadline rather than past it
            let wait = match (deadline, self.settings.timeout) {
                (Some(deadline), Some(timeout)) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(TransactionError::TimedOut {
                            uid: transaction_uid.to_string(),
                            timeout,
                            last_status: transaction.cdo_transaction_status,
                        });
                    }
                    self.settings.interval.min(deadline - now)
                }
                _ => self.settings.interval,
            };
            debug!(
                "Transaction {} is {:?}, polling again in {:?}",
                transaction_uid, transaction.cdo_transaction_status, wait
            );

            tokio::select! {
                _ = self.settings.cancel.cancelled() => {
                    return Err(TransactionError::Cancelled { uid: transaction_uid.to_string() });
                }
                _ = sleep(wait) => {}
            }

            transaction = self.get_transaction(transaction_uid).await?;
        }

        if transaction.cdo_transaction_status == TransactionStatus::Error {
            let mut details = transaction.transaction_details;
            details.extend(transaction.error_details);
            return Err(TransactionError::Failed {
                uid: transaction_uid.to_string(),
                message: transaction.error_message,
                details,
            });
        }

        debug!("Transaction {} is done", transaction_uid);
        Ok(transaction)
    }
}
