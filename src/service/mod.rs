//! Bank Service
//!
//! The calling layer of the ledger: rejects bad requests before they reach the
//! store, bounds each attempt with a deadline, and retries serialization
//! conflicts a bounded number of times.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::config::TransferConfig;
use crate::ledger::{AccountRepository, ErrorKind, LedgerError, TransferRequest};

/// Bounded retry for [`LedgerError::SerializationConflict`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first, at least 1
    pub max_attempts: u32,
    /// Attempt `n` (1-based) waits `n * backoff` before the next one
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Single attempt, conflicts are returned as-is
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&TransferConfig::default())
    }
}

impl From<&TransferConfig> for RetryPolicy {
    fn from(config: &TransferConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.retry_backoff_ms),
        )
    }
}

pub struct BankService {
    repo: Arc<dyn AccountRepository>,
    retry: RetryPolicy,
    timeout: Option<Duration>,
}

impl BankService {
    pub fn new(repo: Arc<dyn AccountRepository>) -> Self {
        Self {
            repo,
            retry: RetryPolicy::none(),
            timeout: None,
        }
    }

    pub fn from_config(repo: Arc<dyn AccountRepository>, config: &TransferConfig) -> Self {
        let service = Self::new(repo).with_retry(RetryPolicy::from(config));
        match config.timeout_ms {
            0 => service,
            ms => service.with_timeout(Duration::from_millis(ms)),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Execute a transfer between two accounts
    pub async fn transfer(&self, req: &TransferRequest) -> Result<(), LedgerError> {
        tracing::info!(from = %req.from, to = %req.to, amount = %req.amount, "Transfer request");

        if let Err(e) = req.validate() {
            tracing::warn!(code = e.code(), "Transfer rejected: {}", e);
            return Err(e);
        }

        let mut attempt = 1;
        loop {
            match self.attempt(req).await {
                Ok(()) => {
                    tracing::info!(attempt, "Transfer committed");
                    return Ok(());
                }
                Err(e) if e.is_retryable() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_after(attempt);
                    tracing::warn!(attempt, ?delay, "Transfer conflicted, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    if e.kind() == ErrorKind::StorageFault {
                        tracing::error!(attempt, "Transfer failed: {}", e);
                    } else {
                        tracing::warn!(attempt, code = e.code(), "Transfer failed: {}", e);
                    }
                    return Err(e);
                }
            }
        }
    }

    /// One engine call under the configured deadline.
    ///
    /// On timeout the engine future is dropped, which rolls back its open
    /// transaction.
    async fn attempt(&self, req: &TransferRequest) -> Result<(), LedgerError> {
        let call = self.repo.transfer(&req.from, &req.to, req.amount);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| LedgerError::Storage("transfer deadline exceeded".to_string()))?,
            None => call.await,
        }
    }

    /// Get the current balance for the specified account
    pub async fn get_balance(&self, account_id: &str) -> Result<Decimal, LedgerError> {
        self.repo.get_balance(account_id).await
    }

    pub fn repository_name(&self) -> &'static str {
        self.repo.name()
    }
}
