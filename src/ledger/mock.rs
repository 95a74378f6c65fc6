//! In-memory account repository for testing
//!
//! Honors the same contract as the PostgreSQL store. A single mutex stands in
//! for serializable isolation; conflicts and latency can be injected to drive
//! the retry and deadline paths of callers.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::error::{AccountSide, LedgerError};
use super::models::{Account, validate_amount, validate_parties};
use super::repository::AccountRepository;

#[derive(Default)]
pub struct MockAccountRepository {
    balances: Mutex<HashMap<String, Decimal>>,
    /// Count of transfer calls that reached the store
    transfer_count: AtomicUsize,
    /// Number of upcoming transfers to abort with a serialization conflict
    conflicts_remaining: AtomicUsize,
    /// Latency before a transfer applies its changes
    transfer_delay: Mutex<Option<Duration>>,
}

impl MockAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(accounts: &[Account]) -> Self {
        let repo = Self::new();
        {
            let mut balances = repo.balances.lock().unwrap();
            for account in accounts {
                balances.insert(account.id.clone(), account.balance);
            }
        }
        repo
    }

    pub fn set_conflicts(&self, count: usize) {
        self.conflicts_remaining.store(count, Ordering::SeqCst);
    }

    pub fn set_transfer_delay(&self, delay: Duration) {
        *self.transfer_delay.lock().unwrap() = Some(delay);
    }

    pub fn transfer_count(&self) -> usize {
        self.transfer_count.load(Ordering::SeqCst)
    }

    pub fn balance_of(&self, id: &str) -> Option<Decimal> {
        self.balances.lock().unwrap().get(id).copied()
    }

    pub fn total(&self) -> Decimal {
        self.balances.lock().unwrap().values().copied().sum()
    }

    fn take_conflict(&self) -> bool {
        self.conflicts_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl AccountRepository for MockAccountRepository {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get_account(&self, id: &str) -> Result<Account, LedgerError> {
        self.balance_of(id)
            .map(|balance| Account::new(id, balance))
            .ok_or_else(|| LedgerError::not_found(AccountSide::Requested, id))
    }

    async fn transfer(&self, from: &str, to: &str, amount: Decimal) -> Result<(), LedgerError> {
        validate_parties(from, to)?;
        validate_amount(amount)?;
        self.transfer_count.fetch_add(1, Ordering::SeqCst);

        let delay = *self.transfer_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.take_conflict() {
            return Err(LedgerError::SerializationConflict);
        }

        let mut balances = self.balances.lock().unwrap();
        let source = *balances
            .get(from)
            .ok_or_else(|| LedgerError::not_found(AccountSide::Source, from))?;
        if source < amount {
            return Err(LedgerError::InsufficientFunds);
        }
        if !balances.contains_key(to) {
            return Err(LedgerError::not_found(AccountSide::Destination, to));
        }

        balances.insert(from.to_string(), source - amount);
        if let Some(target) = balances.get_mut(to) {
            *target += amount;
        }
        Ok(())
    }

    async fn seed(&self, accounts: &[Account]) -> Result<(), LedgerError> {
        let mut balances = self.balances.lock().unwrap();
        for account in accounts {
            balances.insert(account.id.clone(), account.balance);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::error::ErrorKind;
    use rust_decimal_macros::dec;

    fn seeded() -> MockAccountRepository {
        MockAccountRepository::with_accounts(&Account::demo_fixtures())
    }

    #[tokio::test]
    async fn test_mock_transfer_success() {
        let repo = seeded();

        repo.transfer("Mark", "Jane", dec!(50)).await.unwrap();

        assert_eq!(repo.get_balance("Mark").await.unwrap(), dec!(50));
        assert_eq!(repo.get_balance("Jane").await.unwrap(), dec!(100));
        assert_eq!(repo.transfer_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_transfer_failures_leave_balances() {
        let repo = seeded();
        let total = repo.total();

        let err = repo.transfer("Adam", "Jane", dec!(50)).await.unwrap_err();
        assert_eq!(err, LedgerError::InsufficientFunds);

        let err = repo.transfer("Mark", "Nobody", dec!(50)).await.unwrap_err();
        assert_eq!(err, LedgerError::not_found(AccountSide::Destination, "Nobody"));

        assert_eq!(repo.balance_of("Mark"), Some(dec!(100)));
        assert_eq!(repo.balance_of("Jane"), Some(dec!(50)));
        assert_eq!(repo.total(), total);
    }

    #[tokio::test]
    async fn test_mock_injected_conflicts() {
        let repo = seeded();
        repo.set_conflicts(1);

        let err = repo.transfer("Mark", "Jane", dec!(1)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SerializationConflict);
        assert!(repo.transfer("Mark", "Jane", dec!(1)).await.is_ok());
        assert_eq!(repo.transfer_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_get_unknown_account() {
        let repo = seeded();
        let err = repo.get_account("mark").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccountNotFound);
    }
}
