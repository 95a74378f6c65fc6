//! Account repository seam
//!
//! Everything above the store (service, gateway, tests) talks to accounts
//! through [`AccountRepository`]. [`super::postgres::PgAccountRepository`] is
//! the production implementation.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::models::Account;

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Get implementation name for logging
    fn name(&self) -> &'static str;

    /// Read one account by exact, case-sensitive id.
    ///
    /// Observes some committed state; it is not ordered against transfers
    /// still in flight.
    async fn get_account(&self, id: &str) -> Result<Account, LedgerError>;

    async fn get_balance(&self, id: &str) -> Result<Decimal, LedgerError> {
        Ok(self.get_account(id).await?.balance)
    }

    /// Move `amount` from `from` to `to` as one atomic unit.
    ///
    /// Either both balances change or neither does. Never retries on its own:
    /// [`LedgerError::SerializationConflict`] is returned to the caller.
    async fn transfer(&self, from: &str, to: &str, amount: Decimal) -> Result<(), LedgerError>;

    /// Upsert accounts by id, overwriting existing balances
    async fn seed(&self, accounts: &[Account]) -> Result<(), LedgerError>;
}
