//! PostgreSQL Ledger Store
//!
//! Balance reads and the transfer engine. Each transfer runs in its own
//! SERIALIZABLE transaction:
//!
//! ```text
//! BEGIN → SET ISOLATION SERIALIZABLE → conditional debit → credit → COMMIT
//!                                            ↓               ↓
//!                                  exists? → NotFound    NotFound
//!                                          → Insufficient
//!                                         (ROLLBACK)    (ROLLBACK)
//! ```
//!
//! No in-process locking: concurrent transfers are ordered by PostgreSQL, which
//! aborts one side of a conflicting pair with SQLSTATE 40001.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use super::error::{AccountSide, LedgerError};
use super::models::{Account, TransferOutcome, validate_amount, validate_parties};
use super::repository::AccountRepository;

const SET_SERIALIZABLE: &str = "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE";

/// Test-and-set debit: only succeeds when the balance covers the amount
const DEBIT_IF_SUFFICIENT: &str = r#"
    UPDATE accounts
    SET balance = balance - $1
    WHERE id = $2 AND balance >= $1
"#;

const CREDIT: &str = "UPDATE accounts SET balance = balance + $1 WHERE id = $2";

const ACCOUNT_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM accounts WHERE id = $1)";

const SELECT_ACCOUNT: &str = "SELECT id, balance FROM accounts WHERE id = $1";

const UPSERT_ACCOUNT: &str = r#"
    INSERT INTO accounts (id, balance) VALUES ($1, $2)
    ON CONFLICT (id) DO UPDATE SET balance = EXCLUDED.balance
"#;

/// Account repository backed by the `accounts` table
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn transfer_in_tx(
        &self,
        from: &str,
        to: &str,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        // Dropping `tx` without commit rolls it back, so every `?` below and a
        // cancelled future leave nothing behind.
        let mut tx = self.pool.begin().await?;
        sqlx::query(SET_SERIALIZABLE).execute(&mut *tx).await?;

        let debited = sqlx::query(DEBIT_IF_SUFFICIENT)
            .bind(amount)
            .bind(from)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if debited == 0 {
            let exists: bool = sqlx::query_scalar(ACCOUNT_EXISTS)
                .bind(from)
                .fetch_one(&mut *tx)
                .await?;

            let reason = if exists {
                LedgerError::InsufficientFunds
            } else {
                LedgerError::not_found(AccountSide::Source, from)
            };
            return Err(abort(tx, reason).await);
        }

        let credited = sqlx::query(CREDIT)
            .bind(amount)
            .bind(to)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if credited == 0 {
            return Err(abort(tx, LedgerError::not_found(AccountSide::Destination, to)).await);
        }

        tx.commit().await?;
        Ok(())
    }
}

/// Roll back explicitly and hand back the abort reason.
///
/// A failed rollback is only logged: the connection is closed by the pool and
/// PostgreSQL discards the open transaction with it.
async fn abort(tx: Transaction<'_, Postgres>, reason: LedgerError) -> LedgerError {
    if let Err(e) = tx.rollback().await {
        tracing::warn!(error = %e, "Rollback failed, transaction discarded with its connection");
    }
    reason
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn get_account(&self, id: &str) -> Result<Account, LedgerError> {
        sqlx::query_as::<_, Account>(SELECT_ACCOUNT)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| LedgerError::not_found(AccountSide::Requested, id))
    }

    async fn transfer(&self, from: &str, to: &str, amount: Decimal) -> Result<(), LedgerError> {
        // Callers validate first; repeated here so a bad request can never
        // reach the statements.
        validate_parties(from, to)?;
        validate_amount(amount)?;

        let result = self.transfer_in_tx(from, to, amount).await;

        match TransferOutcome::of(&result) {
            Some(outcome) if outcome.is_committed() => {
                tracing::debug!(from, to, %amount, %outcome, "Transfer finished");
            }
            Some(outcome) => {
                tracing::info!(from, to, %amount, %outcome, "Transfer aborted");
            }
            None => {}
        }
        result
    }

    async fn seed(&self, accounts: &[Account]) -> Result<(), LedgerError> {
        let mut tx = self.pool.begin().await?;

        for account in accounts {
            sqlx::query(UPSERT_ACCOUNT)
                .bind(&account.id)
                .bind(account.balance)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        tracing::info!("Seeded {} accounts", accounts.len());
        Ok(())
    }
}
