//! Ledger
//!
//! Named accounts with fixed-point balances and the atomic transfer engine
//! that moves funds between them.
//!
//! # Safety Invariants
//!
//! 1. **Conservation**: a committed transfer debits and credits the same amount
//! 2. **Non-negative**: the debit only applies when the balance covers it
//! 3. **All-or-nothing**: any path that does not commit rolls back
//! 4. **No hidden retries**: serialization conflicts surface to the caller

pub mod error;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod schema;

// Re-exports for convenience
pub use error::{AccountSide, ErrorKind, LedgerError};
pub use models::{AbortReason, Account, TransferOutcome, TransferRequest};
pub use postgres::PgAccountRepository;
pub use repository::AccountRepository;
pub use schema::init_schema;
