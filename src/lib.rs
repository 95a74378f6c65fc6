//! money_transfer - atomic transfers between named accounts
//!
//! Balances live in a single PostgreSQL table. Every transfer runs in its own
//! SERIALIZABLE transaction, so concurrent callers never create, destroy or
//! half-apply money.
//!
//! # Modules
//!
//! - [`ledger`] - Accounts, error taxonomy, schema and the transfer engine
//! - [`service`] - Request validation, bounded conflict retry, deadlines
//! - [`gateway`] - axum HTTP API over the service
//! - [`db`] - PostgreSQL connection pool
//! - [`config`] - YAML configuration
//! - [`logging`] - tracing subscriber setup

pub mod config;
pub mod db;
pub mod gateway;
pub mod ledger;
pub mod logging;
pub mod service;

// Convenient re-exports at crate root
pub use db::Database;
pub use ledger::{
    Account, AccountRepository, AccountSide, ErrorKind, LedgerError, PgAccountRepository,
    TransferOutcome, TransferRequest,
};
pub use service::{BankService, RetryPolicy};
