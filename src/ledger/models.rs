//! Ledger data models

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::error::LedgerError;

/// Fractional digits stored for every balance (`DECIMAL(10, 2)`)
pub const BALANCE_SCALE: u32 = 2;

/// A named account and its committed balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: String,
    pub balance: Decimal,
}

impl Account {
    pub fn new(id: impl Into<String>, balance: Decimal) -> Self {
        Self {
            id: id.into(),
            balance,
        }
    }

    /// Demo accounts loaded by the server when seeding is enabled
    pub fn demo_fixtures() -> Vec<Account> {
        vec![
            Account::new("Mark", Decimal::new(100_00, BALANCE_SCALE)),
            Account::new("Jane", Decimal::new(50_00, BALANCE_SCALE)),
            Account::new("Adam", Decimal::new(0, BALANCE_SCALE)),
        ]
    }
}

/// Request to move `amount` from one account to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
}

impl TransferRequest {
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: Decimal) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }

    /// Business-rule checks that must pass before the store is touched
    pub fn validate(&self) -> Result<(), LedgerError> {
        validate_parties(&self.from, &self.to)?;
        validate_amount(self.amount)
    }
}

pub fn validate_parties(from: &str, to: &str) -> Result<(), LedgerError> {
    if from == to {
        return Err(LedgerError::SameAccount);
    }
    Ok(())
}

/// Reject non-positive amounts and amounts finer than a cent.
///
/// The column rounds each row independently, so a sub-cent amount could be
/// rounded differently on the debit and the credit.
pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO || amount.normalize().scale() > BALANCE_SCALE {
        return Err(LedgerError::InvalidAmount);
    }
    Ok(())
}

/// Terminal outcome of a transfer that reached the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferOutcome {
    Committed,
    Aborted(AbortReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbortReason {
    SourceNotFound,
    DestinationNotFound,
    InsufficientFunds,
    SerializationConflict,
    StorageFault,
}

impl TransferOutcome {
    /// Classify an engine result.
    ///
    /// Returns `None` for requests rejected before a transaction was opened.
    pub fn of(result: &Result<(), LedgerError>) -> Option<Self> {
        use super::error::AccountSide;

        let reason = match result {
            Ok(()) => return Some(TransferOutcome::Committed),
            Err(LedgerError::InvalidAmount) | Err(LedgerError::SameAccount) => return None,
            Err(LedgerError::AccountNotFound {
                side: AccountSide::Destination,
                ..
            }) => AbortReason::DestinationNotFound,
            Err(LedgerError::AccountNotFound { .. }) => AbortReason::SourceNotFound,
            Err(LedgerError::InsufficientFunds) => AbortReason::InsufficientFunds,
            Err(LedgerError::SerializationConflict) => AbortReason::SerializationConflict,
            Err(LedgerError::Storage(_)) => AbortReason::StorageFault,
        };
        Some(TransferOutcome::Aborted(reason))
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, TransferOutcome::Committed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferOutcome::Committed => "COMMITTED",
            TransferOutcome::Aborted(AbortReason::SourceNotFound) => "ABORTED_SOURCE_NOT_FOUND",
            TransferOutcome::Aborted(AbortReason::DestinationNotFound) => {
                "ABORTED_DESTINATION_NOT_FOUND"
            }
            TransferOutcome::Aborted(AbortReason::InsufficientFunds) => {
                "ABORTED_INSUFFICIENT_FUNDS"
            }
            TransferOutcome::Aborted(AbortReason::SerializationConflict) => {
                "ABORTED_SERIALIZATION_CONFLICT"
            }
            TransferOutcome::Aborted(AbortReason::StorageFault) => "ABORTED_STORAGE_FAULT",
        }
    }
}

impl fmt::Display for TransferOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
