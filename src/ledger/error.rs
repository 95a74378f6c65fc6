//! Ledger Error Types
//!
//! A closed set of failure kinds shared by the transfer engine, the balance
//! reader and every caller above them. Callers match on [`ErrorKind`], never on
//! message text.

use std::fmt;

use thiserror::Error;

/// SQLSTATE raised by PostgreSQL when a serializable transaction cannot commit
const SERIALIZATION_FAILURE: &str = "40001";
/// SQLSTATE for a detected deadlock; equally safe to retry from scratch
const DEADLOCK_DETECTED: &str = "40P01";

/// Which account of an operation could not be found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountSide {
    /// Debited account of a transfer
    Source,
    /// Credited account of a transfer
    Destination,
    /// Account named by a balance lookup
    Requested,
}

impl AccountSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountSide::Source => "source",
            AccountSide::Destination => "destination",
            AccountSide::Requested => "requested",
        }
    }
}

impl fmt::Display for AccountSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error kind used for comparisons across layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidAmount,
    SameAccount,
    AccountNotFound,
    InsufficientFunds,
    SerializationConflict,
    StorageFault,
}

/// Ledger error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    // === Business rule violations (rejected before any transaction) ===
    #[error("Amount must be positive with at most 2 decimal places")]
    InvalidAmount,

    #[error("Cannot transfer to same account")]
    SameAccount,

    // === Detected inside the transaction ===
    #[error("{side} account not found: {id}")]
    AccountNotFound { side: AccountSide, id: String },

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Transfer aborted by a concurrent modification, safe to retry")]
    SerializationConflict,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    pub fn not_found(side: AccountSide, id: impl Into<String>) -> Self {
        LedgerError::AccountNotFound {
            side,
            id: id.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidAmount => ErrorKind::InvalidAmount,
            LedgerError::SameAccount => ErrorKind::SameAccount,
            LedgerError::AccountNotFound { .. } => ErrorKind::AccountNotFound,
            LedgerError::InsufficientFunds => ErrorKind::InsufficientFunds,
            LedgerError::SerializationConflict => ErrorKind::SerializationConflict,
            LedgerError::Storage(_) => ErrorKind::StorageFault,
        }
    }

    /// Get the error code for API responses and logs
    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::InvalidAmount => "INVALID_AMOUNT",
            ErrorKind::SameAccount => "SAME_ACCOUNT",
            ErrorKind::AccountNotFound => "ACCOUNT_NOT_FOUND",
            ErrorKind::InsufficientFunds => "INSUFFICIENT_FUNDS",
            ErrorKind::SerializationConflict => "SERIALIZATION_CONFLICT",
            ErrorKind::StorageFault => "STORAGE_FAULT",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self.kind() {
            ErrorKind::InvalidAmount | ErrorKind::SameAccount | ErrorKind::InsufficientFunds => {
                400
            }
            ErrorKind::AccountNotFound => 404,
            ErrorKind::SerializationConflict => 409,
            ErrorKind::StorageFault => 500,
        }
    }

    /// Only serialization conflicts may be retried; every other kind is final.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::SerializationConflict
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if matches!(
                db_err.code().as_deref(),
                Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED)
            ) {
                return LedgerError::SerializationConflict;
            }
        }
        LedgerError::Storage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::SameAccount.code(), "SAME_ACCOUNT");
        assert_eq!(LedgerError::InsufficientFunds.code(), "INSUFFICIENT_FUNDS");
        assert_eq!(
            LedgerError::not_found(AccountSide::Source, "x").code(),
            "ACCOUNT_NOT_FOUND"
        );
    }

    #[test]
    fn test_http_status() {
        assert_eq!(LedgerError::InvalidAmount.http_status(), 400);
        assert_eq!(LedgerError::InsufficientFunds.http_status(), 400);
        assert_eq!(
            LedgerError::not_found(AccountSide::Destination, "x").http_status(),
            404
        );
        assert_eq!(LedgerError::SerializationConflict.http_status(), 409);
        assert_eq!(LedgerError::Storage("boom".into()).http_status(), 500);
    }

    #[test]
    fn test_kind_ignores_payload() {
        let a = LedgerError::not_found(AccountSide::Source, "Mark");
        let b = LedgerError::not_found(AccountSide::Destination, "Jane");
        assert_ne!(a, b);
        assert_eq!(a.kind(), b.kind());
    }

    #[test]
    fn test_only_conflict_is_retryable() {
        assert!(LedgerError::SerializationConflict.is_retryable());
        assert!(!LedgerError::InsufficientFunds.is_retryable());
        assert!(!LedgerError::Storage("down".into()).is_retryable());
    }

    #[test]
    fn test_non_database_sqlx_error_is_storage_fault() {
        let err = LedgerError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.kind(), ErrorKind::StorageFault);
        let err = LedgerError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind(), ErrorKind::StorageFault);
    }

    /// Database error carrying an arbitrary SQLSTATE
    #[derive(Debug)]
    struct SqlStateError(&'static str);

    impl fmt::Display for SqlStateError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "sqlstate {}", self.0)
        }
    }

    impl std::error::Error for SqlStateError {}

    impl sqlx::error::DatabaseError for SqlStateError {
        fn message(&self) -> &str {
            "database error"
        }

        fn code(&self) -> Option<std::borrow::Cow<'_, str>> {
            Some(std::borrow::Cow::Borrowed(self.0))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::Other
        }
    }

    fn db_error(sqlstate: &'static str) -> LedgerError {
        LedgerError::from(sqlx::Error::Database(Box::new(SqlStateError(sqlstate))))
    }

    #[test]
    fn test_sqlstate_classification() {
        assert_eq!(db_error("40001"), LedgerError::SerializationConflict);
        assert_eq!(db_error("40P01"), LedgerError::SerializationConflict);
        assert!(db_error("40001").is_retryable());

        // check_violation and friends are faults, not conflicts
        assert_eq!(db_error("23514").kind(), ErrorKind::StorageFault);
        assert_eq!(db_error("40000").kind(), ErrorKind::StorageFault);
    }

    #[test]
    fn test_display() {
        assert_eq!(LedgerError::InsufficientFunds.to_string(), "Insufficient funds");
        assert_eq!(
            LedgerError::not_found(AccountSide::Source, "NonExistent").to_string(),
            "source account not found: NonExistent"
        );
    }
}
