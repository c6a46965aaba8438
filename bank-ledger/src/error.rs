//! Error types for the ledger

use crate::types::AccountId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
///
/// `AccountNotFound` and `InsufficientFunds` are the two expected business
/// outcomes of a rejected operation. Neither leaves any state behind.
#[derive(Error, Debug)]
pub enum Error {
    /// Account id is not registered
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Source balance cannot cover principal plus fee
    #[error("Insufficient funds in account {account}: required {required}, available {available}")]
    InsufficientFunds {
        /// Account that was to be debited
        account: AccountId,
        /// Principal plus fee
        required: Decimal,
        /// Balance at the time of the attempt
        available: Decimal,
    },

    /// Amount is negative, zero where a positive value is needed, or otherwise unusable
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Money arithmetic would exceed the representable range
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    /// Account id already registered (only when duplicates are rejected)
    #[error("Duplicate account: {0}")]
    DuplicateAccount(AccountId),

    /// Source and destination are the same account (only when disallowed)
    #[error("Self transfer not allowed for account {0}")]
    SelfTransfer(AccountId),

    /// Audit chain does not verify
    #[error("Audit trail corrupted: {0}")]
    AuditTrail(String),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metrics registry error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short, stable label for the error kind (used as a metric label)
    pub fn kind(&self) -> &'static str {
        match self {
            Error::AccountNotFound(_) => "account_not_found",
            Error::InsufficientFunds { .. } => "insufficient_funds",
            Error::InvalidAmount(_) => "invalid_amount",
            Error::Overflow(_) => "overflow",
            Error::DuplicateAccount(_) => "duplicate_account",
            Error::SelfTransfer(_) => "self_transfer",
            Error::AuditTrail(_) => "audit_trail",
            Error::Concurrency(_) => "concurrency",
            Error::Config(_) => "config",
            Error::Metrics(_) => "metrics",
            Error::Io(_) => "io",
        }
    }

    /// Whether the caller may retry with different input
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::AccountNotFound(_)
                | Error::InsufficientFunds { .. }
                | Error::InvalidAmount(_)
                | Error::Overflow(_)
                | Error::DuplicateAccount(_)
                | Error::SelfTransfer(_)
        )
    }
}
