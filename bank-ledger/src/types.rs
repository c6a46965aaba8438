//! Core types for the ledger
//!
//! All types are designed for:
//! - Exact arithmetic (Decimal for money)
//! - Immutability of the audit trail (records expose read accessors only)
//! - Cheap snapshots for presentation layers (serde)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Account identifier (account number, IBAN, etc.)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create new account ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AccountId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One completed transfer in the audit trail
///
/// Created exactly once per committed transfer and never mutated afterwards.
/// `sequence` is the record's position in the log, so ordering by sequence is
/// chronological ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub(crate) sequence: u64,
    pub(crate) transaction_id: Uuid,
    #[serde(with = "rust_decimal::serde::str")]
    pub(crate) amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub(crate) fee: Decimal,
    pub(crate) source: AccountId,
    pub(crate) destination: AccountId,
    pub(crate) reason: String,
    pub(crate) recorded_at: DateTime<Utc>,
    pub(crate) previous_hash: [u8; 32],
    pub(crate) hash: [u8; 32],
}

impl TransactionRecord {
    /// Position in the transaction log (0-based)
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Unique transaction ID (UUIDv7 for time-ordering)
    pub fn transaction_id(&self) -> Uuid {
        self.transaction_id
    }

    /// Principal transferred, excluding the fee
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Fee charged to the source on top of the principal
    pub fn fee(&self) -> Decimal {
        self.fee
    }

    /// Debited account
    pub fn source(&self) -> &AccountId {
        &self.source
    }

    /// Credited account
    pub fn destination(&self) -> &AccountId {
        &self.destination
    }

    /// Free-form transfer reason
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Commit timestamp
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    /// Hash of the preceding record (zeros for the first)
    pub fn previous_hash(&self) -> &[u8; 32] {
        &self.previous_hash
    }

    /// Hash of this record, chained over `previous_hash`
    pub fn hash(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Whether the account took part in this transfer on either side
    pub fn involves(&self, account_id: &AccountId) -> bool {
        &self.source == account_id || &self.destination == account_id
    }

    /// Total debited from the source (principal plus fee)
    pub fn total_debit(&self) -> Decimal {
        self.amount + self.fee
    }
}

/// Read-only account snapshot for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    /// Account ID
    pub id: AccountId,
    /// Owner name
    pub owner_name: String,
    /// Balance at snapshot time
    #[serde(with = "rust_decimal::serde::str")]
    pub balance: Decimal,
}

/// Cost of a transfer computed without committing it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferQuote {
    /// Principal
    pub amount: Decimal,
    /// Fee under the ledger's policy
    pub fee: Decimal,
    /// What the source would be debited
    pub total_debit: Decimal,
}

/// One statement entry: a record plus its effect on the statement's account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    /// The underlying record
    pub record: TransactionRecord,
    /// Signed balance change for the statement's account
    pub delta: Decimal,
}

/// Account statement (balance plus chronological history)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Account ID
    pub account_id: AccountId,
    /// Owner name
    pub owner_name: String,
    /// Current balance
    pub balance: Decimal,
    /// Records involving the account, oldest first
    pub lines: Vec<StatementLine>,
}

impl Statement {
    /// Net effect of all listed transfers on the account
    pub fn net_change(&self) -> Decimal {
        self.lines.iter().map(|line| line.delta).sum()
    }
}
