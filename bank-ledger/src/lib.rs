//! Bank Ledger
//!
//! In-memory ledger for a single bank: named accounts, fee-charging
//! transfers between them, and an append-only, hash-chained audit trail.
//!
//! # Architecture
//!
//! - **Account**: identity plus a balance guarded against overdraft
//! - **Fee Policy**: flat + percentage fee, charged to the source
//! - **Ledger**: owns accounts and the transaction log, executes transfers
//! - **Actor**: single-writer task serializing access from many callers

#![forbid(unsafe_code)]
//!
//! # Invariants
//!
//! - Balances never go negative
//! - A transfer commits fully or not at all
//! - Fees collected == Σ fee, amount transferred == Σ principal over committed transfers
//! - Append-only: records never modified or deleted

#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod account;
pub mod actor;
pub mod audit;
pub mod bank;
pub mod config;
pub mod error;
pub mod fee;
pub mod ledger;
pub mod metrics;
pub mod types;

// Re-exports
pub use account::Account;
pub use actor::{spawn_ledger_actor, LedgerHandle, LedgerTotals};
pub use bank::Bank;
pub use config::Config;
pub use error::{Error, Result};
pub use fee::FeePolicy;
pub use ledger::Ledger;
pub use metrics::LedgerMetrics;
pub use types::{
    AccountId, AccountSummary, Statement, StatementLine, TransactionRecord, TransferQuote,
};
