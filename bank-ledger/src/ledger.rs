//! Ledger: account registry, transfer engine and audit trail
//!
//! A transfer either commits completely (debit of principal plus fee,
//! credit of principal, one appended record, both aggregates updated) or is
//! rejected with no observable change.
//!
//! # Example
//!
//! ```
//! use bank_ledger::{Account, AccountId, Bank, FeePolicy, Ledger};
//! use rust_decimal::Decimal;
//!
//! # fn main() -> bank_ledger::Result<()> {
//! let policy = FeePolicy::new(Decimal::from(10), Decimal::new(25, 1))?;
//! let mut ledger = Ledger::new("MyBank", policy);
//! ledger.add_account(Account::new("123", "John Doe", Decimal::from(1000))?)?;
//! ledger.add_account(Account::new("456", "Jane Smith", Decimal::from(5000))?)?;
//!
//! let record = ledger.transfer(
//!     &AccountId::new("123"),
//!     &AccountId::new("456"),
//!     Decimal::from(100),
//!     "National Payment",
//! )?;
//! assert_eq!(record.fee(), Decimal::new(125, 1));
//! assert_eq!(ledger.balance(&AccountId::new("123"))?, Decimal::new(8875, 1));
//! # Ok(())
//! # }
//! ```

use crate::{
    audit::{self, RecordContents, GENESIS_HASH},
    config::ValidationConfig,
    metrics::LedgerMetrics,
    types::{AccountSummary, Statement, StatementLine, TransactionRecord, TransferQuote},
    Account, AccountId, Bank, Config, Error, FeePolicy, Result,
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// In-memory ledger for a single bank
#[derive(Debug)]
pub struct Ledger {
    name: String,
    fee_policy: FeePolicy,
    validation: ValidationConfig,
    accounts: HashMap<AccountId, Account>,
    /// Append-only; index == sequence
    transactions: Vec<TransactionRecord>,
    total_fees_collected: Decimal,
    total_amount_transferred: Decimal,
    metrics: Option<LedgerMetrics>,
}

impl Ledger {
    /// Create an empty ledger charging fees per `fee_policy`
    pub fn new(name: impl Into<String>, fee_policy: FeePolicy) -> Self {
        Self {
            name: name.into(),
            fee_policy,
            validation: ValidationConfig::default(),
            accounts: HashMap::new(),
            transactions: Vec::new(),
            total_fees_collected: Decimal::ZERO,
            total_amount_transferred: Decimal::ZERO,
            metrics: None,
        }
    }

    /// Ledger whose transfers cost exactly the principal
    pub fn fee_free(name: impl Into<String>) -> Self {
        Self::new(name, FeePolicy::free())
    }

    /// Build from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let fee_policy = FeePolicy::try_from(&config.fees)?;
        Ok(Self::new(config.bank_name.clone(), fee_policy).with_validation(config.validation.clone()))
    }

    /// Replace validation toggles
    pub fn with_validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = validation;
        self
    }

    /// Attach a metrics collector
    pub fn with_metrics(mut self, metrics: LedgerMetrics) -> Self {
        metrics.set_accounts(self.accounts.len());
        self.metrics = Some(metrics);
        self
    }

    /// Fee policy in force
    pub fn fee_policy(&self) -> &FeePolicy {
        &self.fee_policy
    }

    /// Look up a registered account
    pub fn account(&self, account_id: &AccountId) -> Result<&Account> {
        self.accounts
            .get(account_id)
            .ok_or_else(|| Error::AccountNotFound(account_id.clone()))
    }

    /// Number of registered accounts
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Full transaction log, oldest first
    pub fn transactions(&self) -> &[TransactionRecord] {
        &self.transactions
    }

    /// Sum of every account balance
    pub fn total_holdings(&self) -> Result<Decimal> {
        self.accounts
            .values()
            .try_fold(Decimal::ZERO, |total, account| total.checked_add(account.balance()))
            .ok_or_else(|| Error::Overflow("Total holdings overflow".to_string()))
    }

    /// Transfer using account objects
    ///
    /// The accounts are resolved by id against the registry, so a stale copy
    /// cannot move funds the registry does not hold.
    pub fn transfer_between(
        &mut self,
        source: &Account,
        destination: &Account,
        amount: Decimal,
        reason: &str,
    ) -> Result<TransactionRecord> {
        self.transfer(source.id(), destination.id(), amount, reason)
    }

    /// Price a transfer without executing it
    pub fn quote(&self, amount: Decimal) -> Result<TransferQuote> {
        validate_amount(amount)?;
        let fee = self.fee_policy.compute_fee(amount)?;
        Ok(TransferQuote {
            amount,
            fee,
            total_debit: self.fee_policy.total_debit(amount)?,
        })
    }

    /// Balance and chronological history for one account
    pub fn statement(&self, account_id: &AccountId) -> Result<Statement> {
        let account = self.account(account_id)?;

        let lines = self
            .transactions
            .iter()
            .filter(|record| record.involves(account_id))
            .map(|record| StatementLine {
                delta: delta_for(record, account_id),
                record: record.clone(),
            })
            .collect();

        Ok(Statement {
            account_id: account_id.clone(),
            owner_name: account.owner_name().to_string(),
            balance: account.balance(),
            lines,
        })
    }

    /// Recompute the audit chain over the whole log
    pub fn verify_audit_trail(&self) -> Result<()> {
        audit::verify_chain(&self.transactions)
    }

    fn execute_transfer(
        &mut self,
        source: &AccountId,
        destination: &AccountId,
        amount: Decimal,
        reason: &str,
    ) -> Result<TransactionRecord> {
        validate_amount(amount)?;

        if source == destination && !self.validation.allow_self_transfer {
            return Err(Error::SelfTransfer(source.clone()));
        }

        // Resolve both sides and do all arithmetic before touching any balance
        self.account(source)?;
        let destination_account = self.account(destination)?;

        let fee = self.fee_policy.compute_fee(amount)?;
        let required = self.fee_policy.total_debit(amount)?;

        // A self transfer nets out below the current balance
        if source != destination {
            destination_account.balance_after_deposit(amount)?;
        }

        let total_fees_collected = self
            .total_fees_collected
            .checked_add(fee)
            .ok_or_else(|| Error::Overflow("Total fees collected overflow".to_string()))?;
        let total_amount_transferred = self
            .total_amount_transferred
            .checked_add(amount)
            .ok_or_else(|| Error::Overflow("Total amount transferred overflow".to_string()))?;

        let source_account = self.account_mut(source)?;
        if !source_account.withdraw(required) {
            return Err(Error::InsufficientFunds {
                account: source.clone(),
                required,
                available: source_account.balance(),
            });
        }

        // Existence and headroom were checked above; `&mut self` rules out changes since
        self.account_mut(destination)?.deposit(amount)?;

        let record = self.append_record(source, destination, amount, fee, reason);
        self.total_fees_collected = total_fees_collected;
        self.total_amount_transferred = total_amount_transferred;

        Ok(record)
    }

    fn append_record(
        &mut self,
        source: &AccountId,
        destination: &AccountId,
        amount: Decimal,
        fee: Decimal,
        reason: &str,
    ) -> TransactionRecord {
        let previous_hash = self
            .transactions
            .last()
            .map(|record| *record.hash())
            .unwrap_or(GENESIS_HASH);

        let contents = RecordContents {
            sequence: self.transactions.len() as u64,
            transaction_id: Uuid::now_v7(),
            amount,
            fee,
            source,
            destination,
            reason,
            recorded_at: Utc::now(),
        };
        let hash = audit::hash_record(&contents, &previous_hash);

        let record = TransactionRecord {
            sequence: contents.sequence,
            transaction_id: contents.transaction_id,
            amount,
            fee,
            source: source.clone(),
            destination: destination.clone(),
            reason: reason.to_string(),
            recorded_at: contents.recorded_at,
            previous_hash,
            hash,
        };

        self.transactions.push(record.clone());
        record
    }

    fn account_mut(&mut self, account_id: &AccountId) -> Result<&mut Account> {
        self.accounts
            .get_mut(account_id)
            .ok_or_else(|| Error::AccountNotFound(account_id.clone()))
    }
}

impl Bank for Ledger {
    fn name(&self) -> &str {
        &self.name
    }

    fn add_account(&mut self, account: Account) -> Result<()> {
        let id = account.id().clone();

        if self.accounts.contains_key(&id) {
            if self.validation.reject_duplicate_accounts {
                warn!(account = %id, "Rejected duplicate account registration");
                return Err(Error::DuplicateAccount(id));
            }
            warn!(account = %id, "Replacing existing account with the same id");
        }

        info!(
            account = %id,
            owner = account.owner_name(),
            balance = %account.balance(),
            "Account registered"
        );
        self.accounts.insert(id, account);

        if let Some(metrics) = &self.metrics {
            metrics.set_accounts(self.accounts.len());
        }

        Ok(())
    }

    fn transfer(
        &mut self,
        source: &AccountId,
        destination: &AccountId,
        amount: Decimal,
        reason: &str,
    ) -> Result<TransactionRecord> {
        let result = self.execute_transfer(source, destination, amount, reason);

        match &result {
            Ok(record) => {
                info!(
                    sequence = record.sequence(),
                    transaction_id = %record.transaction_id(),
                    source = %source,
                    destination = %destination,
                    amount = %amount,
                    fee = %record.fee(),
                    reason,
                    "Transfer committed"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_transfer(amount);
                }
            }
            Err(e) => {
                warn!(
                    source = %source,
                    destination = %destination,
                    amount = %amount,
                    error = %e,
                    "Transfer rejected"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_rejection(e.kind());
                }
            }
        }

        result
    }

    fn balance(&self, account_id: &AccountId) -> Result<Decimal> {
        debug!(account = %account_id, "Balance query");
        self.account(account_id).map(Account::balance)
    }

    fn transactions_for_account(&self, account_id: &AccountId) -> Vec<TransactionRecord> {
        self.transactions
            .iter()
            .filter(|record| record.involves(account_id))
            .cloned()
            .collect()
    }

    fn list_accounts(&self) -> Vec<AccountSummary> {
        let mut summaries: Vec<AccountSummary> =
            self.accounts.values().map(Account::summary).collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }

    fn total_fees_collected(&self) -> Decimal {
        self.total_fees_collected
    }

    fn total_amount_transferred(&self) -> Decimal {
        self.total_amount_transferred
    }
}

fn validate_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidAmount(format!(
            "Transfer amount must be positive, got {}",
            amount
        )));
    }
    Ok(())
}

/// Signed balance change of `account_id` caused by `record`
fn delta_for(record: &TransactionRecord, account_id: &AccountId) -> Decimal {
    let outgoing = record.source() == account_id;
    let incoming = record.destination() == account_id;

    match (outgoing, incoming) {
        (true, true) => -record.fee(),
        (true, false) => -record.total_debit(),
        (false, true) => record.amount(),
        (false, false) => Decimal::ZERO,
    }
}
