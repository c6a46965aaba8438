//! Capability set every bank variant exposes
//!
//! Presentation layers and services program against [`Bank`] rather than a
//! concrete ledger, so fee-charging and fee-free ledgers are interchangeable.

use crate::{
    types::{AccountSummary, TransactionRecord},
    Account, AccountId, Result,
};
use rust_decimal::Decimal;

/// Bank operations
pub trait Bank {
    /// Bank name
    fn name(&self) -> &str;

    /// Register an account under its id
    fn add_account(&mut self, account: Account) -> Result<()>;

    /// Move `amount` from `source` to `destination`, charging the fee to `source`
    fn transfer(
        &mut self,
        source: &AccountId,
        destination: &AccountId,
        amount: Decimal,
        reason: &str,
    ) -> Result<TransactionRecord>;

    /// Current balance of a registered account
    fn balance(&self, account_id: &AccountId) -> Result<Decimal>;

    /// Records where the account is source or destination, oldest first
    fn transactions_for_account(&self, account_id: &AccountId) -> Vec<TransactionRecord>;

    /// Snapshot of all accounts
    fn list_accounts(&self) -> Vec<AccountSummary>;

    /// Sum of fees over committed transfers
    fn total_fees_collected(&self) -> Decimal;

    /// Sum of principal over committed transfers
    fn total_amount_transferred(&self) -> Decimal;
}
