//! Account: an identified balance holder

use crate::{types::AccountSummary, AccountId, Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account with a non-negative balance
///
/// The balance can only change through [`Account::deposit`] and
/// [`Account::withdraw`]; `withdraw` refuses to overdraw, so the balance never
/// goes below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    owner_name: String,
    balance: Decimal,
}

impl Account {
    /// Create an account with an opening balance
    pub fn new(
        id: impl Into<AccountId>,
        owner_name: impl Into<String>,
        balance: Decimal,
    ) -> Result<Self> {
        let id = id.into();
        if balance < Decimal::ZERO {
            return Err(Error::InvalidAmount(format!(
                "Opening balance of account {} must not be negative, got {}",
                id, balance
            )));
        }

        Ok(Self {
            id,
            owner_name: owner_name.into(),
            balance,
        })
    }

    /// Account ID
    pub fn id(&self) -> &AccountId {
        &self.id
    }

    /// Owner name
    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    /// Current balance
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Balance after crediting `amount`, without applying it
    pub fn balance_after_deposit(&self, amount: Decimal) -> Result<Decimal> {
        self.balance.checked_add(amount).ok_or_else(|| {
            Error::Overflow(format!(
                "Crediting {} to account {} overflows its balance",
                amount, self.id
            ))
        })
    }

    /// Credit the account
    ///
    /// Callers pass non-negative amounts; the ledger validates before calling.
    /// On overflow the balance is left unchanged.
    pub fn deposit(&mut self, amount: Decimal) -> Result<()> {
        debug_assert!(amount >= Decimal::ZERO, "deposit of negative amount");
        self.balance = self.balance_after_deposit(amount)?;
        Ok(())
    }

    /// Debit the account if the balance covers `amount`
    ///
    /// Returns `false` and leaves the balance untouched otherwise.
    pub fn withdraw(&mut self, amount: Decimal) -> bool {
        if self.balance >= amount {
            self.balance -= amount;
            true
        } else {
            false
        }
    }

    /// Read-only snapshot
    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            id: self.id.clone(),
            owner_name: self.owner_name.clone(),
            balance: self.balance,
        }
    }
}
