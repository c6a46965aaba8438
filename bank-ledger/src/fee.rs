//! Transfer fee policy
//!
//! `fee = percent_fee / 100 * amount + flat_fee`. The source account is
//! debited `amount + fee`; the destination receives `amount`.

use crate::{config::FeeConfig, Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Flat plus percentage fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePolicy {
    flat_fee: Decimal,
    percent_fee: Decimal,
}

impl FeePolicy {
    /// Create a policy; both components must be non-negative
    pub fn new(flat_fee: Decimal, percent_fee: Decimal) -> Result<Self> {
        if flat_fee < Decimal::ZERO {
            return Err(Error::InvalidAmount(format!(
                "Flat fee must not be negative, got {}",
                flat_fee
            )));
        }
        if percent_fee < Decimal::ZERO {
            return Err(Error::InvalidAmount(format!(
                "Percent fee must not be negative, got {}",
                percent_fee
            )));
        }

        Ok(Self {
            flat_fee,
            percent_fee,
        })
    }

    /// Policy that charges nothing
    pub fn free() -> Self {
        Self {
            flat_fee: Decimal::ZERO,
            percent_fee: Decimal::ZERO,
        }
    }

    /// Flat component
    pub fn flat_fee(&self) -> Decimal {
        self.flat_fee
    }

    /// Percentage component, in percentage points
    pub fn percent_fee(&self) -> Decimal {
        self.percent_fee
    }

    /// Fee for transferring `amount`
    ///
    /// Fails with `Overflow` when the fee is not representable.
    pub fn compute_fee(&self, amount: Decimal) -> Result<Decimal> {
        (self.percent_fee / Decimal::ONE_HUNDRED)
            .checked_mul(amount)
            .and_then(|percentage| percentage.checked_add(self.flat_fee))
            .ok_or_else(|| Error::Overflow(format!("Fee for amount {} overflows", amount)))
    }

    /// Principal plus fee
    pub fn total_debit(&self, amount: Decimal) -> Result<Decimal> {
        amount
            .checked_add(self.compute_fee(amount)?)
            .ok_or_else(|| Error::Overflow(format!("Total debit for amount {} overflows", amount)))
    }
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self::free()
    }
}

impl TryFrom<&FeeConfig> for FeePolicy {
    type Error = Error;

    fn try_from(config: &FeeConfig) -> Result<Self> {
        Self::new(config.flat_fee, config.percent_fee)
            .map_err(|e| Error::Config(format!("Invalid fee configuration: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_policy() -> FeePolicy {
        FeePolicy::new(Decimal::from(10), Decimal::new(25, 1)).unwrap()
    }

    #[test]
    fn test_compute_fee() {
        let policy = reference_policy();
        assert_eq!(policy.compute_fee(Decimal::from(100)).unwrap(), Decimal::new(125, 1));
        assert_eq!(policy.compute_fee(Decimal::from(50)).unwrap(), Decimal::new(1125, 2));
        assert_eq!(policy.total_debit(Decimal::from(100)).unwrap(), Decimal::new(1125, 1));
    }

    #[test]
    fn test_fee_deterministic() {
        let policy = reference_policy();
        let amount = Decimal::new(123_456, 2);
        assert_eq!(policy.compute_fee(amount).unwrap(), policy.compute_fee(amount).unwrap());
    }

    #[test]
    fn test_free_policy() {
        let policy = FeePolicy::free();
        assert_eq!(policy.compute_fee(Decimal::from(1_000_000)).unwrap(), Decimal::ZERO);
        assert_eq!(FeePolicy::default(), policy);
    }

    #[test]
    fn test_zero_amount_still_pays_flat_fee() {
        let policy = reference_policy();
        assert_eq!(policy.compute_fee(Decimal::ZERO).unwrap(), Decimal::from(10));
    }

    #[test]
    fn test_overflow_reported_not_panicked() {
        let policy = reference_policy();
        assert!(policy.compute_fee(Decimal::MAX).is_ok());
        assert!(matches!(policy.total_debit(Decimal::MAX), Err(Error::Overflow(_))));

        let steep = FeePolicy::new(Decimal::ZERO, Decimal::from(300)).unwrap();
        assert!(matches!(steep.compute_fee(Decimal::MAX), Err(Error::Overflow(_))));
    }

    #[test]
    fn test_negative_components_rejected() {
        assert!(FeePolicy::new(Decimal::from(-1), Decimal::ZERO).is_err());
        assert!(FeePolicy::new(Decimal::ZERO, Decimal::new(-5, 1)).is_err());
    }

    #[test]
    fn test_from_config() {
        let config = FeeConfig {
            flat_fee: Decimal::from(10),
            percent_fee: Decimal::new(25, 1),
        };
        let policy = FeePolicy::try_from(&config).unwrap();
        assert_eq!(policy, reference_policy());

        let bad = FeeConfig {
            flat_fee: Decimal::from(-10),
            percent_fee: Decimal::ZERO,
        };
        assert!(matches!(FeePolicy::try_from(&bad), Err(Error::Config(_))));
    }
}
