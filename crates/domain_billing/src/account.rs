//! Account balance
//!
//! The prepaid balance is the second layer of a mixed payment: it covers
//! whatever the selected vouchers leave open. Top-ups happen elsewhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, Currency, Money};
use crate::error::BillingError;

/// Spendable balance of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Account identifier
    pub account_id: AccountId,
    /// Available balance, never negative
    available: Money,
    /// When the balance was last read or changed
    pub as_of: DateTime<Utc>,
}

impl AccountBalance {
    /// Creates a balance snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if `available` is negative.
    pub fn new(account_id: AccountId, available: Money) -> Result<Self, BillingError> {
        available.ensure_non_negative()?;
        Ok(Self {
            account_id,
            available,
            as_of: Utc::now(),
        })
    }

    /// An empty balance in `currency`
    pub fn empty(account_id: AccountId, currency: Currency) -> Self {
        Self {
            account_id,
            available: Money::zero(currency),
            as_of: Utc::now(),
        }
    }

    pub fn available(&self) -> Money {
        self.available
    }

    pub fn currency(&self) -> Currency {
        self.available.currency()
    }

    /// Debits the balance
    ///
    /// # Errors
    ///
    /// Returns `BillingError::InsufficientBalance` if `amount` exceeds the
    /// available balance; the balance is unchanged in that case.
    pub fn debit(&mut self, amount: Money) -> Result<(), BillingError> {
        amount.ensure_non_negative()?;
        if amount.checked_cmp(&self.available)?.is_gt() {
            return Err(BillingError::InsufficientBalance {
                requested: amount.to_string(),
                available: self.available.to_string(),
            });
        }
        self.available = self.available.checked_sub(&amount)?;
        self.as_of = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_negative_balance_rejected() {
        let result = AccountBalance::new(AccountId::new(), Money::new(dec!(-1), Currency::CNY));
        assert!(result.is_err());
    }

    #[test]
    fn test_debit() {
        let mut balance = AccountBalance::new(AccountId::new(), Money::new(dec!(2000), Currency::CNY)).unwrap();
        balance.debit(Money::new(dec!(1500), Currency::CNY)).unwrap();
        assert_eq!(balance.available().amount(), dec!(500));
    }

    #[test]
    fn test_overdraw_rejected() {
        let mut balance = AccountBalance::empty(AccountId::new(), Currency::CNY);
        let result = balance.debit(Money::new(dec!(0.01), Currency::CNY));
        assert!(matches!(result, Err(BillingError::InsufficientBalance { .. })));
        assert!(balance.available().is_zero());
    }
}
