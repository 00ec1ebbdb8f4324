//! Voucher aggregate
//!
//! A voucher is a program-issued credit (national, provincial, municipal or
//! special subsidy) with a capped balance, a validity window and a list of
//! order types it may be spent on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, ValidPeriod, VoucherId};
use crate::error::VoucherError;

/// Issuing level of a voucher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherCategory {
    National,
    Provincial,
    Municipal,
    Special,
}

/// Voucher status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherStatus {
    /// Can be spent
    Active,
    /// Validity window has closed
    Expired,
    /// Balance fully consumed
    Used,
    /// Suspended by an operator
    Frozen,
}

/// Kinds of orders a voucher can be scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// GPU instance rental
    ComputeInstance,
    /// Object and block storage
    Storage,
    /// Bandwidth and egress
    Network,
    /// Model inference endpoints
    Inference,
    /// Training jobs
    Training,
}

impl OrderType {
    pub fn all() -> [OrderType; 5] {
        [
            OrderType::ComputeInstance,
            OrderType::Storage,
            OrderType::Network,
            OrderType::Inference,
            OrderType::Training,
        ]
    }
}

/// A discount voucher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    /// Unique identifier
    pub id: VoucherId,
    /// Human-readable voucher code
    pub code: String,
    /// Issuing program (e.g. "Compute Power Subsidy 2026")
    pub program: String,
    /// Issuing level
    pub category: VoucherCategory,
    /// Face value
    total_amount: Money,
    /// Amount already spent
    used_amount: Money,
    /// Window in which the voucher may be spent
    pub validity: ValidPeriod,
    /// Status
    pub status: VoucherStatus,
    /// Order types the voucher applies to
    pub applicable_scopes: Vec<OrderType>,
}

impl Voucher {
    /// Creates a new, unused, active voucher
    ///
    /// # Errors
    ///
    /// Returns `VoucherError::InvalidAmount` unless the face value is positive.
    pub fn new(
        code: impl Into<String>,
        program: impl Into<String>,
        category: VoucherCategory,
        total_amount: Money,
        validity: ValidPeriod,
        applicable_scopes: Vec<OrderType>,
    ) -> Result<Self, VoucherError> {
        if !total_amount.is_positive() {
            return Err(VoucherError::InvalidAmount(format!(
                "face value must be positive, got {}",
                total_amount
            )));
        }

        Ok(Self {
            id: VoucherId::new_v7(),
            code: code.into(),
            program: program.into(),
            category,
            used_amount: Money::zero(total_amount.currency()),
            total_amount,
            validity,
            status: VoucherStatus::Active,
            applicable_scopes,
        })
    }

    /// Sets the amount already spent, e.g. when loading a partially used voucher
    ///
    /// A voucher whose balance reaches zero is marked `Used`.
    pub fn with_used_amount(mut self, used: Money) -> Result<Self, VoucherError> {
        used.ensure_non_negative()?;
        if used.checked_cmp(&self.total_amount)?.is_gt() {
            return Err(VoucherError::UsedExceedsTotal {
                used: used.to_string(),
                total: self.total_amount.to_string(),
            });
        }
        self.used_amount = used;
        if self.remaining_amount().is_zero() {
            self.status = VoucherStatus::Used;
        }
        Ok(self)
    }

    pub fn with_status(mut self, status: VoucherStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_id(mut self, id: VoucherId) -> Self {
        self.id = id;
        self
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn used_amount(&self) -> Money {
        self.used_amount
    }

    pub fn currency(&self) -> Currency {
        self.total_amount.currency()
    }

    /// Remaining spendable balance, `total - used`
    pub fn remaining_amount(&self) -> Money {
        // Same currency and used <= total are construction invariants.
        self.total_amount
            .saturating_sub(&self.used_amount)
            .unwrap_or_else(|_| Money::zero(self.currency()))
    }

    pub fn applies_to(&self, order_type: OrderType) -> bool {
        self.applicable_scopes.contains(&order_type)
    }

    /// Returns true if the voucher can be spent on `order_type` at `now`
    pub fn is_usable_for(&self, order_type: OrderType, now: DateTime<Utc>) -> bool {
        self.status == VoucherStatus::Active
            && self.remaining_amount().is_positive()
            && self.validity.contains(now)
            && self.applies_to(order_type)
    }

    /// Checks usability and explains the first failing condition
    pub fn ensure_usable_for(&self, order_type: OrderType, now: DateTime<Utc>) -> Result<(), VoucherError> {
        let reason = if self.status != VoucherStatus::Active {
            format!("status is {:?}", self.status)
        } else if !self.remaining_amount().is_positive() {
            "no remaining balance".to_string()
        } else if !self.validity.contains(now) {
            "outside validity window".to_string()
        } else if !self.applies_to(order_type) {
            format!("not applicable to {:?} orders", order_type)
        } else {
            return Ok(());
        };

        Err(VoucherError::NotUsable {
            code: self.code.clone(),
            reason,
        })
    }

    /// Spends `amount` from the voucher
    ///
    /// # Errors
    ///
    /// Fails if the amount is not positive, exceeds the remaining balance, or
    /// is in another currency. The voucher is left unchanged on error.
    pub fn consume(&mut self, amount: Money) -> Result<(), VoucherError> {
        if !amount.is_positive() {
            return Err(VoucherError::InvalidAmount(format!(
                "consumption must be positive, got {}",
                amount
            )));
        }
        let remaining = self.remaining_amount();
        if amount.checked_cmp(&remaining)?.is_gt() {
            return Err(VoucherError::InsufficientRemaining {
                code: self.code.clone(),
                requested: amount.to_string(),
                remaining: remaining.to_string(),
            });
        }

        self.used_amount = self.used_amount.checked_add(&amount)?;
        if self.remaining_amount().is_zero() {
            self.status = VoucherStatus::Used;
        }
        Ok(())
    }

    /// Marks an active voucher as expired once its window has closed
    ///
    /// Returns true if the status changed.
    pub fn refresh_expiry(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == VoucherStatus::Active && self.validity.has_ended(now) {
            self.status = VoucherStatus::Expired;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap()
    }

    fn voucher(total: rust_decimal::Decimal) -> Voucher {
        Voucher::new(
            "GPU-2026-001",
            "Compute Power Subsidy",
            VoucherCategory::National,
            Money::new(total, Currency::CNY),
            ValidPeriod::bounded(now() - Duration::days(10), now() + Duration::days(20)).unwrap(),
            vec![OrderType::ComputeInstance, OrderType::Training],
        )
        .unwrap()
    }

    #[test]
    fn test_new_voucher_is_active_and_unused() {
        let v = voucher(dec!(2000));
        assert_eq!(v.status, VoucherStatus::Active);
        assert_eq!(v.remaining_amount().amount(), dec!(2000));
        assert!(v.is_usable_for(OrderType::ComputeInstance, now()));
    }

    #[test]
    fn test_rejects_zero_face_value() {
        let result = Voucher::new(
            "ZERO",
            "p",
            VoucherCategory::Special,
            Money::zero(Currency::CNY),
            ValidPeriod::from(now()),
            vec![],
        );
        assert!(matches!(result, Err(VoucherError::InvalidAmount(_))));
    }

    #[test]
    fn test_scope_mismatch_is_not_usable() {
        let v = voucher(dec!(2000));
        assert!(!v.is_usable_for(OrderType::Storage, now()));
        assert!(matches!(
            v.ensure_usable_for(OrderType::Storage, now()),
            Err(VoucherError::NotUsable { .. })
        ));
    }

    #[test]
    fn test_consume_drains_to_used() {
        let mut v = voucher(dec!(100));
        v.consume(Money::new(dec!(40), Currency::CNY)).unwrap();
        assert_eq!(v.remaining_amount().amount(), dec!(60));
        v.consume(Money::new(dec!(60), Currency::CNY)).unwrap();
        assert_eq!(v.status, VoucherStatus::Used);
        assert!(!v.is_usable_for(OrderType::ComputeInstance, now()));
    }

    #[test]
    fn test_consume_more_than_remaining_fails_without_change() {
        let mut v = voucher(dec!(100));
        let result = v.consume(Money::new(dec!(100.01), Currency::CNY));
        assert!(matches!(result, Err(VoucherError::InsufficientRemaining { .. })));
        assert_eq!(v.used_amount().amount(), dec!(0));
    }

    #[test]
    fn test_used_amount_cannot_exceed_total() {
        let result = voucher(dec!(100)).with_used_amount(Money::new(dec!(150), Currency::CNY));
        assert!(matches!(result, Err(VoucherError::UsedExceedsTotal { .. })));
    }

    #[test]
    fn test_refresh_expiry() {
        let mut v = voucher(dec!(100));
        assert!(!v.refresh_expiry(now()));
        assert!(v.refresh_expiry(now() + Duration::days(30)));
        assert_eq!(v.status, VoucherStatus::Expired);
    }
}
