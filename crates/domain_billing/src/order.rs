//! Orders awaiting payment
//!
//! The payment flow only needs an order's type (to scope vouchers) and its
//! unpaid amount. Paid/unpaid bookkeeping is updated after a successful
//! submission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, Currency, Money, OrderId};
use domain_voucher::OrderType;
use crate::error::BillingError;

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Nothing paid yet
    Unpaid,
    /// Some amount paid, balance outstanding
    PartiallyPaid,
    /// Fully settled
    Paid,
}

/// An order for GPU-cloud resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier
    pub id: OrderId,
    /// Order number shown in the console
    pub order_number: String,
    /// What was ordered; decides which vouchers apply
    pub order_type: OrderType,
    /// Paying account
    pub account_id: AccountId,
    /// Total cost
    total_cost: Money,
    /// Amount settled so far
    paid_amount: Money,
    /// Status
    pub status: OrderStatus,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new unpaid order
    ///
    /// # Errors
    ///
    /// Returns `BillingError::Validation` if the total cost is negative.
    pub fn new(
        order_type: OrderType,
        account_id: AccountId,
        total_cost: Money,
    ) -> Result<Self, BillingError> {
        total_cost.ensure_non_negative()?;
        let now = Utc::now();
        Ok(Self {
            id: OrderId::new_v7(),
            order_number: generate_order_number(),
            order_type,
            account_id,
            paid_amount: Money::zero(total_cost.currency()),
            total_cost,
            status: OrderStatus::Unpaid,
            created_at: now,
            updated_at: now,
        })
    }

    /// Sets the amount already paid
    ///
    /// # Errors
    ///
    /// Fails unless `0 <= paid <= total`.
    pub fn with_paid_amount(mut self, paid: Money) -> Result<Self, BillingError> {
        paid.ensure_non_negative()?;
        if paid.checked_cmp(&self.total_cost)?.is_gt() {
            return Err(BillingError::Validation(format!(
                "paid amount {} exceeds order total {}",
                paid, self.total_cost
            )));
        }
        self.paid_amount = paid;
        self.status = self.derive_status();
        Ok(self)
    }

    pub fn with_id(mut self, id: OrderId) -> Self {
        self.id = id;
        self
    }

    pub fn total_cost(&self) -> Money {
        self.total_cost
    }

    pub fn paid_amount(&self) -> Money {
        self.paid_amount
    }

    pub fn currency(&self) -> Currency {
        self.total_cost.currency()
    }

    /// Amount still to be covered, `total - paid`
    pub fn unpaid_amount(&self) -> Money {
        self.total_cost
            .saturating_sub(&self.paid_amount)
            .unwrap_or_else(|_| Money::zero(self.currency()))
    }

    pub fn is_settled(&self) -> bool {
        self.unpaid_amount().is_zero()
    }

    /// Records a settled payment against the order
    ///
    /// # Errors
    ///
    /// Rejects payments larger than the unpaid amount.
    pub fn record_payment(&mut self, amount: Money) -> Result<(), BillingError> {
        amount.ensure_non_negative()?;
        if amount.checked_cmp(&self.unpaid_amount())?.is_gt() {
            return Err(BillingError::Validation(format!(
                "payment {} exceeds unpaid amount {}",
                amount,
                self.unpaid_amount()
            )));
        }

        self.paid_amount = self.paid_amount.checked_add(&amount)?;
        self.status = self.derive_status();
        self.updated_at = Utc::now();
        Ok(())
    }

    fn derive_status(&self) -> OrderStatus {
        if self.is_settled() {
            OrderStatus::Paid
        } else if self.paid_amount.is_positive() {
            OrderStatus::PartiallyPaid
        } else {
            OrderStatus::Unpaid
        }
    }
}

fn generate_order_number() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("ORD-{}", duration.as_millis() % 10_000_000_000)
}
