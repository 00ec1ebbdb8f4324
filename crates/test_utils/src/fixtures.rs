//! Pre-built Test Fixtures
//!
//! Ready-to-use values for the billing test suite. Dates are pinned to the
//! start of the current UTC day: stable within a run, and never later than
//! the wall clock the payment service reads.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use core_kernel::{AccountId, Currency, Money, OrderId, VoucherId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// CNY amount, the console's billing currency
    pub fn cny(amount: Decimal) -> Money {
        Money::new(amount, Currency::CNY)
    }

    pub fn cny_zero() -> Money {
        Money::zero(Currency::CNY)
    }

    /// Typical single-instance order
    pub fn instance_order_total() -> Money {
        Self::cny(dec!(1280.00))
    }

    /// Large training order that no voucher set fully covers
    pub fn training_order_total() -> Money {
        Self::cny(dec!(8520.00))
    }

    /// USD amount for currency mismatch tests
    pub fn usd_100() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// The "now" every fixture is relative to: today, 00:00 UTC
    pub fn now() -> DateTime<Utc> {
        Utc.from_utc_datetime(&Utc::now().date_naive().and_time(NaiveTime::MIN))
    }

    pub fn days_from_now(days: i64) -> DateTime<Utc> {
        Self::now() + Duration::days(days)
    }

    /// When fixture vouchers were issued
    pub fn issued_at() -> DateTime<Utc> {
        Self::now() - Duration::days(30)
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    pub fn account_id() -> AccountId {
        AccountId::from_uuid(Uuid::parse_str("0192b8a0-7c1e-7a3f-9d2b-4e5f60718293").unwrap())
    }

    pub fn order_id() -> OrderId {
        OrderId::from_uuid(Uuid::parse_str("0192b8a0-7c1e-7a3f-9d2b-4e5f60718294").unwrap())
    }

    pub fn voucher_id() -> VoucherId {
        VoucherId::from_uuid(Uuid::parse_str("0192b8a0-7c1e-7a3f-9d2b-4e5f60718295").unwrap())
    }
}

/// Fixture for display strings
pub struct StringFixtures;

impl StringFixtures {
    pub fn national_program() -> &'static str {
        "National Compute Power Voucher"
    }

    pub fn municipal_program() -> &'static str {
        "Municipal AI Innovation Voucher"
    }
}
