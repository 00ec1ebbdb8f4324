//! Property-Based Test Generators
//!
//! Proptest strategies for vouchers, balances and unpaid amounts. All
//! amounts are CNY and generated in minor units so that no generated value
//! needs rounding.

use chrono::Duration;
use core_kernel::{AccountId, Currency, Money, ValidPeriod};
use domain_billing::AccountBalance;
use domain_voucher::{OrderType, Voucher, VoucherCategory};
use proptest::prelude::*;

use crate::fixtures::TemporalFixtures;

/// Largest generated amount, 1,000,000.00 CNY
pub const MAX_MINOR: i64 = 100_000_000;

/// Strategy for non-negative amounts in minor units
pub fn minor_amount_strategy() -> impl Strategy<Value = i64> {
    prop_oneof![
        1 => Just(0i64),
        8 => 1i64..MAX_MINOR,
        1 => 1i64..1_000i64,
    ]
}

/// Strategy for non-negative CNY amounts
pub fn cny_strategy() -> impl Strategy<Value = Money> {
    minor_amount_strategy().prop_map(|minor| Money::from_minor(minor, Currency::CNY))
}

pub fn voucher_category_strategy() -> impl Strategy<Value = VoucherCategory> {
    prop_oneof![
        Just(VoucherCategory::National),
        Just(VoucherCategory::Provincial),
        Just(VoucherCategory::Municipal),
        Just(VoucherCategory::Special),
    ]
}

/// Strategy for vouchers usable at the fixture clock, including drained
/// ones (remaining zero)
///
/// Expiry ranges from tomorrow to a year out, so every tier appears.
pub fn voucher_strategy() -> impl Strategy<Value = Voucher> {
    (
        1i64..MAX_MINOR,
        0u8..=100u8,
        1i64..365i64,
        voucher_category_strategy(),
        "[A-Z]{3}-[0-9]{4}",
    )
        .prop_map(|(total_minor, used_pct, days_left, category, code)| {
            let used_minor = if used_pct == 100 {
                total_minor
            } else {
                total_minor / 100 * i64::from(used_pct)
            };
            let now = TemporalFixtures::now();
            let validity = ValidPeriod::bounded(now - Duration::days(1), now + Duration::days(days_left))
                .expect("ordered bounds");
            Voucher::new(
                code,
                "Generated Program",
                category,
                Money::from_minor(total_minor, Currency::CNY),
                validity,
                OrderType::all().to_vec(),
            )
            .and_then(|v| v.with_used_amount(Money::from_minor(used_minor, Currency::CNY)))
            .expect("generated voucher")
        })
}

/// Strategy for voucher lists of up to `max` entries
pub fn voucher_list_strategy(max: usize) -> impl Strategy<Value = Vec<Voucher>> {
    proptest::collection::vec(voucher_strategy(), 0..=max)
}

/// Strategy for CNY account balances
pub fn balance_strategy() -> impl Strategy<Value = AccountBalance> {
    minor_amount_strategy().prop_map(|minor| {
        AccountBalance::new(AccountId::new(), Money::from_minor(minor, Currency::CNY))
            .expect("non-negative balance")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_vouchers_never_overdrawn(voucher in voucher_strategy()) {
            prop_assert!(!voucher.remaining_amount().is_negative());
            prop_assert!(voucher.used_amount().amount() <= voucher.total_amount().amount());
        }

        #[test]
        fn generated_balances_are_cny(balance in balance_strategy()) {
            prop_assert_eq!(balance.currency(), Currency::CNY);
        }
    }
}
