//! Custom Test Assertions
//!
//! Assertion helpers for money and payment plans with messages that show
//! the whole breakdown on failure.

use core_kernel::Money;
use domain_billing::{AccountBalance, PaymentPlan};
use domain_voucher::Voucher;
use rust_decimal::Decimal;

/// Asserts that a Money value has exactly `expected` as its amount
pub fn assert_money_eq(actual: &Money, expected: Decimal) {
    assert_eq!(
        actual.amount(),
        expected,
        "Expected {}{}, got {}",
        actual.currency().symbol(),
        expected,
        actual
    );
}

pub fn assert_money_zero(money: &Money) {
    assert!(money.is_zero(), "Expected zero money, got {}", money);
}

/// Asserts `voucher + balance + third_party == unpaid` and the
/// `can_full_deduct` flag, in minor units
pub fn assert_plan_conserves(plan: &PaymentPlan) {
    let minor = |m: &Money| m.to_minor().expect("amount fits in minor units");
    let covered = minor(&plan.voucher_deduction)
        + minor(&plan.balance_deduction)
        + minor(&plan.third_party_amount);
    assert_eq!(
        covered,
        minor(&plan.unpaid_amount),
        "Plan does not add up: vouchers {} + balance {} + third party {} != unpaid {}",
        plan.voucher_deduction,
        plan.balance_deduction,
        plan.third_party_amount,
        plan.unpaid_amount
    );

    let per_voucher: i64 = plan.deductions.iter().map(|d| minor(&d.amount)).sum();
    assert_eq!(
        per_voucher,
        minor(&plan.voucher_deduction),
        "Voucher deductions do not sum to voucher_deduction {}",
        plan.voucher_deduction
    );

    assert_eq!(
        plan.can_full_deduct,
        plan.third_party_amount.is_zero(),
        "can_full_deduct={} but third party amount is {}",
        plan.can_full_deduct,
        plan.third_party_amount
    );
}

/// Asserts that no source was charged more than it holds
pub fn assert_plan_within_limits<V: AsRef<Voucher>>(
    plan: &PaymentPlan,
    vouchers: &[V],
    balance: &AccountBalance,
) {
    for deduction in &plan.deductions {
        let voucher = vouchers
            .iter()
            .map(AsRef::as_ref)
            .find(|v| v.id == deduction.voucher_id)
            .unwrap_or_else(|| panic!("Deduction from unknown voucher {}", deduction.code));
        assert!(
            deduction.amount.amount() <= voucher.remaining_amount().amount(),
            "Voucher {} charged {} but only {} remains",
            voucher.code,
            deduction.amount,
            voucher.remaining_amount()
        );
        assert!(deduction.amount.is_positive(), "Zero deduction listed for {}", voucher.code);
    }
    assert!(
        plan.voucher_deduction.amount() <= plan.unpaid_amount.amount(),
        "Vouchers cover {} of an unpaid {}",
        plan.voucher_deduction,
        plan.unpaid_amount
    );
    assert!(
        plan.balance_deduction.amount() <= balance.available().amount(),
        "Balance charged {} of an available {}",
        plan.balance_deduction,
        balance.available()
    );
}

/// Asserts that an error matches a specific variant
#[macro_export]
macro_rules! assert_err_variant {
    ($result:expr, $pattern:pat) => {
        match $result {
            Ok(value) => panic!("Expected Err matching {}, got Ok({:?})", stringify!($pattern), value),
            Err(ref e) => {
                assert!(
                    matches!(e, $pattern),
                    "Error {:?} does not match pattern {}",
                    e,
                    stringify!($pattern)
                );
            }
        }
    };
}
