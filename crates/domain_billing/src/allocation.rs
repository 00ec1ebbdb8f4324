//! Mixed-payment allocation
//!
//! Covers an order's unpaid amount in three fixed layers:
//!
//! ```text
//! unpaid ──► selected vouchers (ranked order, each capped at its remaining)
//!        ──► account balance   (capped at available)
//!        ──► third party       (whatever is left)
//! ```
//!
//! Everything here is a pure function of its inputs. Arithmetic runs on
//! integer minor units so that `voucher + balance + third_party == unpaid`
//! holds exactly.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{Currency, Money, MoneyError, VoucherId};
use domain_voucher::Voucher;
use crate::account::AccountBalance;
use crate::error::BillingError;

/// The set of vouchers the operator (or auto-selection) chose to spend
///
/// Order inside the set is irrelevant: vouchers are always consumed in the
/// ranked order of the list they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoucherSelection {
    ids: BTreeSet<VoucherId>,
}

impl VoucherSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &VoucherId) -> bool {
        self.ids.contains(id)
    }

    pub fn insert(&mut self, id: VoucherId) -> bool {
        self.ids.insert(id)
    }

    pub fn remove(&mut self, id: &VoucherId) -> bool {
        self.ids.remove(id)
    }

    /// Flips membership of `id`; returns true if it is now selected
    pub fn toggle(&mut self, id: VoucherId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VoucherId> {
        self.ids.iter()
    }
}

impl FromIterator<VoucherId> for VoucherSelection {
    fn from_iter<I: IntoIterator<Item = VoucherId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Amount taken from one voucher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherDeduction {
    pub voucher_id: VoucherId,
    pub code: String,
    pub amount: Money,
}

/// How an order's unpaid amount is covered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPlan {
    /// Amount the plan covers
    pub unpaid_amount: Money,
    /// Per-voucher consumption, in ranked order, zero entries omitted
    pub deductions: Vec<VoucherDeduction>,
    /// Sum of `deductions`
    pub voucher_deduction: Money,
    /// Taken from the account balance
    pub balance_deduction: Money,
    /// Left for an external payment method
    pub third_party_amount: Money,
    /// True iff `third_party_amount` is zero
    pub can_full_deduct: bool,
    /// Selected vouchers that contribute nothing because the order was
    /// already covered by higher-ranked ones
    pub redundant_vouchers: Vec<VoucherId>,
}

impl PaymentPlan {
    pub fn currency(&self) -> Currency {
        self.unpaid_amount.currency()
    }

    pub fn requires_external_payment(&self) -> bool {
        !self.can_full_deduct
    }
}

/// Greedy voucher pick over a ranked list
///
/// Walks `ranked` in order, skipping drained vouchers, and stops as soon as
/// the selected remaining balances cover `unpaid`. Not globally optimal:
/// expiring and small vouchers win by position alone.
///
/// # Errors
///
/// Fails on a currency mismatch between a voucher and `unpaid`.
pub fn auto_select<V: AsRef<Voucher>>(
    ranked: &[V],
    unpaid: Money,
) -> Result<VoucherSelection, BillingError> {
    let currency = unpaid.currency();
    let mut residual = unpaid.to_minor()?.max(0);
    let mut selection = VoucherSelection::new();

    for voucher in ranked.iter().map(AsRef::as_ref) {
        if residual == 0 {
            break;
        }
        ensure_currency(voucher.currency(), currency)?;
        let remaining = voucher.remaining_amount().to_minor()?;
        if remaining <= 0 {
            continue;
        }
        selection.insert(voucher.id);
        residual -= remaining.min(residual);
    }

    debug!(selected = selection.len(), uncovered_minor = residual, "auto-selected vouchers");
    Ok(selection)
}

/// Computes the deduction plan for a selection
///
/// `ranked` is the voucher list in spending order; only the vouchers whose
/// ids are in `selection` are consumed.
///
/// # Errors
///
/// * `Validation` if `unpaid` is negative
/// * `VoucherNotAvailable` if the selection names a voucher not in `ranked`
/// * `Money` on a currency mismatch between order, vouchers and balance
pub fn compute_plan<V: AsRef<Voucher>>(
    ranked: &[V],
    selection: &VoucherSelection,
    balance: &AccountBalance,
    unpaid: Money,
) -> Result<PaymentPlan, BillingError> {
    if unpaid.is_negative() {
        return Err(BillingError::Validation(format!(
            "unpaid amount must not be negative, got {}",
            unpaid
        )));
    }
    let currency = unpaid.currency();
    ensure_currency(balance.currency(), currency)?;

    if let Some(missing) = selection
        .iter()
        .find(|id| !ranked.iter().any(|v| v.as_ref().id == **id))
    {
        return Err(BillingError::VoucherNotAvailable(*missing));
    }

    let unpaid_minor = unpaid.to_minor()?;
    let mut residual = unpaid_minor;
    let mut voucher_minor: i64 = 0;
    let mut deductions = Vec::new();
    let mut redundant_vouchers = Vec::new();

    for voucher in ranked.iter().map(AsRef::as_ref) {
        if !selection.contains(&voucher.id) {
            continue;
        }
        ensure_currency(voucher.currency(), currency)?;

        let take = voucher.remaining_amount().to_minor()?.max(0).min(residual);
        if take == 0 {
            redundant_vouchers.push(voucher.id);
            continue;
        }
        residual -= take;
        voucher_minor = voucher_minor.checked_add(take).ok_or(MoneyError::Overflow)?;
        deductions.push(VoucherDeduction {
            voucher_id: voucher.id,
            code: voucher.code.clone(),
            amount: Money::from_minor(take, currency),
        });
    }

    let after_vouchers = (unpaid_minor - voucher_minor).max(0);
    let balance_minor = balance.available().to_minor()?.max(0).min(after_vouchers);
    let third_party_minor = (unpaid_minor - voucher_minor - balance_minor).max(0);

    let plan = PaymentPlan {
        unpaid_amount: unpaid,
        deductions,
        voucher_deduction: Money::from_minor(voucher_minor, currency),
        balance_deduction: Money::from_minor(balance_minor, currency),
        third_party_amount: Money::from_minor(third_party_minor, currency),
        can_full_deduct: third_party_minor == 0,
        redundant_vouchers,
    };

    debug!(
        unpaid = %plan.unpaid_amount,
        vouchers = %plan.voucher_deduction,
        balance = %plan.balance_deduction,
        third_party = %plan.third_party_amount,
        "computed payment plan"
    );
    Ok(plan)
}

/// Auto-selects vouchers and computes the resulting plan in one step
pub fn compute_auto_plan<V: AsRef<Voucher>>(
    ranked: &[V],
    balance: &AccountBalance,
    unpaid: Money,
) -> Result<(VoucherSelection, PaymentPlan), BillingError> {
    let selection = auto_select(ranked, unpaid)?;
    let plan = compute_plan(ranked, &selection, balance, unpaid)?;
    Ok((selection, plan))
}

fn ensure_currency(actual: Currency, expected: Currency) -> Result<(), MoneyError> {
    if actual != expected {
        return Err(MoneyError::CurrencyMismatch(
            expected.to_string(),
            actual.to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use core_kernel::{AccountId, ValidPeriod};
    use domain_voucher::{rank_vouchers, OrderType, RankingPolicy, VoucherCategory};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, 10, 0, 0).unwrap()
    }

    fn cny(amount: Decimal) -> Money {
        Money::new(amount, Currency::CNY)
    }

    fn voucher(code: &str, remaining: Decimal, days_left: i64) -> Voucher {
        Voucher::new(
            code,
            "Compute Power Subsidy",
            VoucherCategory::National,
            cny(remaining),
            ValidPeriod::bounded(now() - Duration::days(5), now() + Duration::days(days_left)).unwrap(),
            vec![OrderType::ComputeInstance],
        )
        .unwrap()
    }

    fn balance(available: Decimal) -> AccountBalance {
        AccountBalance::new(AccountId::new(), cny(available)).unwrap()
    }

    #[test]
    fn test_single_voucher_covers_order() {
        let vouchers = vec![voucher("V-2000", dec!(2000), 90)];
        let (selection, plan) = compute_auto_plan(&vouchers, &balance(dec!(0)), cny(dec!(1280.00))).unwrap();

        assert_eq!(selection.len(), 1);
        assert_eq!(plan.voucher_deduction.amount(), dec!(1280.00));
        assert!(plan.balance_deduction.is_zero());
        assert!(plan.third_party_amount.is_zero());
        assert!(plan.can_full_deduct);
    }

    #[test]
    fn test_vouchers_then_balance_then_third_party() {
        let vouchers = vec![
            voucher("V-1000", dec!(1000), 90),
            voucher("V-1500", dec!(1500), 90),
            voucher("V-500", dec!(500), 90),
        ];
        let (_, plan) = compute_auto_plan(&vouchers, &balance(dec!(2000)), cny(dec!(8520.00))).unwrap();

        assert_eq!(plan.voucher_deduction.amount(), dec!(3000));
        assert_eq!(plan.balance_deduction.amount(), dec!(2000));
        assert_eq!(plan.third_party_amount.amount(), dec!(3520));
        assert!(!plan.can_full_deduct);
        assert_eq!(plan.deductions.len(), 3);
    }

    #[test]
    fn test_no_vouchers_falls_through() {
        let vouchers: Vec<Voucher> = vec![];
        let (selection, plan) = compute_auto_plan(&vouchers, &balance(dec!(500)), cny(dec!(1280))).unwrap();

        assert!(selection.is_empty());
        assert!(plan.voucher_deduction.is_zero());
        assert_eq!(plan.balance_deduction.amount(), dec!(500));
        assert_eq!(plan.third_party_amount.amount(), dec!(780));
    }

    #[test]
    fn test_expiring_voucher_consumed_before_long_lived() {
        let ranked = rank_vouchers(
            vec![voucher("B-60d", dec!(500), 60), voucher("A-3d", dec!(100), 3)],
            &RankingPolicy::default(),
            now(),
        );
        assert_eq!(ranked[0].voucher.code, "A-3d");

        let (_, plan) = compute_auto_plan(&ranked, &balance(dec!(0)), cny(dec!(300))).unwrap();
        assert_eq!(plan.deductions[0].code, "A-3d");
        assert_eq!(plan.deductions[0].amount.amount(), dec!(100));
        assert_eq!(plan.deductions[1].code, "B-60d");
        assert_eq!(plan.deductions[1].amount.amount(), dec!(200));
    }

    #[test]
    fn test_auto_select_stops_once_covered() {
        let vouchers = vec![
            voucher("first", dec!(100), 90),
            voucher("second", dec!(100), 90),
            voucher("third", dec!(100), 90),
        ];
        let selection = auto_select(&vouchers, cny(dec!(150))).unwrap();
        assert_eq!(selection.len(), 2);
        assert!(!selection.contains(&vouchers[2].id));
    }

    #[test]
    fn test_auto_select_skips_drained_vouchers() {
        let drained = voucher("drained", dec!(100), 90)
            .with_used_amount(cny(dec!(100)))
            .unwrap();
        let vouchers = vec![drained, voucher("live", dec!(50), 90)];
        let selection = auto_select(&vouchers, cny(dec!(80))).unwrap();
        assert_eq!(selection.len(), 1);
        assert!(selection.contains(&vouchers[1].id));
    }

    #[test]
    fn test_manual_selection_reports_redundant_voucher() {
        let vouchers = vec![voucher("big", dec!(1000), 90), voucher("extra", dec!(200), 90)];
        let selection: VoucherSelection = vouchers.iter().map(|v| v.id).collect();
        let plan = compute_plan(&vouchers, &selection, &balance(dec!(0)), cny(dec!(600))).unwrap();

        assert_eq!(plan.deductions.len(), 1);
        assert_eq!(plan.redundant_vouchers, vec![vouchers[1].id]);
        assert!(plan.can_full_deduct);
    }

    #[test]
    fn test_unknown_selected_voucher_rejected() {
        let vouchers = vec![voucher("only", dec!(100), 90)];
        let mut selection = VoucherSelection::new();
        let stranger = VoucherId::new();
        selection.insert(stranger);

        let result = compute_plan(&vouchers, &selection, &balance(dec!(0)), cny(dec!(10)));
        assert!(matches!(result, Err(BillingError::VoucherNotAvailable(id)) if id == stranger));
    }

    #[test]
    fn test_negative_unpaid_rejected() {
        let vouchers: Vec<Voucher> = vec![];
        let result = compute_plan(&vouchers, &VoucherSelection::new(), &balance(dec!(0)), cny(dec!(-1)));
        assert!(matches!(result, Err(BillingError::Validation(_))));
    }

    #[test]
    fn test_balance_currency_mismatch_rejected() {
        let vouchers: Vec<Voucher> = vec![];
        let usd_balance = AccountBalance::new(AccountId::new(), Money::new(dec!(10), Currency::USD)).unwrap();
        let result = compute_plan(&vouchers, &VoucherSelection::new(), &usd_balance, cny(dec!(10)));
        assert!(matches!(result, Err(BillingError::Money(MoneyError::CurrencyMismatch(_, _)))));
    }

    #[test]
    fn test_cent_amounts_are_exact() {
        let vouchers = vec![voucher("a", dec!(0.10), 90), voucher("b", dec!(0.20), 90)];
        let (_, plan) = compute_auto_plan(&vouchers, &balance(dec!(0)), cny(dec!(0.30))).unwrap();
        assert_eq!(plan.voucher_deduction.amount(), dec!(0.30));
        assert!(plan.can_full_deduct);
    }

    #[test]
    fn test_selection_toggle() {
        let mut selection = VoucherSelection::new();
        let id = VoucherId::new();
        assert!(selection.toggle(id));
        assert!(selection.contains(&id));
        assert!(!selection.toggle(id));
        assert!(selection.is_empty());
    }
}
