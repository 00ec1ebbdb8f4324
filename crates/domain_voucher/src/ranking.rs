//! Expiry-priority ranking
//!
//! Vouchers are spent in this order:
//!
//! ```text
//! Urgent (ends within 7 days) -> Soon (within 30 days) -> Normal
//! ```
//!
//! and, inside a tier, smallest remaining balance first so that small
//! vouchers are drained before larger ones are touched. The sort is stable:
//! equal keys keep their input order.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{Currency, Money};
use crate::error::VoucherError;
use crate::voucher::Voucher;

/// Expiry bucket used as the primary sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryTier {
    Urgent,
    Soon,
    Normal,
}

/// Window lengths that define the expiry tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingPolicy {
    urgent_window: Duration,
    soon_window: Duration,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self {
            urgent_window: Duration::days(7),
            soon_window: Duration::days(30),
        }
    }
}

impl RankingPolicy {
    /// Creates a policy from window lengths in days
    ///
    /// # Errors
    ///
    /// Returns `VoucherError::InvalidPolicy` unless `0 < urgent_days <= soon_days`.
    pub fn from_days(urgent_days: i64, soon_days: i64) -> Result<Self, VoucherError> {
        if urgent_days <= 0 || soon_days < urgent_days {
            return Err(VoucherError::InvalidPolicy(format!(
                "expected 0 < urgent ({}) <= soon ({})",
                urgent_days, soon_days
            )));
        }
        Ok(Self {
            urgent_window: Duration::days(urgent_days),
            soon_window: Duration::days(soon_days),
        })
    }

    pub fn urgent_window(&self) -> Duration {
        self.urgent_window
    }

    pub fn soon_window(&self) -> Duration {
        self.soon_window
    }

    /// Classifies a voucher by how soon its validity window closes
    pub fn tier(&self, voucher: &Voucher, now: DateTime<Utc>) -> ExpiryTier {
        if voucher.validity.is_unbounded() {
            ExpiryTier::Normal
        } else if voucher.validity.ends_within(now, self.urgent_window) {
            ExpiryTier::Urgent
        } else if voucher.validity.ends_within(now, self.soon_window) {
            ExpiryTier::Soon
        } else {
            ExpiryTier::Normal
        }
    }
}

/// A voucher annotated with its ranking tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedVoucher {
    pub voucher: Voucher,
    pub tier: ExpiryTier,
    /// Whole days until the window closes, `None` for open-ended vouchers
    pub days_to_expiry: Option<i64>,
}

impl RankedVoucher {
    /// Expiring vouchers are pinned to the top of the selection list
    pub fn is_expiring_soon(&self) -> bool {
        self.tier != ExpiryTier::Normal
    }
}

impl AsRef<Voucher> for RankedVoucher {
    fn as_ref(&self) -> &Voucher {
        &self.voucher
    }
}

impl AsRef<Voucher> for Voucher {
    fn as_ref(&self) -> &Voucher {
        self
    }
}

/// Produces the spending order for a set of vouchers
pub fn rank_vouchers(
    vouchers: Vec<Voucher>,
    policy: &RankingPolicy,
    now: DateTime<Utc>,
) -> Vec<RankedVoucher> {
    let mut ranked: Vec<RankedVoucher> = vouchers
        .into_iter()
        .map(|voucher| RankedVoucher {
            tier: policy.tier(&voucher, now),
            days_to_expiry: voucher.validity.time_remaining(now).map(|d| d.num_days()),
            voucher,
        })
        .collect();

    // Vec::sort_by_key is stable, so list order breaks ties.
    ranked.sort_by_key(|r| (r.tier, r.voucher.remaining_amount().amount()));
    debug!(
        count = ranked.len(),
        expiring = ranked.iter().filter(|r| r.is_expiring_soon()).count(),
        "ranked vouchers"
    );
    ranked
}

/// Headline figures for the voucher picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherSummary {
    pub count: usize,
    pub total_remaining: Money,
    pub expiring_soon: usize,
}

/// Summarises a ranked list
///
/// # Errors
///
/// Fails if a voucher is not denominated in `currency`.
pub fn summarize(ranked: &[RankedVoucher], currency: Currency) -> Result<VoucherSummary, VoucherError> {
    let remaining: Vec<Money> = ranked.iter().map(|r| r.voucher.remaining_amount()).collect();
    Ok(VoucherSummary {
        count: ranked.len(),
        total_remaining: Money::sum(currency, &remaining)?,
        expiring_soon: ranked.iter().filter(|r| r.is_expiring_soon()).count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_kernel::ValidPeriod;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use crate::voucher::{OrderType, VoucherCategory};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    fn voucher(code: &str, remaining: Decimal, days_left: Option<i64>) -> Voucher {
        let start = now() - Duration::days(30);
        let validity = match days_left {
            Some(days) => ValidPeriod::bounded(start, now() + Duration::days(days)).unwrap(),
            None => ValidPeriod::from(start),
        };
        Voucher::new(
            code,
            "Compute Power Subsidy",
            VoucherCategory::Provincial,
            Money::new(remaining, Currency::CNY),
            validity,
            vec![OrderType::ComputeInstance],
        )
        .unwrap()
    }

    fn codes(ranked: &[RankedVoucher]) -> Vec<&str> {
        ranked.iter().map(|r| r.voucher.code.as_str()).collect()
    }

    #[test]
    fn test_tiers_follow_default_windows() {
        let policy = RankingPolicy::default();
        assert_eq!(policy.tier(&voucher("a", dec!(1), Some(3)), now()), ExpiryTier::Urgent);
        assert_eq!(policy.tier(&voucher("b", dec!(1), Some(7)), now()), ExpiryTier::Urgent);
        assert_eq!(policy.tier(&voucher("c", dec!(1), Some(8)), now()), ExpiryTier::Soon);
        assert_eq!(policy.tier(&voucher("d", dec!(1), Some(30)), now()), ExpiryTier::Soon);
        assert_eq!(policy.tier(&voucher("e", dec!(1), Some(31)), now()), ExpiryTier::Normal);
        assert_eq!(policy.tier(&voucher("f", dec!(1), None), now()), ExpiryTier::Normal);
    }

    #[test]
    fn test_tier_beats_remaining_amount() {
        let ranked = rank_vouchers(
            vec![
                voucher("late-small", dec!(10), Some(45)),
                voucher("early-large", dec!(5000), Some(5)),
            ],
            &RankingPolicy::default(),
            now(),
        );
        assert_eq!(codes(&ranked), vec!["early-large", "late-small"]);
    }

    #[test]
    fn test_smallest_remaining_first_within_tier() {
        let ranked = rank_vouchers(
            vec![
                voucher("big", dec!(900), Some(60)),
                voucher("small", dec!(100), Some(90)),
                voucher("mid", dec!(500), None),
            ],
            &RankingPolicy::default(),
            now(),
        );
        assert_eq!(codes(&ranked), vec!["small", "mid", "big"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ranked = rank_vouchers(
            vec![
                voucher("first", dec!(100), Some(60)),
                voucher("second", dec!(100), Some(90)),
            ],
            &RankingPolicy::default(),
            now(),
        );
        assert_eq!(codes(&ranked), vec!["first", "second"]);
    }

    #[test]
    fn test_policy_rejects_inverted_windows() {
        assert!(RankingPolicy::from_days(30, 7).is_err());
        assert!(RankingPolicy::from_days(0, 7).is_err());
        assert!(RankingPolicy::from_days(3, 14).is_ok());
    }

    #[test]
    fn test_summary_counts_expiring() {
        let ranked = rank_vouchers(
            vec![
                voucher("a", dec!(100), Some(3)),
                voucher("b", dec!(200), Some(20)),
                voucher("c", dec!(300), None),
            ],
            &RankingPolicy::default(),
            now(),
        );
        let summary = summarize(&ranked, Currency::CNY).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.expiring_soon, 2);
        assert_eq!(summary.total_remaining.amount(), dec!(600));
    }
}
