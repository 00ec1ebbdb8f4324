//! Tests for domain_voucher

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money, ValidPeriod};
use domain_voucher::{
    rank_vouchers, ExpiryTier, OrderType, RankingPolicy, Voucher, VoucherCategory,
    VoucherError, VoucherStatus,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap()
}

fn voucher_expiring_in(code: &str, remaining: rust_decimal::Decimal, days: i64) -> Voucher {
    Voucher::new(
        code,
        "Municipal AI Compute Voucher",
        VoucherCategory::Municipal,
        Money::new(remaining, Currency::CNY),
        ValidPeriod::bounded(now() - Duration::days(1), now() + Duration::days(days)).unwrap(),
        vec![OrderType::ComputeInstance, OrderType::Inference],
    )
    .unwrap()
}

// ============================================================================
// Usability Tests
// ============================================================================

mod usability_tests {
    use super::*;

    #[test]
    fn test_frozen_voucher_is_not_usable() {
        let v = voucher_expiring_in("FRZ", dec!(100), 10).with_status(VoucherStatus::Frozen);
        assert!(!v.is_usable_for(OrderType::ComputeInstance, now()));
    }

    #[test]
    fn test_not_yet_valid_voucher_is_not_usable() {
        let v = Voucher::new(
            "FUTURE",
            "Special Program",
            VoucherCategory::Special,
            Money::new(dec!(100), Currency::CNY),
            ValidPeriod::from(now() + Duration::hours(1)),
            vec![OrderType::Storage],
        )
        .unwrap();
        let err = v.ensure_usable_for(OrderType::Storage, now()).unwrap_err();
        assert!(err.to_string().contains("outside validity window"));
    }

    #[test]
    fn test_partially_used_voucher_keeps_remaining() {
        let v = voucher_expiring_in("PART", dec!(1000), 10)
            .with_used_amount(Money::new(dec!(250.50), Currency::CNY))
            .unwrap();
        assert_eq!(v.remaining_amount().amount(), dec!(749.50));
        assert_eq!(v.status, VoucherStatus::Active);
    }

    #[test]
    fn test_fully_used_voucher_is_marked_used() {
        let v = voucher_expiring_in("FULL", dec!(100), 10)
            .with_used_amount(Money::new(dec!(100), Currency::CNY))
            .unwrap();
        assert_eq!(v.status, VoucherStatus::Used);
        assert!(!v.is_usable_for(OrderType::ComputeInstance, now()));
    }

    #[test]
    fn test_consume_in_wrong_currency_fails() {
        let mut v = voucher_expiring_in("CUR", dec!(100), 10);
        let result = v.consume(Money::new(dec!(10), Currency::USD));
        assert!(matches!(result, Err(VoucherError::Money(_))));
    }
}

// ============================================================================
// Ranking Tests
// ============================================================================

mod ranking_tests {
    use super::*;

    #[test]
    fn test_five_days_beats_forty_five_days_regardless_of_amount() {
        for (small, large) in [(dec!(1), dec!(100000)), (dec!(100000), dec!(1))] {
            let ranked = rank_vouchers(
                vec![
                    voucher_expiring_in("45d", small, 45),
                    voucher_expiring_in("5d", large, 5),
                ],
                &RankingPolicy::default(),
                now(),
            );
            assert_eq!(ranked[0].voucher.code, "5d");
            assert_eq!(ranked[0].tier, ExpiryTier::Urgent);
            assert_eq!(ranked[1].tier, ExpiryTier::Normal);
        }
    }

    #[test]
    fn test_expiring_vouchers_are_pinned() {
        let ranked = rank_vouchers(
            vec![
                voucher_expiring_in("normal", dec!(10), 90),
                voucher_expiring_in("soon", dec!(500), 20),
            ],
            &RankingPolicy::default(),
            now(),
        );
        assert!(ranked[0].is_expiring_soon());
        assert_eq!(ranked[0].days_to_expiry, Some(20));
        assert!(!ranked[1].is_expiring_soon());
    }

    #[test]
    fn test_custom_policy_windows() {
        let policy = RankingPolicy::from_days(3, 10).unwrap();
        let v = voucher_expiring_in("five", dec!(10), 5);
        assert_eq!(policy.tier(&v, now()), ExpiryTier::Soon);
        assert_eq!(RankingPolicy::default().tier(&v, now()), ExpiryTier::Urgent);
    }
}

// ============================================================================
// Serialization Tests
// ============================================================================

mod serialization_tests {
    use super::*;

    #[test]
    fn test_enums_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&OrderType::ComputeInstance).unwrap(),
            "\"compute_instance\""
        );
        assert_eq!(
            serde_json::to_string(&VoucherCategory::Provincial).unwrap(),
            "\"provincial\""
        );
        assert_eq!(serde_json::to_string(&ExpiryTier::Urgent).unwrap(), "\"urgent\"");
    }

    #[test]
    fn test_voucher_json_carries_amounts() {
        let v = voucher_expiring_in("JSON", dec!(300), 10);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["code"], "JSON");
        assert_eq!(json["status"], "active");
        assert!(json.get("total_amount").is_some());
        assert!(json.get("used_amount").is_some());
    }
}
