//! Voucher DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use core_kernel::{OrderId, VoucherId};
use domain_voucher::{
    ExpiryTier, OrderType, RankedVoucher, RankingPolicy, VoucherCategory, VoucherSummary,
};

/// A usable voucher in spending order
#[derive(Debug, Serialize)]
pub struct VoucherView {
    pub id: VoucherId,
    pub code: String,
    pub program: String,
    pub category: VoucherCategory,
    pub total_amount: Decimal,
    pub used_amount: Decimal,
    pub remaining_amount: Decimal,
    pub currency: String,
    pub valid_until: Option<DateTime<Utc>>,
    pub days_to_expiry: Option<i64>,
    pub tier: ExpiryTier,
    /// Pinned to the top of the picker
    pub expiring_soon: bool,
    pub applicable_scopes: Vec<OrderType>,
}

impl From<&RankedVoucher> for VoucherView {
    fn from(ranked: &RankedVoucher) -> Self {
        let voucher = &ranked.voucher;
        Self {
            id: voucher.id,
            code: voucher.code.clone(),
            program: voucher.program.clone(),
            category: voucher.category,
            total_amount: voucher.total_amount().amount(),
            used_amount: voucher.used_amount().amount(),
            remaining_amount: voucher.remaining_amount().amount(),
            currency: voucher.currency().code().to_string(),
            valid_until: voucher.validity.end,
            days_to_expiry: ranked.days_to_expiry,
            tier: ranked.tier,
            expiring_soon: ranked.is_expiring_soon(),
            applicable_scopes: voucher.applicable_scopes.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryView {
    pub count: usize,
    pub total_remaining: Decimal,
    pub expiring_soon: usize,
}

impl From<VoucherSummary> for SummaryView {
    fn from(summary: VoucherSummary) -> Self {
        Self {
            count: summary.count,
            total_remaining: summary.total_remaining.amount(),
            expiring_soon: summary.expiring_soon,
        }
    }
}

/// Tier windows the list was ranked with
#[derive(Debug, Serialize)]
pub struct ExpiryWindowsView {
    pub urgent_days: i64,
    pub soon_days: i64,
}

impl From<&RankingPolicy> for ExpiryWindowsView {
    fn from(policy: &RankingPolicy) -> Self {
        Self {
            urgent_days: policy.urgent_window().num_days(),
            soon_days: policy.soon_window().num_days(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VoucherListResponse {
    pub order_id: OrderId,
    pub order_type: OrderType,
    pub vouchers: Vec<VoucherView>,
    pub summary: SummaryView,
    pub expiry_windows: ExpiryWindowsView,
}
