//! Demo data for the in-memory backend
//!
//! Seeds one account with a prepaid balance, two unpaid orders and a voucher
//! set spread across the expiry tiers. Ids are fixed so the console can be
//! pointed at a freshly started server without looking anything up.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use core_kernel::{AccountId, Currency, Money, OrderId, ValidPeriod, VoucherId};
use domain_billing::ports::mock::InMemoryBillingStore;
use domain_billing::{AccountBalance, BillingError, Order};
use domain_voucher::{OrderType, Voucher, VoucherCategory, VoucherError};

pub const DEMO_ACCOUNT_ID: Uuid = Uuid::from_u128(0x0192_0000_0000_7000_8000_0000_0000_0001);
pub const DEMO_INSTANCE_ORDER_ID: Uuid = Uuid::from_u128(0x0192_0000_0000_7000_8000_0000_0000_0101);
pub const DEMO_TRAINING_ORDER_ID: Uuid = Uuid::from_u128(0x0192_0000_0000_7000_8000_0000_0000_0102);

/// Ids of the seeded records
#[derive(Debug, Clone)]
pub struct DemoSeed {
    pub account_id: AccountId,
    pub order_ids: Vec<OrderId>,
    pub voucher_ids: Vec<VoucherId>,
}

struct DemoVoucher {
    code: &'static str,
    program: &'static str,
    category: VoucherCategory,
    face_value: Decimal,
    used: Decimal,
    expires_in_days: Option<i64>,
    scopes: &'static [OrderType],
}

const DEMO_VOUCHERS: &[DemoVoucher] = &[
    DemoVoucher {
        code: "NAT-2026-0001",
        program: "Compute Power Subsidy 2026",
        category: VoucherCategory::National,
        face_value: dec!(1000),
        used: dec!(200),
        expires_in_days: Some(5),
        scopes: &[OrderType::ComputeInstance, OrderType::Training, OrderType::Inference],
    },
    DemoVoucher {
        code: "PRV-2026-0417",
        program: "Provincial AI Innovation Fund",
        category: VoucherCategory::Provincial,
        face_value: dec!(300),
        used: dec!(0),
        expires_in_days: Some(21),
        scopes: &[OrderType::ComputeInstance],
    },
    DemoVoucher {
        code: "MUN-2026-1120",
        program: "City Digital Economy Voucher",
        category: VoucherCategory::Municipal,
        face_value: dec!(2000),
        used: dec!(500),
        expires_in_days: Some(90),
        scopes: &[OrderType::Training, OrderType::Inference],
    },
    DemoVoucher {
        code: "SPC-ONBOARD-50",
        program: "New Customer Onboarding",
        category: VoucherCategory::Special,
        face_value: dec!(50),
        used: dec!(0),
        expires_in_days: None,
        scopes: &[
            OrderType::ComputeInstance,
            OrderType::Storage,
            OrderType::Network,
            OrderType::Inference,
            OrderType::Training,
        ],
    },
];

/// Fills `store` with the demo account, orders and vouchers
pub async fn seed_demo_store(
    store: &InMemoryBillingStore,
    currency: Currency,
) -> Result<DemoSeed, BillingError> {
    let now = Utc::now();
    let account_id = AccountId::from_uuid(DEMO_ACCOUNT_ID);

    let balance = AccountBalance::new(account_id, Money::new(dec!(500), currency))?;
    store.set_balance(balance).await;

    let orders = [
        (DEMO_INSTANCE_ORDER_ID, OrderType::ComputeInstance, dec!(1280)),
        (DEMO_TRAINING_ORDER_ID, OrderType::Training, dec!(8520)),
    ];
    let mut order_ids = Vec::with_capacity(orders.len());
    for (id, order_type, total) in orders {
        let order = Order::new(order_type, account_id, Money::new(total, currency))?
            .with_id(OrderId::from_uuid(id));
        order_ids.push(order.id);
        store.insert_order(order).await;
    }

    let mut voucher_ids = Vec::with_capacity(DEMO_VOUCHERS.len());
    for (n, seed) in DEMO_VOUCHERS.iter().enumerate() {
        let validity = ValidPeriod::new(
            now - Duration::days(30),
            seed.expires_in_days.map(|days| now + Duration::days(days)),
        )
        .map_err(VoucherError::from)?;
        let voucher = Voucher::new(
            seed.code,
            seed.program,
            seed.category,
            Money::new(seed.face_value, currency),
            validity,
            seed.scopes.to_vec(),
        )?
        .with_used_amount(Money::new(seed.used, currency))?
        .with_id(VoucherId::from_uuid(Uuid::from_u128(0x0192_0000_0000_7000_8000_0000_0000_1000 + n as u128)));
        voucher_ids.push(voucher.id);
        store.insert_voucher(voucher).await;
    }

    Ok(DemoSeed {
        account_id,
        order_ids,
        voucher_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_demo_store() {
        let store = InMemoryBillingStore::new();
        let seed = seed_demo_store(&store, Currency::CNY).await.unwrap();

        assert_eq!(seed.order_ids.len(), 2);
        assert_eq!(seed.voucher_ids.len(), DEMO_VOUCHERS.len());

        let order = store.order(seed.order_ids[0]).await.unwrap();
        assert_eq!(order.order_type, OrderType::ComputeInstance);
        assert_eq!(order.unpaid_amount().amount(), dec!(1280));

        let national = store.voucher(seed.voucher_ids[0]).await.unwrap();
        assert_eq!(national.remaining_amount().amount(), dec!(800));
    }
}
