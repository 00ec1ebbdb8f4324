//! Test Data Builders
//!
//! Builder patterns for vouchers, orders and a seeded in-memory billing
//! store. Tests set only the fields they care about.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use core_kernel::{AccountId, Money, OrderId, ValidPeriod, VoucherId};
use domain_billing::ports::mock::InMemoryBillingStore;
use domain_billing::{AccountBalance, Order, PaymentService};
use domain_voucher::{OrderType, RankingPolicy, Voucher, VoucherCategory, VoucherStatus};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::fixtures::{IdFixtures, MoneyFixtures, StringFixtures, TemporalFixtures};

/// Builder for constructing test vouchers
pub struct VoucherBuilder {
    id: Option<VoucherId>,
    code: String,
    program: String,
    category: VoucherCategory,
    total: Money,
    used: Option<Money>,
    valid_from: DateTime<Utc>,
    valid_until: Option<DateTime<Utc>>,
    scopes: Vec<OrderType>,
    status: VoucherStatus,
}

impl Default for VoucherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VoucherBuilder {
    /// A 1000 CNY national voucher valid for 90 more days on every order type
    pub fn new() -> Self {
        Self {
            id: None,
            code: "VCH-TEST-0001".to_string(),
            program: StringFixtures::national_program().to_string(),
            category: VoucherCategory::National,
            total: MoneyFixtures::cny(dec!(1000)),
            used: None,
            valid_from: TemporalFixtures::issued_at(),
            valid_until: Some(TemporalFixtures::days_from_now(90)),
            scopes: OrderType::all().to_vec(),
            status: VoucherStatus::Active,
        }
    }

    pub fn with_id(mut self, id: VoucherId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_category(mut self, category: VoucherCategory) -> Self {
        self.category = category;
        if category == VoucherCategory::Municipal {
            self.program = StringFixtures::municipal_program().to_string();
        }
        self
    }

    /// Face value in CNY
    pub fn with_total(mut self, amount: Decimal) -> Self {
        self.total = MoneyFixtures::cny(amount);
        self
    }

    pub fn with_total_money(mut self, total: Money) -> Self {
        self.total = total;
        self
    }

    /// Face value and used amount chosen so that `remaining` is left
    pub fn with_remaining(mut self, remaining: Decimal) -> Self {
        let total = if remaining > Decimal::ZERO { remaining * dec!(2) } else { dec!(100) };
        self.total = MoneyFixtures::cny(total);
        self.used = Some(MoneyFixtures::cny(total - remaining));
        self
    }

    pub fn with_used(mut self, amount: Decimal) -> Self {
        self.used = Some(MoneyFixtures::cny(amount));
        self
    }

    /// Window closes `days` after the fixture clock
    pub fn expiring_in_days(mut self, days: i64) -> Self {
        self.valid_until = Some(TemporalFixtures::days_from_now(days));
        self
    }

    pub fn without_expiry(mut self) -> Self {
        self.valid_until = None;
        self
    }

    pub fn valid_from(mut self, start: DateTime<Utc>) -> Self {
        self.valid_from = start;
        self
    }

    pub fn with_scopes(mut self, scopes: Vec<OrderType>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn with_status(mut self, status: VoucherStatus) -> Self {
        self.status = status;
        self
    }

    pub fn build(self) -> Voucher {
        let validity = ValidPeriod::new(self.valid_from, self.valid_until)
            .expect("voucher validity window");
        let mut voucher = Voucher::new(
            self.code,
            self.program,
            self.category,
            self.total,
            validity,
            self.scopes,
        )
        .expect("valid voucher");
        if let Some(used) = self.used {
            voucher = voucher.with_used_amount(used).expect("used within face value");
        }
        if let Some(id) = self.id {
            voucher = voucher.with_id(id);
        }
        if self.status != VoucherStatus::Active {
            voucher = voucher.with_status(self.status);
        }
        voucher
    }
}

/// Builder for constructing test orders
pub struct OrderBuilder {
    id: Option<OrderId>,
    order_type: OrderType,
    account_id: AccountId,
    total: Money,
    paid: Option<Money>,
}

impl Default for OrderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBuilder {
    /// An unpaid 1280 CNY compute-instance order for the fixture account
    pub fn new() -> Self {
        Self {
            id: None,
            order_type: OrderType::ComputeInstance,
            account_id: IdFixtures::account_id(),
            total: MoneyFixtures::instance_order_total(),
            paid: None,
        }
    }

    pub fn with_id(mut self, id: OrderId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = order_type;
        self
    }

    pub fn with_account_id(mut self, account_id: AccountId) -> Self {
        self.account_id = account_id;
        self
    }

    /// Total cost in CNY
    pub fn with_total(mut self, amount: Decimal) -> Self {
        self.total = MoneyFixtures::cny(amount);
        self
    }

    pub fn with_paid(mut self, amount: Decimal) -> Self {
        self.paid = Some(MoneyFixtures::cny(amount));
        self
    }

    pub fn build(self) -> Order {
        let mut order = Order::new(self.order_type, self.account_id, self.total).expect("valid order");
        if let Some(paid) = self.paid {
            order = order.with_paid_amount(paid).expect("paid within total");
        }
        if let Some(id) = self.id {
            order = order.with_id(id);
        }
        order
    }
}

/// Builder for an in-memory store seeded with one order, its account
/// balance and a voucher set
pub struct BillingStoreBuilder {
    order: Order,
    vouchers: Vec<Voucher>,
    balance: Decimal,
    latency: StdDuration,
}

impl BillingStoreBuilder {
    pub fn new(order: Order) -> Self {
        Self {
            order,
            vouchers: Vec::new(),
            balance: Decimal::ZERO,
            latency: StdDuration::ZERO,
        }
    }

    pub fn with_voucher(mut self, voucher: Voucher) -> Self {
        self.vouchers.push(voucher);
        self
    }

    pub fn with_vouchers(mut self, vouchers: impl IntoIterator<Item = Voucher>) -> Self {
        self.vouchers.extend(vouchers);
        self
    }

    /// Available balance in CNY
    pub fn with_balance(mut self, amount: Decimal) -> Self {
        self.balance = amount;
        self
    }

    pub fn with_latency(mut self, latency: StdDuration) -> Self {
        self.latency = latency;
        self
    }

    pub async fn build(self) -> Arc<InMemoryBillingStore> {
        let store = InMemoryBillingStore::new().with_latency(self.latency);
        let balance = AccountBalance::new(self.order.account_id, MoneyFixtures::cny(self.balance))
            .expect("non-negative balance");
        store.set_balance(balance).await;
        store.insert_vouchers(self.vouchers).await;
        store.insert_order(self.order).await;
        Arc::new(store)
    }
}

/// Wires every port of a `PaymentService` to one store
pub fn payment_service(store: &Arc<InMemoryBillingStore>) -> PaymentService {
    PaymentService::new(store.clone(), store.clone(), store.clone(), store.clone())
        .with_policy(RankingPolicy::default())
}

