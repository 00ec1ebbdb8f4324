//! Billing Domain Ports
//!
//! The payment flow talks to three outside services besides the voucher
//! source: the account service (balance), the payment service (submission)
//! and the order service. Each is an async port so adapters can be swapped:
//!
//! - **HTTP adapters** for the console's backend services
//! - **In-memory store** (`mock::InMemoryBillingStore`) for tests and the
//!   demo server
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_billing::ports::mock::InMemoryBillingStore;
//! use domain_billing::PaymentService;
//!
//! let store = Arc::new(InMemoryBillingStore::new());
//! let service = PaymentService::new(store.clone(), store.clone(), store.clone(), store);
//! ```

use async_trait::async_trait;

use core_kernel::{AccountId, DomainPort, HealthCheckable, OperationMetadata, OrderId, PortError};

use crate::account::AccountBalance;
use crate::order::Order;
use crate::payment::{PaymentReceipt, PaymentRequest};

/// Account service
#[async_trait]
pub trait AccountPort: DomainPort + HealthCheckable {
    /// Reads the spendable balance of an account
    ///
    /// # Returns
    ///
    /// The balance, or `PortError::NotFound` for an unknown account
    async fn get_account_balance(
        &self,
        account_id: AccountId,
        metadata: Option<OperationMetadata>,
    ) -> Result<AccountBalance, PortError>;
}

/// Payment service
#[async_trait]
pub trait PaymentPort: DomainPort + HealthCheckable {
    /// Submits a mixed payment
    ///
    /// A business-level decline is an `Ok` receipt with `success == false`;
    /// `Err` means the service could not process the request at all.
    async fn submit_payment(
        &self,
        request: PaymentRequest,
        metadata: Option<OperationMetadata>,
    ) -> Result<PaymentReceipt, PortError>;
}

/// Order service
#[async_trait]
pub trait OrderPort: DomainPort + HealthCheckable {
    async fn get_order(
        &self,
        id: OrderId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Order, PortError>;
}

/// In-memory implementation of every billing port
///
/// Holds orders, vouchers and balances in one lock so a submission applies
/// all of its effects or none of them.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{DateTime, Utc};
    use tokio::sync::RwLock;
    use tracing::{debug, instrument};

    use core_kernel::{AdapterHealth, HealthCheckResult, VoucherId};
    use domain_voucher::{OrderType, Voucher, VoucherPort};

    /// Failure the store should simulate until cleared
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum InjectedFailure {
        /// `list_available_vouchers` fails with `ServiceUnavailable`
        VoucherFetch,
        /// `get_account_balance` fails with `ServiceUnavailable`
        BalanceFetch,
        /// `submit_payment` fails with a connection error
        Submission,
        /// `submit_payment` answers with a declined receipt
        Decline(String),
    }

    #[derive(Debug, Default)]
    struct StoreState {
        orders: HashMap<OrderId, Order>,
        vouchers: HashMap<VoucherId, Voucher>,
        balances: HashMap<AccountId, AccountBalance>,
        payments: Vec<(PaymentRequest, PaymentReceipt)>,
        failures: Vec<InjectedFailure>,
    }

    /// In-memory billing backend
    #[derive(Debug, Default, Clone)]
    pub struct InMemoryBillingStore {
        state: Arc<RwLock<StoreState>>,
        latency: Duration,
    }

    impl InMemoryBillingStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Delays every port call by `latency`
        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = latency;
            self
        }

        pub async fn insert_order(&self, order: Order) {
            self.state.write().await.orders.insert(order.id, order);
        }

        pub async fn insert_voucher(&self, voucher: Voucher) {
            self.state.write().await.vouchers.insert(voucher.id, voucher);
        }

        pub async fn insert_vouchers(&self, vouchers: impl IntoIterator<Item = Voucher>) {
            let mut state = self.state.write().await;
            for voucher in vouchers {
                state.vouchers.insert(voucher.id, voucher);
            }
        }

        pub async fn set_balance(&self, balance: AccountBalance) {
            self.state
                .write()
                .await
                .balances
                .insert(balance.account_id, balance);
        }

        pub async fn inject_failure(&self, failure: InjectedFailure) {
            self.state.write().await.failures.push(failure);
        }

        pub async fn clear_failures(&self) {
            self.state.write().await.failures.clear();
        }

        /// Every submission seen so far, with the receipt that was returned
        pub async fn payments(&self) -> Vec<(PaymentRequest, PaymentReceipt)> {
            self.state.read().await.payments.clone()
        }

        pub async fn order(&self, id: OrderId) -> Option<Order> {
            self.state.read().await.orders.get(&id).cloned()
        }

        pub async fn voucher(&self, id: VoucherId) -> Option<Voucher> {
            self.state.read().await.vouchers.get(&id).cloned()
        }

        async fn simulate_latency(&self) {
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
        }

        async fn has_failure(&self, failure: &InjectedFailure) -> bool {
            self.state.read().await.failures.contains(failure)
        }

        async fn decline_message(&self) -> Option<String> {
            self.state.read().await.failures.iter().find_map(|f| match f {
                InjectedFailure::Decline(message) => Some(message.clone()),
                _ => None,
            })
        }
    }

    /// Applies a request to copies of the affected records and returns them,
    /// or the reason the payment service would decline it
    fn settle(
        state: &StoreState,
        request: &PaymentRequest,
        now: DateTime<Utc>,
    ) -> Result<(Order, Vec<Voucher>, AccountBalance), String> {
        let mut order = state
            .orders
            .get(&request.order_id)
            .cloned()
            .ok_or_else(|| format!("order {} not found", request.order_id))?;
        if order.is_settled() {
            return Err(format!("order {} already paid", order.order_number));
        }

        let mut vouchers = Vec::with_capacity(request.voucher_usages.len());
        for usage in &request.voucher_usages {
            let mut voucher = state
                .vouchers
                .get(&usage.voucher_id)
                .cloned()
                .ok_or_else(|| format!("voucher {} not found", usage.voucher_id))?;
            voucher
                .ensure_usable_for(order.order_type, now)
                .map_err(|e| e.to_string())?;
            voucher.consume(usage.amount).map_err(|e| e.to_string())?;
            vouchers.push(voucher);
        }

        let mut balance = state
            .balances
            .get(&order.account_id)
            .cloned()
            .unwrap_or_else(|| AccountBalance::empty(order.account_id, order.currency()));
        if request.balance_amount.is_positive() {
            balance.debit(request.balance_amount).map_err(|e| e.to_string())?;
        }

        let total = request.total().map_err(|e| e.to_string())?;
        order.record_payment(total).map_err(|e| e.to_string())?;
        Ok((order, vouchers, balance))
    }

    impl DomainPort for InMemoryBillingStore {}

    #[async_trait]
    impl HealthCheckable for InMemoryBillingStore {
        async fn health_check(&self) -> HealthCheckResult {
            let failing = !self.state.read().await.failures.is_empty();
            HealthCheckResult {
                adapter_id: "in-memory-billing-store".to_string(),
                status: if failing {
                    AdapterHealth::Degraded
                } else {
                    AdapterHealth::Healthy
                },
                latency_ms: u64::try_from(self.latency.as_millis()).unwrap_or(u64::MAX),
                message: failing.then(|| "failure injection active".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl VoucherPort for InMemoryBillingStore {
        #[instrument(skip(self, _metadata))]
        async fn list_available_vouchers(
            &self,
            order_type: OrderType,
            now: DateTime<Utc>,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<Voucher>, PortError> {
            self.simulate_latency().await;
            if self.has_failure(&InjectedFailure::VoucherFetch).await {
                return Err(PortError::unavailable("voucher service"));
            }
            let mut state = self.state.write().await;
            let mut expired = 0;
            for voucher in state.vouchers.values_mut() {
                if voucher.refresh_expiry(now) {
                    expired += 1;
                }
            }
            if expired > 0 {
                debug!(expired, "marked vouchers past their window as expired");
            }
            let mut vouchers: Vec<Voucher> = state
                .vouchers
                .values()
                .filter(|v| v.is_usable_for(order_type, now))
                .cloned()
                .collect();
            // HashMap order is arbitrary; keep listings reproducible.
            vouchers.sort_by(|a, b| a.code.cmp(&b.code));
            debug!(count = vouchers.len(), "listed available vouchers");
            Ok(vouchers)
        }
    }

    #[async_trait]
    impl AccountPort for InMemoryBillingStore {
        #[instrument(skip(self, _metadata))]
        async fn get_account_balance(
            &self,
            account_id: AccountId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<AccountBalance, PortError> {
            self.simulate_latency().await;
            if self.has_failure(&InjectedFailure::BalanceFetch).await {
                return Err(PortError::unavailable("account service"));
            }
            self.state
                .read()
                .await
                .balances
                .get(&account_id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Account", account_id))
        }
    }

    #[async_trait]
    impl OrderPort for InMemoryBillingStore {
        async fn get_order(
            &self,
            id: OrderId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Order, PortError> {
            self.simulate_latency().await;
            self.state
                .read()
                .await
                .orders
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Order", id))
        }
    }

    #[async_trait]
    impl PaymentPort for InMemoryBillingStore {
        #[instrument(skip(self, request, _metadata), fields(order_id = %request.order_id))]
        async fn submit_payment(
            &self,
            request: PaymentRequest,
            _metadata: Option<OperationMetadata>,
        ) -> Result<PaymentReceipt, PortError> {
            self.simulate_latency().await;
            if self.has_failure(&InjectedFailure::Submission).await {
                return Err(PortError::transport("payment service", "connection reset before response"));
            }
            if let Some(message) = self.decline_message().await {
                let receipt = PaymentReceipt::declined(request.order_id, message);
                self.state.write().await.payments.push((request, receipt.clone()));
                return Ok(receipt);
            }

            let mut state = self.state.write().await;
            let receipt = match settle(&state, &request, Utc::now()) {
                Ok((order, vouchers, balance)) => {
                    for voucher in vouchers {
                        state.vouchers.insert(voucher.id, voucher);
                    }
                    state.balances.insert(balance.account_id, balance);
                    state.orders.insert(order.id, order);
                    PaymentReceipt::accepted(request.order_id)
                }
                Err(reason) => PaymentReceipt::declined(request.order_id, reason),
            };
            debug!(success = receipt.success, "payment processed");
            state.payments.push((request, receipt.clone()));
            Ok(receipt)
        }
    }
}
