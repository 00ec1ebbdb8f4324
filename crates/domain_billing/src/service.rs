//! Payment service
//!
//! Orchestrates one payment attempt over the billing ports: loads the order,
//! fetches vouchers and balance in parallel, and hands the final request to
//! the payment service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use core_kernel::{AccountId, HealthCheckResult, OperationMetadata, OrderId};
use domain_voucher::{RankingPolicy, VoucherPort};

use crate::account::AccountBalance;
use crate::error::BillingError;
use crate::order::Order;
use crate::payment::{PaymentMethod, PaymentReceipt};
use crate::ports::{AccountPort, OrderPort, PaymentPort};
use crate::session::PaymentSession;

/// Entry point for the mixed-payment flow
///
/// Holds no per-order state; each call to `open_session` produces an
/// independent `PaymentSession` owned by the caller.
#[derive(Clone)]
pub struct PaymentService {
    vouchers: Arc<dyn VoucherPort>,
    accounts: Arc<dyn AccountPort>,
    payments: Arc<dyn PaymentPort>,
    orders: Arc<dyn OrderPort>,
    policy: RankingPolicy,
}

impl PaymentService {
    pub fn new(
        vouchers: Arc<dyn VoucherPort>,
        accounts: Arc<dyn AccountPort>,
        payments: Arc<dyn PaymentPort>,
        orders: Arc<dyn OrderPort>,
    ) -> Self {
        Self {
            vouchers,
            accounts,
            payments,
            orders,
            policy: RankingPolicy::default(),
        }
    }

    /// Overrides the expiry windows used for ranking
    pub fn with_policy(mut self, policy: RankingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RankingPolicy {
        &self.policy
    }

    pub async fn get_order(
        &self,
        order_id: OrderId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Order, BillingError> {
        self.orders
            .get_order(order_id, metadata)
            .await
            .map_err(|e| BillingError::fetch("order", e))
    }

    pub async fn get_balance(
        &self,
        account_id: AccountId,
        metadata: Option<OperationMetadata>,
    ) -> Result<AccountBalance, BillingError> {
        self.accounts
            .get_account_balance(account_id, metadata)
            .await
            .map_err(|e| BillingError::fetch("account balance", e))
    }

    /// Loads an order and opens a payment session for it
    #[instrument(skip(self, metadata), fields(order_id = %order_id))]
    pub async fn open_session(
        &self,
        order_id: OrderId,
        metadata: Option<OperationMetadata>,
    ) -> Result<PaymentSession, BillingError> {
        let order = self.get_order(order_id, metadata.clone()).await?;
        self.open_session_at(order, Utc::now(), metadata).await
    }

    /// Opens a payment session for `order` as seen at `now`
    ///
    /// The voucher list and the balance are fetched concurrently and both
    /// must succeed; if either fails, the other is cancelled and no session
    /// is returned. Dropping the returned future cancels both fetches.
    pub async fn open_session_at(
        &self,
        order: Order,
        now: DateTime<Utc>,
        metadata: Option<OperationMetadata>,
    ) -> Result<PaymentSession, BillingError> {
        let mut session = PaymentSession::new(order, self.policy);
        session.begin_loading()?;

        let order = session.order();
        let (vouchers, balance) = tokio::try_join!(
            async {
                self.vouchers
                    .list_available_vouchers(order.order_type, now, metadata.clone())
                    .await
                    .map_err(|e| BillingError::fetch("vouchers", e))
            },
            async {
                self.accounts
                    .get_account_balance(order.account_id, metadata.clone())
                    .await
                    .map_err(|e| BillingError::fetch("account balance", e))
            },
        )
        .map_err(|e| {
            warn!(error = %e, "payment session could not be loaded");
            e
        })?;

        session.load(vouchers, balance, now)?;
        if let Some(plan) = session.plan() {
            info!(
                order_number = %session.order().order_number,
                vouchers = session.vouchers().len(),
                voucher_deduction = %plan.voucher_deduction,
                balance_deduction = %plan.balance_deduction,
                third_party = %plan.third_party_amount,
                "payment session ready"
            );
        }
        Ok(session)
    }

    /// Refreshes the balance of a session's account and recomputes its plan
    pub async fn refresh_balance(
        &self,
        session: &mut PaymentSession,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), BillingError> {
        let balance = self.get_balance(session.order().account_id, metadata).await?;
        session.update_balance(balance)
    }

    /// Submits the session's current plan
    ///
    /// On a decline or a transport failure the session moves to `Failed`
    /// with its plan intact, so the caller may submit again.
    #[instrument(skip(self, session, metadata), fields(order_id = %session.order().id))]
    pub async fn submit(
        &self,
        session: &mut PaymentSession,
        method: Option<PaymentMethod>,
        metadata: Option<OperationMetadata>,
    ) -> Result<PaymentReceipt, BillingError> {
        let request = session.begin_submit(method)?;

        match self.payments.submit_payment(request, metadata).await {
            Ok(receipt) => match receipt.into_result() {
                Ok(receipt) => {
                    info!(payment_id = %receipt.payment_id, "payment accepted");
                    session.complete(receipt.clone())?;
                    Ok(receipt)
                }
                Err(err) => {
                    warn!(error = %err, "payment declined");
                    session.fail(err.to_string())?;
                    Err(err)
                }
            },
            Err(e) => {
                warn!(error = %e, transient = e.is_transient(), "payment submission failed");
                session.fail(e.to_string())?;
                Err(BillingError::SubmissionFailed(e))
            }
        }
    }

    /// Health of every backing port
    pub async fn health_check(&self) -> Vec<HealthCheckResult> {
        let (vouchers, accounts, payments, orders) = tokio::join!(
            self.vouchers.health_check(),
            self.accounts.health_check(),
            self.payments.health_check(),
            self.orders.health_check(),
        );
        vec![vouchers, accounts, payments, orders]
    }
}
