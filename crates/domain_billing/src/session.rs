//! Payment session state machine
//!
//! One session per attempt to pay one order:
//!
//! ```text
//! Idle ──► Loading ──► Ready ──► Submitting ──► Succeeded
//!                        ▲            │
//!                        │            ▼
//!                        └──────── Failed ──► Submitting (re-submit)
//! ```
//!
//! Every selection or balance change recomputes the plan in full and puts
//! the session back into `Ready`. Nothing is retried automatically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::VoucherId;
use domain_voucher::{rank_vouchers, summarize, RankedVoucher, RankingPolicy, Voucher, VoucherSummary};

use crate::account::AccountBalance;
use crate::allocation::{self, PaymentPlan, VoucherSelection};
use crate::error::BillingError;
use crate::order::Order;
use crate::payment::{PaymentMethod, PaymentReceipt, PaymentRequest};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Created, nothing fetched yet
    Idle,
    /// Voucher list and balance are being fetched
    Loading,
    /// Plan computed, waiting for the operator
    Ready,
    /// Request handed to the payment service
    Submitting,
    /// Payment accepted
    Succeeded,
    /// Submission failed or was declined; plan kept for another try
    Failed,
}

/// State of one payment attempt for an order
#[derive(Debug, Clone)]
pub struct PaymentSession {
    order: Order,
    policy: RankingPolicy,
    state: SessionState,
    vouchers: Vec<RankedVoucher>,
    balance: Option<AccountBalance>,
    selection: VoucherSelection,
    plan: Option<PaymentPlan>,
    last_error: Option<String>,
    receipt: Option<PaymentReceipt>,
}

impl PaymentSession {
    pub fn new(order: Order, policy: RankingPolicy) -> Self {
        Self {
            order,
            policy,
            state: SessionState::Idle,
            vouchers: Vec::new(),
            balance: None,
            selection: VoucherSelection::new(),
            plan: None,
            last_error: None,
            receipt: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    /// Usable vouchers in spending order
    pub fn vouchers(&self) -> &[RankedVoucher] {
        &self.vouchers
    }

    pub fn balance(&self) -> Option<&AccountBalance> {
        self.balance.as_ref()
    }

    pub fn selection(&self) -> &VoucherSelection {
        &self.selection
    }

    pub fn plan(&self) -> Option<&PaymentPlan> {
        self.plan.as_ref()
    }

    /// Message of the last failed submission
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn receipt(&self) -> Option<&PaymentReceipt> {
        self.receipt.as_ref()
    }

    /// Marks the fetches as started
    pub fn begin_loading(&mut self) -> Result<(), BillingError> {
        self.transition(SessionState::Loading)
    }

    /// Installs the fetched data, auto-selects vouchers and computes the plan
    pub fn load(
        &mut self,
        vouchers: Vec<Voucher>,
        balance: AccountBalance,
        now: DateTime<Utc>,
    ) -> Result<(), BillingError> {
        self.ensure_can(SessionState::Ready)?;
        let ranked = rank_vouchers(vouchers, &self.policy, now);
        let (selection, plan) =
            allocation::compute_auto_plan(&ranked, &balance, self.order.unpaid_amount())?;

        self.vouchers = ranked;
        self.balance = Some(balance);
        self.selection = selection;
        self.plan = Some(plan);
        self.state = SessionState::Ready;
        Ok(())
    }

    /// Flips one voucher in or out of the selection; returns whether it is
    /// now selected
    pub fn toggle_voucher(&mut self, id: VoucherId) -> Result<bool, BillingError> {
        self.ensure_editable()?;
        self.ensure_listed(&id)?;
        let mut selection = self.selection.clone();
        let selected = selection.toggle(id);
        self.apply_selection(selection)?;
        Ok(selected)
    }

    /// Replaces the selection
    pub fn select_vouchers<I>(&mut self, ids: I) -> Result<(), BillingError>
    where
        I: IntoIterator<Item = VoucherId>,
    {
        self.ensure_editable()?;
        let selection: VoucherSelection = ids.into_iter().collect();
        for id in selection.iter() {
            self.ensure_listed(id)?;
        }
        self.apply_selection(selection)
    }

    /// Replaces the selection with the greedy auto-selection
    pub fn auto_select(&mut self) -> Result<(), BillingError> {
        self.ensure_editable()?;
        let selection = allocation::auto_select(&self.vouchers, self.order.unpaid_amount())?;
        self.apply_selection(selection)
    }

    pub fn clear_selection(&mut self) -> Result<(), BillingError> {
        self.ensure_editable()?;
        self.apply_selection(VoucherSelection::new())
    }

    /// Swaps in a fresh balance reading and recomputes
    pub fn update_balance(&mut self, balance: AccountBalance) -> Result<(), BillingError> {
        self.ensure_editable()?;
        let plan = allocation::compute_plan(
            &self.vouchers,
            &self.selection,
            &balance,
            self.order.unpaid_amount(),
        )?;
        self.balance = Some(balance);
        self.plan = Some(plan);
        self.state = SessionState::Ready;
        Ok(())
    }

    /// Count, total remaining and expiring-soon count of the listed vouchers
    pub fn summary(&self) -> Result<VoucherSummary, BillingError> {
        Ok(summarize(&self.vouchers, self.order.currency())?)
    }

    /// Builds the request for the current plan and enters `Submitting`
    ///
    /// A missing payment method leaves the state untouched.
    pub fn begin_submit(
        &mut self,
        method: Option<PaymentMethod>,
    ) -> Result<PaymentRequest, BillingError> {
        self.ensure_can(SessionState::Submitting)?;
        let plan = self.current_plan()?;
        let request = PaymentRequest::from_plan(self.order.id, plan, method)?;
        self.state = SessionState::Submitting;
        self.last_error = None;
        Ok(request)
    }

    /// Records an accepted payment
    pub fn complete(&mut self, receipt: PaymentReceipt) -> Result<(), BillingError> {
        self.transition(SessionState::Succeeded)?;
        self.receipt = Some(receipt);
        Ok(())
    }

    /// Records a failed or declined submission, keeping the plan
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), BillingError> {
        self.transition(SessionState::Failed)?;
        self.last_error = Some(message.into());
        Ok(())
    }

    /// Clears the failure and returns to `Ready`
    pub fn dismiss_error(&mut self) -> Result<(), BillingError> {
        if self.state != SessionState::Failed {
            return Err(self.invalid(SessionState::Ready));
        }
        self.last_error = None;
        self.state = SessionState::Ready;
        Ok(())
    }

    fn apply_selection(&mut self, selection: VoucherSelection) -> Result<(), BillingError> {
        let balance = self
            .balance
            .as_ref()
            .ok_or_else(|| self.invalid(SessionState::Ready))?;
        let plan = allocation::compute_plan(
            &self.vouchers,
            &selection,
            balance,
            self.order.unpaid_amount(),
        )?;
        debug!(selected = selection.len(), third_party = %plan.third_party_amount, "selection changed");
        self.selection = selection;
        self.plan = Some(plan);
        self.state = SessionState::Ready;
        Ok(())
    }

    fn current_plan(&self) -> Result<&PaymentPlan, BillingError> {
        self.plan
            .as_ref()
            .ok_or_else(|| self.invalid(SessionState::Submitting))
    }

    fn ensure_listed(&self, id: &VoucherId) -> Result<(), BillingError> {
        if self.vouchers.iter().any(|v| v.voucher.id == *id) {
            Ok(())
        } else {
            Err(BillingError::VoucherNotAvailable(*id))
        }
    }

    fn ensure_editable(&self) -> Result<(), BillingError> {
        self.ensure_can(SessionState::Ready)
    }

    fn ensure_can(&self, target: SessionState) -> Result<(), BillingError> {
        if self.can_transition_to(target) {
            Ok(())
        } else {
            Err(self.invalid(target))
        }
    }

    fn transition(&mut self, target: SessionState) -> Result<(), BillingError> {
        self.ensure_can(target)?;
        self.state = target;
        Ok(())
    }

    fn invalid(&self, target: SessionState) -> BillingError {
        BillingError::InvalidStateTransition {
            from: format!("{:?}", self.state),
            to: format!("{:?}", target),
        }
    }

    fn can_transition_to(&self, target: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self.state, target),
            (Idle, Loading) |
            (Loading, Ready) |
            (Ready, Ready) |
            (Ready, Submitting) |
            (Submitting, Succeeded) |
            (Submitting, Failed) |
            (Failed, Ready) |
            (Failed, Submitting)
        )
    }
}
