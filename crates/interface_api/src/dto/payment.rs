//! Payment DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{OrderId, PaymentId, VoucherId};
use domain_billing::{PaymentMethod, PaymentReceipt, PaymentSession, SessionState};

use crate::error::ApiError;

/// Query of `GET /orders/:id/payment-plan`
#[derive(Debug, Default, Deserialize)]
pub struct PlanQuery {
    /// Comma-separated voucher ids; absent means auto-select
    pub voucher_ids: Option<String>,
}

impl PlanQuery {
    pub fn selection(&self) -> Result<Option<Vec<VoucherId>>, ApiError> {
        self.voucher_ids
            .as_deref()
            .map(|ids| {
                VoucherId::parse_list(ids)
                    .map_err(|e| ApiError::BadRequest(format!("voucher_ids: {}", e)))
            })
            .transpose()
    }
}

/// Body of `POST /orders/:id/payments`
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct SubmitPaymentRequest {
    /// Vouchers to spend; absent means auto-select
    #[validate(length(max = 50, message = "at most 50 vouchers per payment"))]
    pub voucher_ids: Option<Vec<VoucherId>>,
    /// Gateway for the third-party remainder
    pub payment_method: Option<PaymentMethod>,
    /// Console operator submitting the payment
    #[validate(length(min = 1, max = 64))]
    pub operator: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeductionView {
    pub voucher_id: VoucherId,
    pub code: String,
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct PaymentPlanResponse {
    pub order_id: OrderId,
    pub order_number: String,
    pub currency: String,
    pub state: SessionState,
    pub unpaid_amount: Decimal,
    pub selected_voucher_ids: Vec<VoucherId>,
    pub deductions: Vec<DeductionView>,
    pub voucher_deduction: Decimal,
    pub balance_deduction: Decimal,
    pub third_party_amount: Decimal,
    pub can_full_deduct: bool,
    /// Selected but not needed to cover the order
    pub redundant_voucher_ids: Vec<VoucherId>,
}

impl PaymentPlanResponse {
    pub fn from_session(session: &PaymentSession) -> Result<Self, ApiError> {
        let plan = session
            .plan()
            .ok_or_else(|| ApiError::Conflict("payment session has no plan".to_string()))?;
        let order = session.order();

        Ok(Self {
            order_id: order.id,
            order_number: order.order_number.clone(),
            currency: plan.currency().code().to_string(),
            state: session.state(),
            unpaid_amount: plan.unpaid_amount.amount(),
            selected_voucher_ids: session.selection().iter().copied().collect(),
            deductions: plan
                .deductions
                .iter()
                .map(|d| DeductionView {
                    voucher_id: d.voucher_id,
                    code: d.code.clone(),
                    amount: d.amount.amount(),
                })
                .collect(),
            voucher_deduction: plan.voucher_deduction.amount(),
            balance_deduction: plan.balance_deduction.amount(),
            third_party_amount: plan.third_party_amount.amount(),
            can_full_deduct: plan.can_full_deduct,
            redundant_voucher_ids: plan.redundant_vouchers.clone(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub payment_id: PaymentId,
    pub order_id: OrderId,
    pub success: bool,
    pub message: Option<String>,
    pub processed_at: DateTime<Utc>,
    pub plan: PaymentPlanResponse,
}

impl PaymentResponse {
    pub fn new(receipt: PaymentReceipt, plan: PaymentPlanResponse) -> Self {
        Self {
            payment_id: receipt.payment_id,
            order_id: receipt.order_id,
            success: receipt.success,
            message: receipt.message,
            processed_at: receipt.processed_at,
            plan,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_query_parses_list() {
        let a = VoucherId::new();
        let b = VoucherId::new();
        let query = PlanQuery {
            voucher_ids: Some(format!("{}, {}", a.as_uuid(), b.as_uuid())),
        };
        assert_eq!(query.selection().unwrap(), Some(vec![a, b]));
        assert_eq!(PlanQuery::default().selection().unwrap(), None);
    }

    #[test]
    fn test_plan_query_rejects_garbage() {
        let query = PlanQuery {
            voucher_ids: Some("not-a-uuid".to_string()),
        };
        assert!(matches!(query.selection(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_submit_request_validation() {
        let too_many = SubmitPaymentRequest {
            voucher_ids: Some((0..51).map(|_| VoucherId::new()).collect()),
            ..Default::default()
        };
        assert!(too_many.validate().is_err());

        let blank_operator = SubmitPaymentRequest {
            operator: Some(String::new()),
            ..Default::default()
        };
        assert!(blank_operator.validate().is_err());

        assert!(SubmitPaymentRequest::default().validate().is_ok());
    }
}
