//! Payment requests and receipts
//!
//! A `PaymentRequest` is the wire form of a `PaymentPlan`: one usage per
//! consumed voucher, the balance debit, and the external remainder with its
//! gateway. The payment service answers with a `PaymentReceipt`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Money, OrderId, PaymentId, VoucherId};
use crate::allocation::PaymentPlan;
use crate::error::BillingError;

/// External gateway for the third-party remainder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Alipay,
    WechatPay,
    UnionPay,
    /// Corporate bank transfer, settled offline
    BankTransfer,
}

impl std::str::FromStr for PaymentMethod {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alipay" => Ok(PaymentMethod::Alipay),
            "wechat_pay" | "wechat" => Ok(PaymentMethod::WechatPay),
            "union_pay" | "unionpay" => Ok(PaymentMethod::UnionPay),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            other => Err(BillingError::Validation(format!(
                "unknown payment method: {}",
                other
            ))),
        }
    }
}

/// Amount drawn from one voucher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherUsage {
    pub voucher_id: VoucherId,
    pub amount: Money,
}

/// Remainder paid through an external gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalPayment {
    pub method: PaymentMethod,
    pub amount: Money,
}

/// Submission sent to the payment service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub order_id: OrderId,
    pub voucher_usages: Vec<VoucherUsage>,
    pub balance_amount: Money,
    pub external: Option<ExternalPayment>,
}

impl PaymentRequest {
    /// Builds a request from a computed plan
    ///
    /// `method` is ignored when the plan fully deducts.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::PaymentMethodRequired` if the plan leaves a
    /// third-party amount and no method is given.
    pub fn from_plan(
        order_id: OrderId,
        plan: &PaymentPlan,
        method: Option<PaymentMethod>,
    ) -> Result<Self, BillingError> {
        let external = if plan.requires_external_payment() {
            let method = method.ok_or_else(|| BillingError::PaymentMethodRequired {
                amount: plan.third_party_amount.to_string(),
            })?;
            Some(ExternalPayment {
                method,
                amount: plan.third_party_amount,
            })
        } else {
            None
        };

        Ok(Self {
            order_id,
            voucher_usages: plan
                .deductions
                .iter()
                .map(|d| VoucherUsage {
                    voucher_id: d.voucher_id,
                    amount: d.amount,
                })
                .collect(),
            balance_amount: plan.balance_deduction,
            external,
        })
    }

    /// Sum of every funding source in the request
    pub fn total(&self) -> Result<Money, BillingError> {
        let mut total = Money::sum(
            self.balance_amount.currency(),
            self.voucher_usages.iter().map(|u| &u.amount),
        )?;
        total = total.checked_add(&self.balance_amount)?;
        if let Some(external) = &self.external {
            total = total.checked_add(&external.amount)?;
        }
        Ok(total)
    }
}

/// Payment service answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub payment_id: PaymentId,
    pub order_id: OrderId,
    pub success: bool,
    pub message: Option<String>,
    pub processed_at: DateTime<Utc>,
}

impl PaymentReceipt {
    pub fn accepted(order_id: OrderId) -> Self {
        Self {
            payment_id: PaymentId::new_v7(),
            order_id,
            success: true,
            message: None,
            processed_at: Utc::now(),
        }
    }

    pub fn declined(order_id: OrderId, message: impl Into<String>) -> Self {
        Self {
            payment_id: PaymentId::new_v7(),
            order_id,
            success: false,
            message: Some(message.into()),
            processed_at: Utc::now(),
        }
    }

    /// Turns a declined receipt into `BillingError::PaymentRejected`
    pub fn into_result(self) -> Result<Self, BillingError> {
        if self.success {
            Ok(self)
        } else {
            Err(BillingError::PaymentRejected {
                message: self
                    .message
                    .unwrap_or_else(|| "payment declined".to_string()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::VoucherDeduction;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn cny(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::CNY)
    }

    fn plan(vouchers: rust_decimal::Decimal, balance: rust_decimal::Decimal, third: rust_decimal::Decimal) -> PaymentPlan {
        PaymentPlan {
            unpaid_amount: cny(vouchers + balance + third),
            deductions: vec![VoucherDeduction {
                voucher_id: VoucherId::new(),
                code: "V-1".to_string(),
                amount: cny(vouchers),
            }],
            voucher_deduction: cny(vouchers),
            balance_deduction: cny(balance),
            third_party_amount: cny(third),
            can_full_deduct: third == dec!(0),
            redundant_vouchers: vec![],
        }
    }

    #[test]
    fn test_full_deduction_needs_no_method() {
        let request = PaymentRequest::from_plan(OrderId::new(), &plan(dec!(100), dec!(20), dec!(0)), None).unwrap();
        assert!(request.external.is_none());
        assert_eq!(request.voucher_usages.len(), 1);
        assert_eq!(request.total().unwrap().amount(), dec!(120));
    }

    #[test]
    fn test_method_required_for_remainder() {
        let result = PaymentRequest::from_plan(OrderId::new(), &plan(dec!(100), dec!(0), dec!(3520)), None);
        assert!(matches!(result, Err(BillingError::PaymentMethodRequired { .. })));
    }

    #[test]
    fn test_remainder_goes_to_external_method() {
        let request = PaymentRequest::from_plan(
            OrderId::new(),
            &plan(dec!(3000), dec!(2000), dec!(3520)),
            Some(PaymentMethod::Alipay),
        )
        .unwrap();
        let external = request.external.as_ref().unwrap();
        assert_eq!(external.method, PaymentMethod::Alipay);
        assert_eq!(external.amount.amount(), dec!(3520));
        assert_eq!(request.total().unwrap().amount(), dec!(8520));
    }

    #[test]
    fn test_declined_receipt_becomes_error() {
        let receipt = PaymentReceipt::declined(OrderId::new(), "gateway timeout");
        let err = receipt.into_result().unwrap_err();
        assert!(err.to_string().contains("gateway timeout"));
    }

    #[test]
    fn test_request_serializes_for_the_wire() {
        let request = PaymentRequest::from_plan(
            OrderId::new(),
            &plan(dec!(50), dec!(0), dec!(25)),
            Some(PaymentMethod::WechatPay),
        )
        .unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["external"]["method"], "wechat_pay");
        assert_eq!(json["voucher_usages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("wechat_pay".parse::<PaymentMethod>().unwrap(), PaymentMethod::WechatPay);
        assert_eq!("ALIPAY".parse::<PaymentMethod>().unwrap(), PaymentMethod::Alipay);
        assert!("paypal".parse::<PaymentMethod>().is_err());
    }
}
