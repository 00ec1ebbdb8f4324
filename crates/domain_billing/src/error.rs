//! Billing domain errors

use thiserror::Error;

use core_kernel::{MoneyError, PortError, VoucherId};
use domain_voucher::VoucherError;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// Voucher list, balance or order could not be loaded
    #[error("Failed to load {resource}: {source}")]
    DataFetch {
        resource: &'static str,
        #[source]
        source: PortError,
    },

    /// Input failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// A selected voucher is not in the available list
    #[error("Voucher not available for this order: {0}")]
    VoucherNotAvailable(VoucherId),

    /// Third-party amount is outstanding but no external method was chosen
    #[error("A payment method is required to pay the remaining {amount}")]
    PaymentMethodRequired { amount: String },

    /// Balance debit larger than the available balance
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: String, available: String },

    /// The payment service answered but declined the payment
    #[error("Payment rejected: {message}")]
    PaymentRejected { message: String },

    /// The payment service could not be reached or failed
    #[error("Payment submission failed: {0}")]
    SubmissionFailed(#[source] PortError),

    /// Payment session operation not allowed in the current state
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Voucher error: {0}")]
    Voucher(#[from] VoucherError),

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

impl BillingError {
    pub(crate) fn fetch(resource: &'static str, source: PortError) -> Self {
        BillingError::DataFetch { resource, source }
    }

    /// True for errors the operator fixes by changing input rather than retrying
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BillingError::Validation(_)
                | BillingError::VoucherNotAvailable(_)
                | BillingError::PaymentMethodRequired { .. }
        )
    }
}
