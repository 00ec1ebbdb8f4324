//! Voucher domain errors

use thiserror::Error;

use core_kernel::{MoneyError, TemporalError};

/// Errors that can occur in the voucher domain
#[derive(Debug, Error)]
pub enum VoucherError {
    /// Amount is zero, negative or otherwise unusable
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Used amount would exceed the face value
    #[error("Used amount {used} exceeds face value {total}")]
    UsedExceedsTotal { used: String, total: String },

    /// Consumption exceeds the remaining balance
    #[error("Voucher {code}: requested {requested} but only {remaining} remains")]
    InsufficientRemaining {
        code: String,
        requested: String,
        remaining: String,
    },

    /// Voucher cannot be spent on this order right now
    #[error("Voucher {code} is not usable: {reason}")]
    NotUsable { code: String, reason: String },

    /// Ranking windows are inconsistent
    #[error("Invalid ranking policy: {0}")]
    InvalidPolicy(String),

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),
}
