//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use domain_billing::BillingError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payment rejected: {0}")]
    PaymentRejected(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream service error: {0}")]
    BadGateway(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg.clone()),
            ApiError::PaymentRejected(msg) => (StatusCode::PAYMENT_REQUIRED, "payment_rejected", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "upstream_error", msg.clone()),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        let message = err.to_string();
        if err.is_validation() {
            return ApiError::Validation(message);
        }
        match err {
            BillingError::DataFetch { source, .. } if source.is_not_found() => ApiError::NotFound(message),
            BillingError::DataFetch { .. } | BillingError::SubmissionFailed(_) => ApiError::BadGateway(message),
            BillingError::PaymentRejected { message } => ApiError::PaymentRejected(message),
            BillingError::InsufficientBalance { .. } => ApiError::PaymentRejected(message),
            _ => ApiError::Conflict(message),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{PortError, VoucherId};

    fn status_of(err: BillingError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_billing_error_status_mapping() {
        assert_eq!(
            status_of(BillingError::DataFetch {
                resource: "order",
                source: PortError::not_found("Order", "ORD-1"),
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(BillingError::DataFetch {
                resource: "vouchers",
                source: PortError::unavailable("voucher service"),
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(BillingError::VoucherNotAvailable(VoucherId::new())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(BillingError::PaymentMethodRequired { amount: "¥1.00".into() }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(BillingError::Validation("operator must not be empty".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(BillingError::PaymentRejected { message: "declined".into() }),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            status_of(BillingError::InvalidStateTransition { from: "Idle".into(), to: "Ready".into() }),
            StatusCode::CONFLICT
        );
    }
}
