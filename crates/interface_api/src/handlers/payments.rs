//! Payment handlers
//!
//! Sessions are not kept between requests: each call loads the order,
//! vouchers and balance afresh, applies the requested selection and
//! either returns the plan or submits it.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use core_kernel::OrderId;

use crate::dto::payment::{PaymentPlanResponse, PaymentResponse, PlanQuery, SubmitPaymentRequest};
use crate::middleware::operation_metadata;
use crate::{error::ApiError, AppState};

/// Computes the deduction plan for an order
///
/// Without `voucher_ids` the plan uses the auto-selection.
pub async fn get_payment_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PlanQuery>,
    headers: HeaderMap,
) -> Result<Json<PaymentPlanResponse>, ApiError> {
    let selection = query.selection()?;
    let mut session = state
        .service
        .open_session(OrderId::from_uuid(id), operation_metadata(&headers))
        .await?;
    if let Some(ids) = selection {
        session.select_vouchers(ids)?;
    }
    Ok(Json(PaymentPlanResponse::from_session(&session)?))
}

/// Pays an order with vouchers, balance and an optional external method
pub async fn submit_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<SubmitPaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), ApiError> {
    request.validate()?;

    let mut metadata = operation_metadata(&headers).unwrap_or_default();
    if let Some(operator) = request.operator.clone() {
        metadata = metadata.initiated_by(operator);
    }

    let mut session = state
        .service
        .open_session(OrderId::from_uuid(id), Some(metadata.clone()))
        .await?;
    if let Some(ids) = request.voucher_ids {
        session.select_vouchers(ids)?;
    }

    let receipt = state
        .service
        .submit(&mut session, request.payment_method, Some(metadata))
        .await?;
    info!(
        order_number = %session.order().order_number,
        payment_id = %receipt.payment_id,
        "order paid"
    );

    let plan = PaymentPlanResponse::from_session(&session)?;
    Ok((StatusCode::CREATED, Json(PaymentResponse::new(receipt, plan))))
}
