//! Voucher handlers

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use uuid::Uuid;

use core_kernel::OrderId;

use crate::dto::voucher::{VoucherListResponse, VoucherView};
use crate::middleware::operation_metadata;
use crate::{error::ApiError, AppState};

/// Lists the vouchers usable on an order, in spending order
pub async fn list_order_vouchers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<VoucherListResponse>, ApiError> {
    let session = state
        .service
        .open_session(OrderId::from_uuid(id), operation_metadata(&headers))
        .await?;

    Ok(Json(VoucherListResponse {
        order_id: session.order().id,
        order_type: session.order().order_type,
        vouchers: session.vouchers().iter().map(VoucherView::from).collect(),
        summary: session.summary()?.into(),
        expiry_windows: state.service.policy().into(),
    }))
}
