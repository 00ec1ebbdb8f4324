//! Account handlers

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use uuid::Uuid;

use core_kernel::AccountId;

use crate::dto::account::BalanceResponse;
use crate::middleware::operation_metadata;
use crate::{error::ApiError, AppState};

/// Gets the spendable balance of an account
pub async fn get_balance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state
        .service
        .get_balance(AccountId::from_uuid(id), operation_metadata(&headers))
        .await?;
    Ok(Json(balance.into()))
}
