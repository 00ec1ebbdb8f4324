//! Account DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use core_kernel::AccountId;
use domain_billing::AccountBalance;

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub account_id: AccountId,
    pub available: Decimal,
    pub currency: String,
    pub as_of: DateTime<Utc>,
}

impl From<AccountBalance> for BalanceResponse {
    fn from(balance: AccountBalance) -> Self {
        Self {
            account_id: balance.account_id,
            available: balance.available().amount(),
            currency: balance.currency().code().to_string(),
            as_of: balance.as_of,
        }
    }
}
