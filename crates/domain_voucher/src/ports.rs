//! Voucher Domain Ports
//!
//! `VoucherPort` is the voucher source the payment flow reads from. The
//! in-memory store in `domain_billing` implements it today; a remote voucher
//! service can replace it without touching the allocator.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{DomainPort, HealthCheckable, OperationMetadata, PortError};

use crate::voucher::{OrderType, Voucher};

/// Read access to vouchers held by the current account
#[async_trait]
pub trait VoucherPort: DomainPort + HealthCheckable {
    /// Lists vouchers that can be spent on an order of `order_type` at `now`
    ///
    /// Implementations must return only usable vouchers: active, with a
    /// positive remaining balance, inside their validity window and scoped
    /// to `order_type`.
    async fn list_available_vouchers(
        &self,
        order_type: OrderType,
        now: DateTime<Utc>,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Voucher>, PortError>;
}
