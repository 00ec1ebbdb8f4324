//! Billing Domain - Voucher-Based Mixed Payment
//!
//! This crate settles GPU-cloud orders from three funding sources, always in
//! the same order:
//!
//! 1. **Vouchers**: government compute vouchers, consumed in ranked order
//!    (expiring first, then smallest remaining), each capped at its own
//!    remaining balance and at what the order still needs
//! 2. **Account balance**: covers what the vouchers leave open, capped at
//!    the available balance
//! 3. **Third party**: whatever is still uncovered, paid through an
//!    external gateway the operator must pick
//!
//! The allocator (`allocation::compute_plan`) is a pure function. The
//! `PaymentSession` state machine and `PaymentService` wrap it with data
//! loading and submission over async ports.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{PaymentService, PaymentMethod};
//!
//! let mut session = service.open_session(order_id, None).await?;
//! let plan = session.plan().expect("ready sessions carry a plan");
//! if plan.requires_external_payment() {
//!     service.submit(&mut session, Some(PaymentMethod::Alipay), None).await?;
//! } else {
//!     service.submit(&mut session, None, None).await?;
//! }
//! ```

pub mod account;
pub mod allocation;
pub mod error;
pub mod order;
pub mod payment;
pub mod ports;
pub mod service;
pub mod session;

pub use account::AccountBalance;
pub use allocation::{
    auto_select, compute_auto_plan, compute_plan, PaymentPlan, VoucherDeduction, VoucherSelection,
};
pub use error::BillingError;
pub use order::{Order, OrderStatus};
pub use payment::{ExternalPayment, PaymentMethod, PaymentReceipt, PaymentRequest, VoucherUsage};
pub use ports::{AccountPort, OrderPort, PaymentPort};
pub use service::PaymentService;
pub use session::{PaymentSession, SessionState};
