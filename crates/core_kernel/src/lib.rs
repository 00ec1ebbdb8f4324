//! Core Kernel - Foundational types for the compute billing system
//!
//! This crate provides the building blocks shared by the voucher and billing
//! domains:
//! - Money with exact minor-unit conversion
//! - Validity windows
//! - Typed identifiers
//! - Port traits and the common adapter error type

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod error;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use temporal::{ValidPeriod, TemporalError};
pub use identifiers::{VoucherId, OrderId, AccountId, PaymentId};
pub use error::CoreError;
pub use ports::{
    PortError, DomainPort, AdapterHealth, HealthCheckResult, HealthCheckable,
    OperationMetadata,
};
