//! Test Utilities Crate
//!
//! Shared fixtures, builders and property-test strategies for the billing
//! test suite.
//!
//! # Modules
//!
//! - `fixtures`: Fixed clock, ids and money values
//! - `builders`: Voucher, order and seeded-store builders
//! - `assertions`: Plan conservation and money assertions
//! - `generators`: Proptest strategies for vouchers and balances

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
