//! Request handlers

pub mod accounts;
pub mod health;
pub mod payments;
pub mod vouchers;
