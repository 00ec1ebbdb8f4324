//! Request/response DTOs

pub mod account;
pub mod payment;
pub mod voucher;
