//! Voucher Domain
//!
//! Program-issued credits that offset order cost, and the rules that decide
//! which vouchers to spend first.
//!
//! # Usability
//!
//! A voucher is usable when it is `Active`, has a positive remaining balance,
//! the current time is inside its validity window, and the order type is in
//! its applicable scopes.
//!
//! # Ranking
//!
//! ```text
//! ends within 7 days  ->  ends within 30 days  ->  everything else
//!        (each tier: smallest remaining balance first)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_voucher::{rank_vouchers, RankingPolicy};
//!
//! let ranked = rank_vouchers(vouchers, &RankingPolicy::default(), Utc::now());
//! let pinned: Vec<_> = ranked.iter().filter(|r| r.is_expiring_soon()).collect();
//! ```

pub mod voucher;
pub mod ranking;
pub mod ports;
pub mod error;

pub use voucher::{Voucher, VoucherCategory, VoucherStatus, OrderType};
pub use ranking::{
    rank_vouchers, summarize, ExpiryTier, RankedVoucher, RankingPolicy, VoucherSummary,
};
pub use ports::VoucherPort;
pub use error::VoucherError;
