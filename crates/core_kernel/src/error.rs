//! Kernel-level errors
//!
//! Domain crates keep their own error enums; `CoreError` covers failures
//! that happen before any domain logic runs, such as a bad setting read at
//! startup.

use thiserror::Error;
use crate::money::MoneyError;
use crate::temporal::TemporalError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    /// A setting parsed but holds a value the system cannot run with
    #[error("Invalid setting `{key}`: {reason}")]
    InvalidSetting { key: &'static str, reason: String },
}

impl CoreError {
    pub fn invalid_setting(key: &'static str, reason: impl Into<String>) -> Self {
        CoreError::InvalidSetting {
            key,
            reason: reason.into(),
        }
    }

    /// Name of the offending setting, if any
    pub fn setting(&self) -> Option<&'static str> {
        match self {
            CoreError::InvalidSetting { key, .. } => Some(*key),
            _ => None,
        }
    }
}
