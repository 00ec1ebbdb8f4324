//! Validity windows
//!
//! Vouchers carry a half-open validity window `[start, end)`. The end may be
//! absent for credits that never lapse.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} must be before end {end}")]
    InvalidPeriod {
        start: String,
        end: String,
    },
}

/// A half-open validity window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidPeriod {
    /// Start of the window (inclusive)
    pub start: DateTime<Utc>,
    /// End of the window (exclusive), None means unbounded
    pub end: Option<DateTime<Utc>>,
}

impl ValidPeriod {
    /// Creates a new valid period
    pub fn new(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Result<Self, TemporalError> {
        if let Some(end) = end {
            if start >= end {
                return Err(TemporalError::InvalidPeriod {
                    start: start.to_string(),
                    end: end.to_string(),
                });
            }
        }
        Ok(Self { start, end })
    }

    /// Creates an unbounded period starting from the given time
    pub fn from(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    /// Creates a bounded period
    pub fn bounded(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TemporalError> {
        Self::new(start, Some(end))
    }

    /// Returns true if this period contains the given timestamp
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && self.end.map_or(true, |e| timestamp < e)
    }

    /// Returns true once the window has closed
    pub fn has_ended(&self, timestamp: DateTime<Utc>) -> bool {
        self.end.is_some_and(|e| timestamp >= e)
    }

    /// Time left before the window closes, `None` when unbounded.
    /// Returns a zero duration for windows that already ended.
    pub fn time_remaining(&self, timestamp: DateTime<Utc>) -> Option<Duration> {
        self.end.map(|e| {
            let left = e - timestamp;
            if left < Duration::zero() {
                Duration::zero()
            } else {
                left
            }
        })
    }

    /// Returns true if the window closes within `window` of `timestamp`
    pub fn ends_within(&self, timestamp: DateTime<Utc>, window: Duration) -> bool {
        self.time_remaining(timestamp).is_some_and(|left| left <= window)
    }

    /// True for open-ended windows
    pub fn is_unbounded(&self) -> bool {
        self.end.is_none()
    }
}
