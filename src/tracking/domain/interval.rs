//! Half-open time intervals.

use crate::{duration::WorkDuration, error::CaseworkError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Non-empty half-open interval `[start, end)`.
///
/// Two intervals that merely touch (`a.end == b.start`) do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Interval {
    /// Creates an interval.
    ///
    /// # Errors
    ///
    /// Returns [`CaseworkError::Validation`] unless `end` is after `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, CaseworkError> {
        if end <= start {
            return Err(CaseworkError::validation(format!(
                "invalid interval: end {end} must be after start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Returns the inclusive start.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the exclusive end.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns the interval length.
    #[must_use]
    pub fn duration(&self) -> WorkDuration {
        WorkDuration::between(self.start, self.end)
    }

    /// Returns `true` when the intervals share interior time.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}
