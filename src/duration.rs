//! Whole-second work durations used for estimates and tracked time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;

/// Amount of work time, stored as whole seconds.
///
/// Hours are never represented as floating point values; callers that need
/// decimal hours format them from [`WorkDuration::as_seconds`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct WorkDuration(i64);

impl WorkDuration {
    /// The zero duration.
    pub const ZERO: Self = Self(0);

    /// Creates a duration from whole seconds, clamping negatives to zero.
    #[must_use]
    pub const fn from_seconds(seconds: i64) -> Self {
        if seconds < 0 { Self(0) } else { Self(seconds) }
    }

    /// Creates a duration from whole minutes.
    #[must_use]
    pub const fn from_minutes(minutes: i64) -> Self {
        Self::from_seconds(minutes.saturating_mul(SECONDS_PER_MINUTE))
    }

    /// Creates a duration from whole hours.
    #[must_use]
    pub const fn from_hours(hours: i64) -> Self {
        Self::from_seconds(hours.saturating_mul(SECONDS_PER_HOUR))
    }

    /// Returns the elapsed time between two instants, or zero when `end`
    /// does not follow `start`.
    #[must_use]
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::from_seconds(end.signed_duration_since(start).num_seconds())
    }

    /// Returns the duration in seconds.
    #[must_use]
    pub const fn as_seconds(self) -> i64 {
        self.0
    }

    /// Returns the number of complete minutes.
    #[must_use]
    pub const fn whole_minutes(self) -> i64 {
        self.0.div_euclid(SECONDS_PER_MINUTE)
    }
}

impl Add for WorkDuration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for WorkDuration {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for WorkDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0.div_euclid(SECONDS_PER_HOUR);
        let minutes = self.0.rem_euclid(SECONDS_PER_HOUR).div_euclid(SECONDS_PER_MINUTE);
        write!(f, "{hours}h{minutes:02}m")
    }
}
