//! Duration rules applied when a session is closed by its operator.

use crate::{duration::WorkDuration, error::CaseworkError};
use serde::{Deserialize, Serialize};

const fn default_minimum_session_secs() -> i64 {
    60
}

const fn default_long_session_secs() -> i64 {
    8 * 60 * 60
}

/// Minimum and long-session thresholds for tracked time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingPolicy {
    /// Sessions shorter than this are rejected.
    #[serde(default = "default_minimum_session_secs")]
    pub minimum_session_secs: i64,
    /// Sessions longer than this need an explanatory note.
    #[serde(default = "default_long_session_secs")]
    pub long_session_secs: i64,
}

impl Default for TrackingPolicy {
    fn default() -> Self {
        Self {
            minimum_session_secs: default_minimum_session_secs(),
            long_session_secs: default_long_session_secs(),
        }
    }
}

impl TrackingPolicy {
    /// Creates a policy from explicit thresholds.
    #[must_use]
    pub const fn new(minimum: WorkDuration, long_session: WorkDuration) -> Self {
        Self {
            minimum_session_secs: minimum.as_seconds(),
            long_session_secs: long_session.as_seconds(),
        }
    }

    /// Returns the minimum accepted session length.
    #[must_use]
    pub const fn minimum(&self) -> WorkDuration {
        WorkDuration::from_seconds(self.minimum_session_secs)
    }

    /// Returns the length above which a note is required.
    #[must_use]
    pub const fn long_session_threshold(&self) -> WorkDuration {
        WorkDuration::from_seconds(self.long_session_secs)
    }

    /// Checks an operator-supplied session length.
    ///
    /// # Errors
    ///
    /// Returns [`CaseworkError::TooShortSession`] below the minimum and
    /// [`CaseworkError::RequireNote`] above the long-session threshold when
    /// `note` is blank or missing.
    pub fn check(&self, duration: WorkDuration, note: Option<&str>) -> Result<(), CaseworkError> {
        if duration < self.minimum() {
            return Err(CaseworkError::TooShortSession {
                duration,
                minimum: self.minimum(),
            });
        }
        let has_note = note.is_some_and(|text| !text.trim().is_empty());
        if duration > self.long_session_threshold() && !has_note {
            return Err(CaseworkError::RequireNote {
                duration,
                threshold: self.long_session_threshold(),
            });
        }
        Ok(())
    }
}
