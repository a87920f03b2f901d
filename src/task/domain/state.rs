//! Task lifecycle states.

use super::ParseTaskStateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle state.
///
/// ```text
/// not_started → in_progress → completed
///      ↕             ↓           ↑
///   blocked ─────────┴───────────┘
/// ```
///
/// `completed → in_progress` is only reachable through an explicit reopen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Work has not started.
    NotStarted,
    /// Work is under way.
    InProgress,
    /// Work is done.
    Completed,
    /// Work cannot proceed for an external reason.
    Blocked,
}

impl TaskState {
    /// Every task state.
    pub const ALL: [Self; 4] = [
        Self::NotStarted,
        Self::InProgress,
        Self::Completed,
        Self::Blocked,
    ];

    /// Valid next states reachable through a regular transition.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::NotStarted => &[Self::InProgress, Self::Blocked, Self::Completed],
            Self::InProgress => &[Self::Blocked, Self::Completed],
            Self::Blocked => &[Self::NotStarted, Self::InProgress, Self::Completed],
            Self::Completed => &[],
        }
    }

    /// Check whether a regular transition to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Blocked => "blocked",
        }
    }
}

impl TryFrom<&str> for TaskState {
    type Error = ParseTaskStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == normalized)
            .ok_or_else(|| ParseTaskStateError(value.to_owned()))
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
