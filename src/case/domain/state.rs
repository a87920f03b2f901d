//! Case lifecycle states and the canonical transition table.

use super::{ParseCasePriorityError, ParseCaseStateError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Case lifecycle state.
///
/// ```text
/// draft → active → in_progress → completed → invoiced → archived
///           ↕            ↓            ↓
///        suspended ←─────┘        in_progress (reopen)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseState {
    /// Case is being prepared and is not yet workable.
    Draft,
    /// Case is open for work but nothing has started.
    Active,
    /// Work is under way.
    InProgress,
    /// Work is on hold.
    Suspended,
    /// All work is done.
    Completed,
    /// The completed work has been invoiced.
    Invoiced,
    /// Case is closed for good.
    Archived,
}

impl CaseState {
    /// Every case state, in lifecycle order.
    pub const ALL: [Self; 7] = [
        Self::Draft,
        Self::Active,
        Self::InProgress,
        Self::Suspended,
        Self::Completed,
        Self::Invoiced,
        Self::Archived,
    ];

    /// Valid next states from the current state.
    ///
    /// This is the only transition table for cases; `Draft` cannot be
    /// suspended directly.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::Active, Self::Archived],
            Self::Active => &[
                Self::InProgress,
                Self::Suspended,
                Self::Completed,
                Self::Archived,
            ],
            Self::InProgress => &[Self::Suspended, Self::Completed],
            Self::Suspended => &[Self::Active, Self::InProgress, Self::Archived],
            Self::Completed => &[Self::InProgress, Self::Invoiced, Self::Archived],
            Self::Invoiced => &[Self::Archived],
            Self::Archived => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Returns `true` when no transition leaves this state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Archived)
    }

    /// Returns `true` while tasks and sessions of the case may still change.
    ///
    /// A completed case must move back to in progress before its tasks
    /// change again.
    #[must_use]
    pub const fn accepts_work(self) -> bool {
        !matches!(self, Self::Completed | Self::Invoiced | Self::Archived)
    }

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::InProgress => "in_progress",
            Self::Suspended => "suspended",
            Self::Completed => "completed",
            Self::Invoiced => "invoiced",
            Self::Archived => "archived",
        }
    }
}

impl TryFrom<&str> for CaseState {
    type Error = ParseCaseStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == normalized)
            .ok_or_else(|| ParseCaseStateError(value.to_owned()))
    }
}

impl fmt::Display for CaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CasePriority {
    /// Can wait.
    Low,
    /// Default priority.
    #[default]
    Normal,
    /// Should be handled ahead of normal work.
    High,
    /// Needs immediate attention.
    Urgent,
}

impl CasePriority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl TryFrom<&str> for CasePriority {
    type Error = ParseCasePriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(ParseCasePriorityError(value.to_owned())),
        }
    }
}
