//! Completion metrics derived from a case's task set.

use crate::task::domain::{Task, TaskState};
use serde::{Deserialize, Serialize};

/// Completion metrics for one case.
///
/// Always computed from the live task set; never cached or updated
/// incrementally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseProgress {
    /// Rounded completion percentage, `0` for a case without tasks.
    pub percent: u8,
    /// Number of completed tasks.
    pub completed: usize,
    /// Number of tasks in the case.
    pub total: usize,
    /// Number of tasks currently in progress.
    pub in_progress: usize,
    /// Mandatory tasks that are not completed yet.
    pub mandatory_outstanding: usize,
}

impl CaseProgress {
    /// Aggregates progress over the given tasks.
    #[must_use]
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut progress = Self::default();
        for task in tasks {
            progress.total += 1;
            match task.state() {
                TaskState::Completed => progress.completed += 1,
                TaskState::InProgress => progress.in_progress += 1,
                TaskState::NotStarted | TaskState::Blocked => {}
            }
            if task.is_mandatory() && task.state() != TaskState::Completed {
                progress.mandatory_outstanding += 1;
            }
        }
        progress.percent = rounded_percent(progress.completed, progress.total);
        progress
    }

    /// Returns `true` once at least one task has started or completed.
    #[must_use]
    pub const fn has_activity(&self) -> bool {
        self.in_progress > 0 || self.completed > 0
    }
}

/// `round(100 * part / whole)` with halves rounded up, `0` when `whole` is 0.
fn rounded_percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let numerator = part.saturating_mul(200).saturating_add(whole);
    let percent = numerator.div_euclid(whole.saturating_mul(2));
    u8::try_from(percent.min(100)).unwrap_or(100)
}
