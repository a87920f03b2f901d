//! Error taxonomy shared by every casework operation.
//!
//! Each variant corresponds to one failure kind callers can branch on.
//! [`CaseworkError::Store`] always means the enclosing transaction was rolled
//! back; [`CaseworkError::TooShortSession`] and [`CaseworkError::RequireNote`]
//! can be fixed by resubmitting the same command later or with a note.

use crate::{
    actor::OperatorId,
    case::domain::CaseId,
    duration::WorkDuration,
    store::ports::StoreError,
    task::domain::{TaskId, TaskState},
    tracking::domain::SessionId,
};
use std::fmt;
use thiserror::Error;

/// Result type returned by casework services.
pub type CaseworkResult<T> = Result<T, CaseworkError>;

/// Entity families named in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A billable case.
    Case,
    /// A task within a case.
    Task,
    /// A time-tracking session.
    Session,
}

impl EntityKind {
    /// Returns the lowercase entity name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Case => "case",
            Self::Task => "task",
            Self::Session => "session",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a tracking session command conflicts with existing sessions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionConflict {
    /// The session has already been closed and cannot be closed again.
    #[error("session {0} is already closed")]
    AlreadyClosed(SessionId),

    /// The requested interval overlaps another session of the same operator.
    #[error("interval overlaps session {existing}")]
    Overlap {
        /// Session whose interval intersects the requested one.
        existing: SessionId,
    },
}

/// Errors returned by casework operations.
#[derive(Debug, Clone, Error)]
pub enum CaseworkError {
    /// Input failed validation and must be corrected before retrying.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The referenced entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity family.
        entity: EntityKind,
        /// Identifier that was looked up.
        id: String,
    },

    /// The actor is not allowed to perform the operation.
    #[error("operator {operator_id} may not {action}")]
    Forbidden {
        /// Operator attempting the operation.
        operator_id: OperatorId,
        /// Short description of the refused operation.
        action: String,
    },

    /// The requested lifecycle move is not in the transition table.
    #[error("invalid {entity} transition: {from} -> {to}")]
    InvalidTransition {
        /// Entity family whose lifecycle was involved.
        entity: EntityKind,
        /// Current state in canonical storage form.
        from: String,
        /// Requested state in canonical storage form.
        to: String,
    },

    /// The task's predecessor has not been completed.
    #[error("task {task_id} depends on task {dependency_id}, which is {dependency_state}")]
    DependencyNotSatisfied {
        /// Task that was asked to start.
        task_id: TaskId,
        /// Predecessor task.
        dependency_id: TaskId,
        /// Current state of the predecessor.
        dependency_state: TaskState,
    },

    /// Mandatory tasks are still open, so the case cannot complete.
    #[error("case {case_id} still has {outstanding} mandatory task(s) pending")]
    MandatoryTasksPending {
        /// Case asked to complete.
        case_id: CaseId,
        /// Number of mandatory tasks not yet completed.
        outstanding: usize,
    },

    /// Other tasks depend on this task, so it cannot be deleted.
    #[error("task {task_id} is a dependency of {} other task(s)", dependents.len())]
    HasDependents {
        /// Task asked to be deleted.
        task_id: TaskId,
        /// Tasks naming it as their predecessor.
        dependents: Vec<TaskId>,
    },

    /// The session command conflicts with existing sessions.
    #[error("session conflict: {0}")]
    SessionConflict(SessionConflict),

    /// The tracked interval is shorter than the configured minimum.
    #[error("session lasted {duration}, below the minimum of {minimum}")]
    TooShortSession {
        /// Measured duration.
        duration: WorkDuration,
        /// Configured minimum.
        minimum: WorkDuration,
    },

    /// Long sessions must be justified with a note.
    #[error("session lasted {duration}, above {threshold}; a note is required")]
    RequireNote {
        /// Measured duration.
        duration: WorkDuration,
        /// Configured long-session threshold.
        threshold: WorkDuration,
    },

    /// No task of the case has started yet.
    #[error("case {case_id} has no started or completed task yet")]
    NoActivityYet {
        /// Case asked to move into progress.
        case_id: CaseId,
    },

    /// Persistence failed; the transaction was rolled back.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CaseworkError {
    /// Builds a [`CaseworkError::NotFound`] for the given entity.
    pub fn not_found(entity: EntityKind, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Builds a [`CaseworkError::Validation`] from a message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Builds a [`CaseworkError::Forbidden`] for the given operator.
    pub fn forbidden(operator_id: OperatorId, action: impl Into<String>) -> Self {
        Self::Forbidden {
            operator_id,
            action: action.into(),
        }
    }

    /// Returns `true` when resubmitting the same command (possibly with a
    /// note, or later) can succeed without corrected input.
    #[must_use]
    pub const fn is_resubmittable(&self) -> bool {
        matches!(self, Self::TooShortSession { .. } | Self::RequireNote { .. })
    }
}

impl From<SessionConflict> for CaseworkError {
    fn from(conflict: SessionConflict) -> Self {
        Self::SessionConflict(conflict)
    }
}
