//! Store port: a transaction primitive plus the reads and writes performed
//! inside it.

use super::StoreResult;
use crate::{
    activity::domain::ActivityEntry,
    actor::OperatorId,
    case::domain::{Case, CaseId},
    error::CaseworkResult,
    task::domain::{Task, TaskId},
    tracking::domain::{SessionId, TrackingSession},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Transactional casework store.
///
/// Implementations must run `work` atomically: when it returns `Ok` every
/// write becomes visible at once, and when it returns `Err` (including any
/// [`super::StoreError`] raised by a write) nothing does. Concurrent
/// transactions that lock the same case, task, session or operator slot
/// must be serialised.
#[async_trait]
pub trait CaseworkStore: Send + Sync {
    /// Runs `work` inside one transaction and commits it on success.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `work`, or
    /// [`crate::error::CaseworkError::Store`] when the transaction cannot be
    /// opened or committed.
    async fn transaction<T, F>(&self, work: F) -> CaseworkResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn StoreTransaction) -> CaseworkResult<T> + Send + 'static;
}

/// Reads and writes available inside a store transaction.
///
/// `lock_*` methods return the current row and hold it exclusively until
/// the transaction ends; `find_*` methods read without locking.
#[cfg_attr(test, mockall::automock)]
pub trait StoreTransaction {
    /// Inserts a new case.
    ///
    /// # Errors
    ///
    /// Returns [`super::StoreError::Duplicate`] when the identifier exists.
    fn insert_case(&mut self, case: &Case) -> StoreResult<()>;

    /// Replaces a stored case.
    ///
    /// # Errors
    ///
    /// Returns [`super::StoreError::Missing`] when the case does not exist.
    fn update_case(&mut self, case: &Case) -> StoreResult<()>;

    /// Reads a case without locking it.
    ///
    /// # Errors
    ///
    /// Returns persistence failures.
    fn find_case(&mut self, id: CaseId) -> StoreResult<Option<Case>>;

    /// Reads and locks a case.
    ///
    /// # Errors
    ///
    /// Returns persistence failures.
    fn lock_case(&mut self, id: CaseId) -> StoreResult<Option<Case>>;

    /// Inserts a new task.
    ///
    /// # Errors
    ///
    /// Returns [`super::StoreError::Duplicate`] when the identifier exists.
    fn insert_task(&mut self, task: &Task) -> StoreResult<()>;

    /// Replaces a stored task.
    ///
    /// # Errors
    ///
    /// Returns [`super::StoreError::Missing`] when the task does not exist.
    fn update_task(&mut self, task: &Task) -> StoreResult<()>;

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns [`super::StoreError::Missing`] when the task does not exist.
    fn delete_task(&mut self, id: TaskId) -> StoreResult<()>;

    /// Reads a task without locking it.
    ///
    /// # Errors
    ///
    /// Returns persistence failures.
    fn find_task(&mut self, id: TaskId) -> StoreResult<Option<Task>>;

    /// Reads and locks a task.
    ///
    /// # Errors
    ///
    /// Returns persistence failures.
    fn lock_task(&mut self, id: TaskId) -> StoreResult<Option<Task>>;

    /// Returns every task of a case ordered by order index.
    ///
    /// # Errors
    ///
    /// Returns persistence failures.
    fn tasks_for_case(&mut self, case_id: CaseId) -> StoreResult<Vec<Task>>;

    /// Returns and locks every task of a case, ordered by order index.
    ///
    /// # Errors
    ///
    /// Returns persistence failures.
    fn lock_tasks_for_case(&mut self, case_id: CaseId) -> StoreResult<Vec<Task>>;

    /// Returns the identifiers of tasks whose dependency is `id`.
    ///
    /// # Errors
    ///
    /// Returns persistence failures.
    fn dependents_of(&mut self, id: TaskId) -> StoreResult<Vec<TaskId>>;

    /// Serialises access to an operator's open-session slot until the
    /// transaction ends.
    ///
    /// # Errors
    ///
    /// Returns persistence failures.
    fn lock_operator_slot(&mut self, operator_id: OperatorId) -> StoreResult<()>;

    /// Inserts a new tracking session.
    ///
    /// # Errors
    ///
    /// Returns [`super::StoreError::Duplicate`] when the identifier exists or
    /// the operator already has an open session.
    fn insert_session(&mut self, session: &TrackingSession) -> StoreResult<()>;

    /// Replaces a stored tracking session.
    ///
    /// # Errors
    ///
    /// Returns [`super::StoreError::Missing`] when the session does not exist.
    fn update_session(&mut self, session: &TrackingSession) -> StoreResult<()>;

    /// Reads a tracking session without locking it.
    ///
    /// # Errors
    ///
    /// Returns persistence failures.
    fn find_session(&mut self, id: SessionId) -> StoreResult<Option<TrackingSession>>;

    /// Reads and locks a tracking session.
    ///
    /// # Errors
    ///
    /// Returns persistence failures.
    fn lock_session(&mut self, id: SessionId) -> StoreResult<Option<TrackingSession>>;

    /// Returns the operator's open session, if any.
    ///
    /// # Errors
    ///
    /// Returns persistence failures.
    fn open_session_for_operator(
        &mut self,
        operator_id: OperatorId,
    ) -> StoreResult<Option<TrackingSession>>;

    /// Returns every session recorded against a task, ordered by start.
    ///
    /// # Errors
    ///
    /// Returns persistence failures.
    fn sessions_for_task(&mut self, task_id: TaskId) -> StoreResult<Vec<TrackingSession>>;

    /// Returns the operator's sessions that start before `to` and are open
    /// or end after `from`, ordered by start.
    ///
    /// # Errors
    ///
    /// Returns persistence failures.
    fn sessions_for_operator_between(
        &mut self,
        operator_id: OperatorId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<Vec<TrackingSession>>;

    /// Deletes every session recorded against a task, returning how many
    /// were removed.
    ///
    /// # Errors
    ///
    /// Returns persistence failures.
    fn delete_sessions_for_task(&mut self, task_id: TaskId) -> StoreResult<usize>;

    /// Appends an activity entry.
    ///
    /// # Errors
    ///
    /// Returns persistence failures; callers must abort the transaction.
    fn append_activity(&mut self, entry: &ActivityEntry) -> StoreResult<()>;

    /// Returns a case's activity entries in append order.
    ///
    /// # Errors
    ///
    /// Returns persistence failures.
    fn activity_for_case(&mut self, case_id: CaseId) -> StoreResult<Vec<ActivityEntry>>;
}
