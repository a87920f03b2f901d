//! Session lifecycle orchestration.

use super::{closing::close_if_open, rollup::refresh_worked_time};
use crate::{
    activity::{
        domain::{ActivityAction, ActivityEntry},
        services::record,
    },
    actor::OperatorId,
    case::domain::Case,
    error::{CaseworkError, CaseworkResult, EntityKind, SessionConflict},
    store::ports::{CaseworkStore, StoreTransaction},
    task::domain::{Task, TaskId, TaskState},
    tracking::domain::{Interval, InterruptionKind, SessionId, TrackingPolicy, TrackingSession},
    validation::optional_text,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;

/// Request payload for pausing a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PauseSessionRequest {
    /// Session to pause.
    pub session_id: SessionId,
    /// Operator issuing the command; must own the session.
    pub operator_id: OperatorId,
    /// Why work was interrupted.
    pub reason: Option<InterruptionKind>,
    /// Optional note, required for long sessions.
    pub note: Option<String>,
}

/// Request payload for recording a session after the fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualEntryRequest {
    /// Task the time was spent on.
    pub task_id: TaskId,
    /// Operator who did the work.
    pub operator_id: OperatorId,
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end.
    pub end: DateTime<Utc>,
    /// Optional note, required for long sessions.
    pub note: Option<String>,
}

/// Outcome of starting a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStart {
    /// The newly opened session.
    pub session: TrackingSession,
    /// The operator's previous session, closed to make room.
    pub auto_closed: Option<TrackingSession>,
}

/// Time-tracking orchestration service.
#[derive(Clone)]
pub struct TimeTrackingService<S, C>
where
    S: CaseworkStore,
    C: Clock + Send + Sync + 'static,
{
    store: Arc<S>,
    clock: Arc<C>,
    policy: TrackingPolicy,
}

impl<S, C> TimeTrackingService<S, C>
where
    S: CaseworkStore,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new time-tracking service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>, policy: TrackingPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    /// Returns the duration rules this service applies.
    #[must_use]
    pub const fn policy(&self) -> TrackingPolicy {
        self.policy
    }

    /// Opens a session for `operator_id` on `task_id`, starting now.
    ///
    /// An open session the operator already holds is closed first and
    /// logged separately. A not-started task moves to in progress.
    ///
    /// # Errors
    ///
    /// - [`CaseworkError::NotFound`] when the task does not exist.
    /// - [`CaseworkError::InvalidTransition`] when the task is completed.
    /// - [`CaseworkError::DependencyNotSatisfied`] when a not-started task's
    ///   predecessor is not completed.
    /// - [`CaseworkError::Validation`] when the case no longer accepts work.
    #[tracing::instrument(skip(self), fields(task_id = %task_id, operator_id = %operator_id))]
    pub async fn start_session(
        &self,
        task_id: TaskId,
        operator_id: OperatorId,
    ) -> CaseworkResult<SessionStart> {
        let clock = Arc::clone(&self.clock);
        let started = self
            .store
            .transaction(move |tx| {
                tx.lock_operator_slot(operator_id)?;
                let auto_closed = close_if_open(tx, operator_id, &*clock)?;
                let (mut case, mut task) = lock_task_with_case(tx, task_id)?;
                case.ensure_accepts_work()?;

                ensure_trackable(&task)?;
                match task.state() {
                    TaskState::NotStarted => {
                        let dependency = match task.depends_on() {
                            Some(dependency_id) => tx.find_task(dependency_id)?,
                            None => None,
                        };
                        let previous =
                            task.transition_to(TaskState::InProgress, dependency.as_ref(), &*clock)?;
                        tx.update_task(&task)?;
                        record(
                            tx,
                            &ActivityEntry::new(
                                case.id(),
                                operator_id,
                                ActivityAction::TaskStateChanged,
                                &*clock,
                            )
                            .for_task(task.id())
                            .with_change(Some(previous.as_str()), Some(task.state().as_str()))
                            .with_meta("trigger", "session_start"),
                        )?;
                    }
                    TaskState::InProgress | TaskState::Blocked | TaskState::Completed => {}
                }

                let session = TrackingSession::start(task.id(), operator_id, &*clock);
                tx.insert_session(&session)?;
                refresh_worked_time(tx, &mut case, &mut task, &*clock)?;
                record(
                    tx,
                    &ActivityEntry::new(case.id(), operator_id, ActivityAction::SessionStarted, &*clock)
                        .for_task(task.id())
                        .with_meta("session_id", session.id().to_string()),
                )?;
                Ok(SessionStart {
                    session,
                    auto_closed,
                })
            })
            .await?;

        if let Some(closed) = &started.auto_closed {
            tracing::warn!(
                session_id = %closed.id(),
                task_id = %closed.task_id(),
                operator_id = %operator_id,
                duration = %closed.duration().unwrap_or_default(),
                "open session auto-closed for new session"
            );
        }
        tracing::info!(
            session_id = %started.session.id(),
            task_id = %task_id,
            operator_id = %operator_id,
            "session started"
        );
        Ok(started)
    }

    /// Closes an open session because work was interrupted.
    ///
    /// # Errors
    ///
    /// - [`CaseworkError::NotFound`] when the session does not exist.
    /// - [`CaseworkError::Forbidden`] when another operator owns it.
    /// - [`CaseworkError::SessionConflict`] when it is already closed.
    /// - [`CaseworkError::TooShortSession`] or [`CaseworkError::RequireNote`]
    ///   when the duration rules reject it; the session stays open.
    #[tracing::instrument(
        skip(self, request),
        fields(session_id = %request.session_id, operator_id = %request.operator_id)
    )]
    pub async fn pause_session(
        &self,
        request: PauseSessionRequest,
    ) -> CaseworkResult<TrackingSession> {
        let PauseSessionRequest {
            session_id,
            operator_id,
            reason,
            note,
        } = request;
        self.close_session(session_id, operator_id, note.as_deref(), move |session, end, note| {
            session.pause(end, reason, note);
            ActivityAction::SessionPaused
        })
        .await
    }

    /// Closes an open session at the end of work. The task's state is left
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`TimeTrackingService::pause_session`].
    #[tracing::instrument(skip(self, note), fields(session_id = %session_id, operator_id = %operator_id))]
    pub async fn stop_session(
        &self,
        session_id: SessionId,
        operator_id: OperatorId,
        note: Option<String>,
    ) -> CaseworkResult<TrackingSession> {
        self.close_session(session_id, operator_id, note.as_deref(), |session, end, note| {
            session.stop(end, note);
            ActivityAction::SessionStopped
        })
        .await
    }

    /// Records a closed session entered after the fact.
    ///
    /// # Errors
    ///
    /// - [`CaseworkError::Validation`] when the interval is empty, inverted
    ///   or ends in the future, or the case no longer accepts work.
    /// - [`CaseworkError::SessionConflict`] when it overlaps another session
    ///   of the operator, including one still open.
    /// - [`CaseworkError::TooShortSession`] or [`CaseworkError::RequireNote`].
    /// - [`CaseworkError::InvalidTransition`] when the task is completed.
    /// - [`CaseworkError::NotFound`] when the task does not exist.
    #[tracing::instrument(
        skip(self, request),
        fields(task_id = %request.task_id, operator_id = %request.operator_id)
    )]
    pub async fn record_manual_entry(
        &self,
        request: ManualEntryRequest,
    ) -> CaseworkResult<TrackingSession> {
        let ManualEntryRequest {
            task_id,
            operator_id,
            start,
            end,
            note: supplied_note,
        } = request;
        let interval = Interval::new(start, end)?;
        if interval.end() > self.clock.utc() {
            return Err(CaseworkError::validation(format!(
                "manual entry cannot end in the future ({end})"
            )));
        }
        let note = optional_text(supplied_note.as_deref());
        self.policy.check(interval.duration(), note.as_deref())?;

        let clock = Arc::clone(&self.clock);
        let session = self
            .store
            .transaction(move |tx| {
                tx.lock_operator_slot(operator_id)?;
                let (mut case, mut task) = lock_task_with_case(tx, task_id)?;
                case.ensure_accepts_work()?;
                ensure_trackable(&task)?;

                let now = clock.utc();
                let existing =
                    tx.sessions_for_operator_between(operator_id, interval.start(), interval.end())?;
                if let Some(conflict) = existing.iter().find(|session| {
                    session
                        .occupied_until(now)
                        .is_some_and(|occupied| occupied.overlaps(&interval))
                }) {
                    return Err(SessionConflict::Overlap {
                        existing: conflict.id(),
                    }
                    .into());
                }

                let session = TrackingSession::manual(task.id(), operator_id, interval, note);
                tx.insert_session(&session)?;
                refresh_worked_time(tx, &mut case, &mut task, &*clock)?;
                record(
                    tx,
                    &ActivityEntry::new(case.id(), operator_id, ActivityAction::ManualEntry, &*clock)
                        .for_task(task.id())
                        .with_change(None::<String>, Some(interval.duration().to_string()))
                        .with_meta("session_id", session.id().to_string())
                        .with_meta("started_at", interval.start().to_rfc3339())
                        .with_meta("ended_at", interval.end().to_rfc3339())
                        .with_meta("duration_secs", interval.duration().as_seconds()),
                )?;
                Ok(session)
            })
            .await?;

        tracing::info!(
            session_id = %session.id(),
            task_id = %task_id,
            operator_id = %operator_id,
            duration = %interval.duration(),
            "manual session recorded"
        );
        Ok(session)
    }

    /// Returns the operator's open session, if any.
    ///
    /// # Errors
    ///
    /// Returns store failures.
    #[tracing::instrument(skip(self), fields(operator_id = %operator_id))]
    pub async fn active_session(
        &self,
        operator_id: OperatorId,
    ) -> CaseworkResult<Option<TrackingSession>> {
        self.store
            .transaction(move |tx| Ok(tx.open_session_for_operator(operator_id)?))
            .await
    }

    /// Returns every session recorded against a task, ordered by start.
    ///
    /// # Errors
    ///
    /// Returns [`CaseworkError::NotFound`] when the task does not exist, or
    /// store failures.
    #[tracing::instrument(skip(self), fields(task_id = %task_id))]
    pub async fn task_sessions(&self, task_id: TaskId) -> CaseworkResult<Vec<TrackingSession>> {
        self.store
            .transaction(move |tx| {
                if tx.find_task(task_id)?.is_none() {
                    return Err(CaseworkError::not_found(EntityKind::Task, task_id));
                }
                Ok(tx.sessions_for_task(task_id)?)
            })
            .await
    }

    async fn close_session<F>(
        &self,
        session_id: SessionId,
        operator_id: OperatorId,
        supplied_note: Option<&str>,
        close: F,
    ) -> CaseworkResult<TrackingSession>
    where
        F: FnOnce(&mut TrackingSession, DateTime<Utc>, Option<String>) -> ActivityAction
            + Send
            + 'static,
    {
        let clock = Arc::clone(&self.clock);
        let policy = self.policy;
        let note = optional_text(supplied_note);
        let session = self
            .store
            .transaction(move |tx| {
                tx.lock_operator_slot(operator_id)?;
                let (mut case, mut task, mut session) =
                    lock_session_for_close(tx, session_id, operator_id)?;

                let end = clock.utc();
                let duration = session.elapsed_until(end);
                policy.check(duration, note.as_deref())?;

                let action = close(&mut session, end, note);
                tx.update_session(&session)?;
                refresh_worked_time(tx, &mut case, &mut task, &*clock)?;

                let mut entry = ActivityEntry::new(case.id(), operator_id, action, &*clock)
                    .for_task(task.id())
                    .with_change(Some("open"), Some(duration.to_string()))
                    .with_meta("session_id", session.id().to_string())
                    .with_meta("duration_secs", duration.as_seconds());
                if let Some(kind) = session.interruption() {
                    entry = entry.with_meta("interruption", kind.as_str());
                }
                record(tx, &entry)?;
                Ok(session)
            })
            .await?;

        tracing::info!(
            session_id = %session.id(),
            task_id = %session.task_id(),
            operator_id = %operator_id,
            closure = ?session.closure(),
            duration = %session.duration().unwrap_or_default(),
            "session closed"
        );
        Ok(session)
    }
}

/// Locks a task's case and then the task itself.
pub(crate) fn lock_task_with_case(
    tx: &mut dyn StoreTransaction,
    task_id: TaskId,
) -> CaseworkResult<(Case, Task)> {
    let case_id = tx
        .find_task(task_id)?
        .ok_or_else(|| CaseworkError::not_found(EntityKind::Task, task_id))?
        .case_id();
    let case = tx
        .lock_case(case_id)?
        .ok_or_else(|| CaseworkError::not_found(EntityKind::Case, case_id))?;
    let task = tx
        .lock_task(task_id)?
        .ok_or_else(|| CaseworkError::not_found(EntityKind::Task, task_id))?;
    Ok((case, task))
}

/// Locks a session for closing by `operator_id`, taking the case and task
/// locks before the session lock.
///
/// The session is read unlocked first only to find its task.
pub(crate) fn lock_session_for_close(
    tx: &mut dyn StoreTransaction,
    session_id: SessionId,
    operator_id: OperatorId,
) -> CaseworkResult<(Case, Task, TrackingSession)> {
    let task_id = tx
        .find_session(session_id)?
        .ok_or_else(|| CaseworkError::not_found(EntityKind::Session, session_id))?
        .task_id();
    let (case, task) = lock_task_with_case(tx, task_id)?;
    let session = tx
        .lock_session(session_id)?
        .ok_or_else(|| CaseworkError::not_found(EntityKind::Session, session_id))?;
    session.ensure_closable_by(operator_id)?;
    Ok((case, task, session))
}

/// Completed tasks take no further time, tracked or entered manually.
fn ensure_trackable(task: &Task) -> CaseworkResult<()> {
    if task.state() == TaskState::Completed {
        return Err(CaseworkError::InvalidTransition {
            entity: EntityKind::Task,
            from: TaskState::Completed.as_str().to_owned(),
            to: TaskState::InProgress.as_str().to_owned(),
        });
    }
    Ok(())
}
