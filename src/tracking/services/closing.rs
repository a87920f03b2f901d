//! Sessions closed by the system on an operator's behalf.
//!
//! Both paths skip the duration rules: the operator did not choose when
//! these sessions ended.

use super::{rollup::refresh_worked_time, sessions::lock_task_with_case};
use crate::{
    activity::{
        domain::{ActivityAction, ActivityEntry},
        services::record,
    },
    actor::OperatorId,
    error::{CaseworkError, CaseworkResult, EntityKind},
    store::ports::StoreTransaction,
    task::domain::Task,
    tracking::domain::{SessionClosure, TrackingSession},
};
use mockable::Clock;

/// Closes the operator's open session, if any, ending it now.
///
/// The caller must already hold the operator's slot lock. The closed
/// session's task and case worked time are refreshed and the closure is
/// logged as its own activity entry.
pub(crate) fn close_if_open(
    tx: &mut dyn StoreTransaction,
    operator_id: OperatorId,
    clock: &impl Clock,
) -> CaseworkResult<Option<TrackingSession>> {
    let Some(open) = tx.open_session_for_operator(operator_id)? else {
        return Ok(None);
    };
    let (mut case, mut task) = lock_task_with_case(tx, open.task_id())?;
    let mut session = tx
        .lock_session(open.id())?
        .ok_or_else(|| CaseworkError::not_found(EntityKind::Session, open.id()))?;
    // Closed by a concurrent task completion while we waited for the locks.
    if !session.is_open() {
        return Ok(None);
    }

    let duration = session.close_on_behalf(clock.utc(), SessionClosure::AutoClosed);
    tx.update_session(&session)?;
    refresh_worked_time(tx, &mut case, &mut task, clock)?;
    record(
        tx,
        &closure_entry(&task, operator_id, &session, clock)
            .with_meta("duration_secs", duration.as_seconds()),
    )?;
    Ok(Some(session))
}

/// Closes every open session recorded against `task`, ending them now.
///
/// The caller must hold the task's case and task locks and refresh worked
/// time afterwards.
pub(crate) fn close_open_sessions_for_task(
    tx: &mut dyn StoreTransaction,
    task: &Task,
    actor_id: OperatorId,
    clock: &impl Clock,
) -> CaseworkResult<Vec<TrackingSession>> {
    let open: Vec<_> = tx
        .sessions_for_task(task.id())?
        .into_iter()
        .filter(TrackingSession::is_open)
        .collect();
    let mut closed = Vec::with_capacity(open.len());
    for candidate in open {
        let Some(mut session) = tx.lock_session(candidate.id())? else {
            continue;
        };
        if !session.is_open() {
            continue;
        }
        let duration = session.close_on_behalf(clock.utc(), SessionClosure::TaskCompleted);
        tx.update_session(&session)?;
        record(
            tx,
            &closure_entry(task, actor_id, &session, clock)
                .with_meta("duration_secs", duration.as_seconds())
                .with_meta("session_operator_id", session.operator_id().to_string()),
        )?;
        closed.push(session);
    }
    Ok(closed)
}

fn closure_entry(
    task: &Task,
    actor_id: OperatorId,
    session: &TrackingSession,
    clock: &impl Clock,
) -> ActivityEntry {
    ActivityEntry::new(task.case_id(), actor_id, ActivityAction::SessionAutoClosed, clock)
        .for_task(task.id())
        .with_change(Some("open"), session.closure().map(SessionClosure::as_str))
        .with_meta("session_id", session.id().to_string())
        .with_meta("note", session.note().unwrap_or_default())
}
