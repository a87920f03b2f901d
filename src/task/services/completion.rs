//! Completing tasks inside a larger transaction.

use crate::{
    activity::{
        domain::{ActivityAction, ActivityEntry},
        services::record,
    },
    actor::OperatorId,
    case::domain::Case,
    error::CaseworkResult,
    store::ports::StoreTransaction,
    task::domain::{Task, TaskState},
    tracking::services::{close_open_sessions_for_task, refresh_worked_time},
};
use mockable::Clock;

/// Closes the task's open sessions and persists the task together with the
/// refreshed worked-time rollups.
///
/// The task must already be in `Completed`.
fn settle_completed_task(
    tx: &mut dyn StoreTransaction,
    case: &mut Case,
    task: &mut Task,
    actor_id: OperatorId,
    clock: &impl Clock,
) -> CaseworkResult<usize> {
    let closed = close_open_sessions_for_task(tx, task, actor_id, clock)?;
    refresh_worked_time(tx, case, task, clock)?;
    Ok(closed.len())
}

/// Completes a task through the regular transition table.
pub(crate) fn complete_task(
    tx: &mut dyn StoreTransaction,
    case: &mut Case,
    task: &mut Task,
    actor_id: OperatorId,
    clock: &impl Clock,
) -> CaseworkResult<TaskState> {
    let previous = task.transition_to(TaskState::Completed, None, clock)?;
    let closed = settle_completed_task(tx, case, task, actor_id, clock)?;
    record(
        tx,
        &ActivityEntry::new(case.id(), actor_id, ActivityAction::TaskStateChanged, clock)
            .for_task(task.id())
            .with_change(Some(previous.as_str()), Some(TaskState::Completed.as_str()))
            .with_meta("sessions_closed", closed),
    )?;
    Ok(previous)
}

/// Completes a task on behalf of its case, bypassing dependency gates.
///
/// Returns the previous state, or `None` when the task was already
/// completed and nothing was written.
pub(crate) fn force_complete_task(
    tx: &mut dyn StoreTransaction,
    case: &mut Case,
    task: &mut Task,
    actor_id: OperatorId,
    clock: &impl Clock,
) -> CaseworkResult<Option<TaskState>> {
    let Some(previous) = task.force_complete(clock) else {
        return Ok(None);
    };
    let closed = settle_completed_task(tx, case, task, actor_id, clock)?;
    record(
        tx,
        &ActivityEntry::new(case.id(), actor_id, ActivityAction::TaskForceCompleted, clock)
            .for_task(task.id())
            .with_change(Some(previous.as_str()), Some(TaskState::Completed.as_str()))
            .with_meta("sessions_closed", closed),
    )?;
    Ok(Some(previous))
}
