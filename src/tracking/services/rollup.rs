//! Worked-time rollups.

use crate::{
    case::domain::Case,
    duration::WorkDuration,
    error::CaseworkResult,
    store::ports::StoreTransaction,
    task::domain::Task,
    tracking::domain::TrackingSession,
};
use mockable::Clock;

/// Recomputes `task`'s worked time from its closed sessions and then the
/// case rollup, persisting both.
///
/// `case` must be the task's case, locked by the caller before the task.
pub(crate) fn refresh_worked_time(
    tx: &mut dyn StoreTransaction,
    case: &mut Case,
    task: &mut Task,
    clock: &impl Clock,
) -> CaseworkResult<()> {
    let worked: WorkDuration = tx
        .sessions_for_task(task.id())?
        .iter()
        .filter_map(TrackingSession::duration)
        .sum();
    task.record_worked(worked, clock);
    tx.update_task(task)?;
    refresh_case_worked(tx, case, clock)
}

/// Recomputes the case rollup as the sum of its tasks' worked time and
/// persists the case.
pub(crate) fn refresh_case_worked(
    tx: &mut dyn StoreTransaction,
    case: &mut Case,
    clock: &impl Clock,
) -> CaseworkResult<()> {
    let worked: WorkDuration = tx.tasks_for_case(case.id())?.iter().map(Task::worked).sum();
    case.record_worked(worked, clock);
    tx.update_case(case)?;
    Ok(())
}
