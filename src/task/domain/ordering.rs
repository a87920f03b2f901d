//! Ordering and dependency rules over a case's task set.
//!
//! These functions are pure: they take the case's current tasks and return
//! either a plan to apply or the reason the request is invalid, so a failed
//! request never leaves a partially renumbered case behind.

use super::{Task, TaskId};
use crate::error::{CaseworkError, EntityKind};
use std::collections::{HashMap, HashSet};

/// Returns the order index for a task appended to the case.
#[must_use]
pub fn next_order_index(tasks: &[Task]) -> u32 {
    tasks
        .iter()
        .map(Task::order_index)
        .max()
        .map_or(0, |highest| highest.saturating_add(1))
}

/// Validates a complete reordering of a case's tasks.
///
/// `ordered` must name every task of the case exactly once. The returned
/// plan assigns each task its position in `ordered`.
///
/// # Errors
///
/// Returns [`CaseworkError::Validation`] when `ordered` contains unknown or
/// duplicate ids, or omits a task of the case.
pub fn plan_reorder(tasks: &[Task], ordered: &[TaskId]) -> Result<Vec<(TaskId, u32)>, CaseworkError> {
    let known: HashSet<TaskId> = tasks.iter().map(Task::id).collect();
    let mut seen = HashSet::with_capacity(ordered.len());
    let mut plan = Vec::with_capacity(ordered.len());

    for (position, task_id) in ordered.iter().enumerate() {
        if !known.contains(task_id) {
            return Err(CaseworkError::validation(format!(
                "task {task_id} does not belong to the case being reordered"
            )));
        }
        if !seen.insert(*task_id) {
            return Err(CaseworkError::validation(format!(
                "task {task_id} appears more than once in the new order"
            )));
        }
        let order_index = u32::try_from(position)
            .map_err(|_| CaseworkError::validation("too many tasks to reorder"))?;
        plan.push((*task_id, order_index));
    }

    if seen.len() != known.len() {
        return Err(CaseworkError::validation(format!(
            "the new order names {} of {} tasks",
            seen.len(),
            known.len()
        )));
    }
    Ok(plan)
}

/// Returns the new positions of the tasks that follow `removed`.
#[must_use]
pub fn close_gap_after(tasks: &[Task], removed: &Task) -> Vec<(TaskId, u32)> {
    tasks
        .iter()
        .filter(|task| task.id() != removed.id() && task.order_index() > removed.order_index())
        .map(|task| (task.id(), task.order_index().saturating_sub(1)))
        .collect()
}

/// Validates that `task_id` (or a new task when `None`) may depend on
/// `predecessor`.
///
/// # Errors
///
/// - [`CaseworkError::NotFound`] when the predecessor does not exist in the
///   case.
/// - [`CaseworkError::Validation`] when the task would depend on itself or
///   the dependency would close a cycle.
pub fn validate_dependency(
    tasks: &[Task],
    task_id: Option<TaskId>,
    predecessor: TaskId,
) -> Result<(), CaseworkError> {
    let by_id: HashMap<TaskId, &Task> = tasks.iter().map(|task| (task.id(), task)).collect();
    if !by_id.contains_key(&predecessor) {
        return Err(CaseworkError::not_found(EntityKind::Task, predecessor));
    }
    let Some(dependent) = task_id else {
        return Ok(());
    };
    if dependent == predecessor {
        return Err(CaseworkError::validation("a task cannot depend on itself"));
    }

    let mut cursor = Some(predecessor);
    let mut visited = HashSet::new();
    while let Some(current) = cursor {
        if current == dependent {
            return Err(CaseworkError::validation(format!(
                "task {dependent} cannot depend on {predecessor}: the dependency would form a cycle"
            )));
        }
        if !visited.insert(current) {
            break;
        }
        cursor = by_id.get(&current).and_then(|task| task.depends_on());
    }
    Ok(())
}
