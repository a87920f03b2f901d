//! Service layer for task creation, editing, ordering and lifecycle moves.

use super::completion::complete_task;
use crate::{
    activity::{
        domain::{ActivityAction, ActivityEntry},
        services::record,
    },
    actor::Actor,
    case::domain::{Case, CaseId},
    error::{CaseworkError, CaseworkResult, EntityKind},
    store::ports::{CaseworkStore, StoreTransaction},
    task::domain::{
        Task, TaskChanges, TaskDraft, TaskId, TaskState,
        ordering::{close_gap_after, next_order_index, plan_reorder, validate_dependency},
    },
    tracking::services::{lock_task_with_case, refresh_case_worked},
};
use mockable::Clock;
use std::sync::Arc;

/// Request payload for adding a task to a case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    case_id: CaseId,
    draft: TaskDraft,
    order_index: Option<u32>,
}

impl CreateTaskRequest {
    /// Creates a request that appends the task after the case's last task.
    #[must_use]
    pub const fn new(case_id: CaseId, draft: TaskDraft) -> Self {
        Self {
            case_id,
            draft,
            order_index: None,
        }
    }

    /// Places the task at an explicit position, shifting later tasks down.
    #[must_use]
    pub const fn at_position(mut self, order_index: u32) -> Self {
        self.order_index = Some(order_index);
        self
    }
}

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<S, C>
where
    S: CaseworkStore,
    C: Clock + Send + Sync + 'static,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> TaskLifecycleService<S, C>
where
    S: CaseworkStore,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Adds a task to a case.
    ///
    /// # Errors
    ///
    /// - [`CaseworkError::NotFound`] when the case or the requested
    ///   predecessor does not exist in it.
    /// - [`CaseworkError::Forbidden`] when the actor does not manage the case.
    /// - [`CaseworkError::Validation`] when the title is blank or the case no
    ///   longer accepts work.
    #[tracing::instrument(skip(self, request), fields(case_id = %request.case_id))]
    pub async fn create_task(&self, request: CreateTaskRequest, actor: Actor) -> CaseworkResult<Task> {
        let clock = Arc::clone(&self.clock);
        let task = self
            .store
            .transaction(move |tx| {
                let CreateTaskRequest {
                    case_id,
                    draft,
                    order_index: requested_position,
                } = request;
                let case = lock_case(tx, case_id)?;
                case.ensure_accepts_work()?;
                case.authorize(&actor, "add tasks to the case")?;

                let mut existing = tx.lock_tasks_for_case(case_id)?;
                if let Some(predecessor) = draft.depends_on() {
                    validate_dependency(&existing, None, predecessor)?;
                }
                let order_index = match requested_position {
                    Some(position) => {
                        for sibling in existing
                            .iter_mut()
                            .filter(|sibling| sibling.order_index() >= position)
                        {
                            sibling.move_to(sibling.order_index().saturating_add(1), &*clock);
                            tx.update_task(sibling)?;
                        }
                        position
                    }
                    None => next_order_index(&existing),
                };

                let task = Task::create(case_id, draft, order_index, &*clock)?;
                insert_task(tx, &task, &actor, &*clock)?;
                Ok(task)
            })
            .await?;

        tracing::info!(
            case_id = %task.case_id(),
            task_id = %task.id(),
            operator_id = %actor.operator_id(),
            "task created"
        );
        Ok(task)
    }

    /// Edits a task's fields.
    ///
    /// # Errors
    ///
    /// - [`CaseworkError::NotFound`] when the task or the new predecessor
    ///   does not exist in the case.
    /// - [`CaseworkError::Forbidden`] when the actor may not change the task.
    /// - [`CaseworkError::Validation`] for a blank title, a self or cyclic
    ///   dependency, or a case that no longer accepts work.
    #[tracing::instrument(skip(self, changes), fields(task_id = %task_id))]
    pub async fn update_task(
        &self,
        task_id: TaskId,
        changes: TaskChanges,
        actor: Actor,
    ) -> CaseworkResult<Task> {
        let clock = Arc::clone(&self.clock);
        let (task, changed) = self
            .store
            .transaction(move |tx| {
                let (case, mut task) = lock_task_with_case(tx, task_id)?;
                case.ensure_accepts_work()?;
                task.authorize(&actor, case.operator_id(), "update")?;

                if let Some(Some(predecessor)) = changes.depends_on {
                    let siblings = tx.tasks_for_case(case.id())?;
                    validate_dependency(&siblings, Some(task_id), predecessor)?;
                }
                let changed = task.apply_changes(changes, &*clock)?;
                if !changed.is_empty() {
                    tx.update_task(&task)?;
                    record(
                        tx,
                        &ActivityEntry::new(
                            case.id(),
                            actor.operator_id(),
                            ActivityAction::TaskUpdated,
                            &*clock,
                        )
                        .for_task(task_id)
                        .with_meta("fields", changed.clone()),
                    )?;
                }
                Ok((task, changed))
            })
            .await?;

        if !changed.is_empty() {
            tracing::info!(
                task_id = %task_id,
                operator_id = %actor.operator_id(),
                fields = ?changed,
                "task updated"
            );
        }
        Ok(task)
    }

    /// Deletes a task together with its sessions and closes the ordering gap
    /// it leaves.
    ///
    /// # Errors
    ///
    /// - [`CaseworkError::HasDependents`] when another task depends on it.
    /// - [`CaseworkError::NotFound`] when the task does not exist.
    /// - [`CaseworkError::Forbidden`] when the actor may not change the task.
    /// - [`CaseworkError::Validation`] when the case no longer accepts work.
    #[tracing::instrument(skip(self), fields(task_id = %task_id))]
    pub async fn delete_task(&self, task_id: TaskId, actor: Actor) -> CaseworkResult<()> {
        let clock = Arc::clone(&self.clock);
        let deleted_sessions = self
            .store
            .transaction(move |tx| {
                let (mut case, task) = lock_task_with_case(tx, task_id)?;
                case.ensure_accepts_work()?;
                task.authorize(&actor, case.operator_id(), "delete")?;

                let dependents = tx.dependents_of(task_id)?;
                if !dependents.is_empty() {
                    return Err(CaseworkError::HasDependents {
                        task_id,
                        dependents,
                    });
                }

                let mut siblings = tx.lock_tasks_for_case(case.id())?;
                let shifts = close_gap_after(&siblings, &task);
                let deleted_sessions = tx.delete_sessions_for_task(task_id)?;
                tx.delete_task(task_id)?;
                for (sibling_id, order_index) in shifts {
                    if let Some(sibling) = siblings.iter_mut().find(|sibling| sibling.id() == sibling_id) {
                        sibling.move_to(order_index, &*clock);
                        tx.update_task(sibling)?;
                    }
                }
                refresh_case_worked(tx, &mut case, &*clock)?;
                record(
                    tx,
                    &ActivityEntry::new(
                        case.id(),
                        actor.operator_id(),
                        ActivityAction::TaskDeleted,
                        &*clock,
                    )
                    .for_task(task_id)
                    .with_change(Some(task.title()), None::<String>)
                    .with_meta("sessions_deleted", deleted_sessions),
                )?;
                Ok(deleted_sessions)
            })
            .await?;

        tracing::info!(
            task_id = %task_id,
            operator_id = %actor.operator_id(),
            deleted_sessions,
            "task deleted"
        );
        Ok(())
    }

    /// Replaces the order of a case's tasks with `ordered`.
    ///
    /// Either every task moves to its position in `ordered` or nothing
    /// changes. Returns the tasks in their new order.
    ///
    /// # Errors
    ///
    /// - [`CaseworkError::Validation`] unless `ordered` is a permutation of
    ///   the case's task ids, or when the case no longer accepts work.
    /// - [`CaseworkError::NotFound`] when the case does not exist.
    /// - [`CaseworkError::Forbidden`] when the actor does not manage the case.
    #[tracing::instrument(skip(self, ordered), fields(case_id = %case_id))]
    pub async fn reorder_tasks(
        &self,
        case_id: CaseId,
        ordered: Vec<TaskId>,
        actor: Actor,
    ) -> CaseworkResult<Vec<Task>> {
        let clock = Arc::clone(&self.clock);
        let tasks = self
            .store
            .transaction(move |tx| {
                let case = lock_case(tx, case_id)?;
                case.ensure_accepts_work()?;
                case.authorize(&actor, "reorder the case's tasks")?;

                let mut tasks = tx.lock_tasks_for_case(case_id)?;
                let plan = plan_reorder(&tasks, &ordered)?;
                let previous_order = id_list(tasks.iter().map(Task::id));
                for (task_id, order_index) in plan {
                    if let Some(task) = tasks
                        .iter_mut()
                        .find(|task| task.id() == task_id && task.order_index() != order_index)
                    {
                        task.move_to(order_index, &*clock);
                        tx.update_task(task)?;
                    }
                }
                tasks.sort_by_key(Task::order_index);
                record(
                    tx,
                    &ActivityEntry::new(
                        case_id,
                        actor.operator_id(),
                        ActivityAction::TasksReordered,
                        &*clock,
                    )
                    .with_change(Some(previous_order), Some(id_list(ordered.iter().copied()))),
                )?;
                Ok(tasks)
            })
            .await?;

        tracing::info!(
            case_id = %case_id,
            operator_id = %actor.operator_id(),
            tasks = tasks.len(),
            "tasks reordered"
        );
        Ok(tasks)
    }

    /// Moves a task to `target` through the regular transition table.
    ///
    /// Completing a task closes its open sessions and refreshes worked time.
    ///
    /// # Errors
    ///
    /// - [`CaseworkError::DependencyNotSatisfied`] when starting a task
    ///   whose predecessor is not completed.
    /// - [`CaseworkError::InvalidTransition`] when the table forbids the move.
    /// - [`CaseworkError::NotFound`], [`CaseworkError::Forbidden`] or
    ///   [`CaseworkError::Validation`] as for the other task commands.
    #[tracing::instrument(skip(self), fields(task_id = %task_id, target = %target))]
    pub async fn transition_task(
        &self,
        task_id: TaskId,
        target: TaskState,
        actor: Actor,
    ) -> CaseworkResult<Task> {
        let clock = Arc::clone(&self.clock);
        let (task, previous) = self
            .store
            .transaction(move |tx| {
                let (mut case, mut task) = lock_task_with_case(tx, task_id)?;
                case.ensure_accepts_work()?;
                task.authorize(&actor, case.operator_id(), "change the state of")?;

                if target == TaskState::Completed {
                    let previous =
                        complete_task(tx, &mut case, &mut task, actor.operator_id(), &*clock)?;
                    return Ok((task, previous));
                }

                let dependency = match task.depends_on() {
                    Some(dependency_id) => tx.find_task(dependency_id)?,
                    None => None,
                };
                tracing::debug!(
                    task_id = %task_id,
                    dependency_state = ?dependency.as_ref().map(Task::state),
                    "evaluating task transition gates"
                );
                let previous = task.transition_to(target, dependency.as_ref(), &*clock)?;
                tx.update_task(&task)?;
                record(
                    tx,
                    &ActivityEntry::new(
                        case.id(),
                        actor.operator_id(),
                        ActivityAction::TaskStateChanged,
                        &*clock,
                    )
                    .for_task(task_id)
                    .with_change(Some(previous.as_str()), Some(target.as_str())),
                )?;
                Ok((task, previous))
            })
            .await?;

        tracing::info!(
            task_id = %task_id,
            operator_id = %actor.operator_id(),
            from = %previous,
            to = %task.state(),
            "task state changed"
        );
        Ok(task)
    }

    /// Reopens a completed task for rework.
    ///
    /// # Errors
    ///
    /// Returns [`CaseworkError::InvalidTransition`] unless the task is
    /// completed, plus the errors shared by every task command.
    #[tracing::instrument(skip(self), fields(task_id = %task_id))]
    pub async fn reopen_task(&self, task_id: TaskId, actor: Actor) -> CaseworkResult<Task> {
        let clock = Arc::clone(&self.clock);
        let task = self
            .store
            .transaction(move |tx| {
                let (case, mut task) = lock_task_with_case(tx, task_id)?;
                case.ensure_accepts_work()?;
                task.authorize(&actor, case.operator_id(), "reopen")?;

                task.reopen(&*clock)?;
                tx.update_task(&task)?;
                record(
                    tx,
                    &ActivityEntry::new(
                        case.id(),
                        actor.operator_id(),
                        ActivityAction::TaskStateChanged,
                        &*clock,
                    )
                    .for_task(task_id)
                    .with_change(
                        Some(TaskState::Completed.as_str()),
                        Some(TaskState::InProgress.as_str()),
                    )
                    .with_meta("reopened", true),
                )?;
                Ok(task)
            })
            .await?;

        tracing::info!(task_id = %task_id, operator_id = %actor.operator_id(), "task reopened");
        Ok(task)
    }

    /// Retrieves a task.
    ///
    /// # Errors
    ///
    /// Returns [`CaseworkError::NotFound`] when the task does not exist.
    pub async fn get_task(&self, task_id: TaskId) -> CaseworkResult<Task> {
        self.store
            .transaction(move |tx| {
                tx.find_task(task_id)?
                    .ok_or_else(|| CaseworkError::not_found(EntityKind::Task, task_id))
            })
            .await
    }

    /// Lists a case's tasks by order index.
    ///
    /// # Errors
    ///
    /// Returns [`CaseworkError::NotFound`] when the case does not exist.
    pub async fn list_case_tasks(&self, case_id: CaseId) -> CaseworkResult<Vec<Task>> {
        self.store
            .transaction(move |tx| {
                if tx.find_case(case_id)?.is_none() {
                    return Err(CaseworkError::not_found(EntityKind::Case, case_id));
                }
                Ok(tx.tasks_for_case(case_id)?)
            })
            .await
    }
}

/// Reads and locks a case, failing when it does not exist.
pub(crate) fn lock_case(tx: &mut dyn StoreTransaction, case_id: CaseId) -> CaseworkResult<Case> {
    tx.lock_case(case_id)?
        .ok_or_else(|| CaseworkError::not_found(EntityKind::Case, case_id))
}

/// Inserts a new task and logs its creation.
pub(crate) fn insert_task(
    tx: &mut dyn StoreTransaction,
    task: &Task,
    actor: &Actor,
    clock: &impl Clock,
) -> CaseworkResult<()> {
    tx.insert_task(task)?;
    let mut entry = ActivityEntry::new(
        task.case_id(),
        actor.operator_id(),
        ActivityAction::TaskCreated,
        clock,
    )
    .for_task(task.id())
    .with_change(None::<String>, Some(task.title()))
    .with_meta("order_index", task.order_index())
    .with_meta("mandatory", task.is_mandatory());
    if let Some(predecessor) = task.depends_on() {
        entry = entry.with_meta("depends_on", predecessor.to_string());
    }
    record(tx, &entry)
}

fn id_list(ids: impl Iterator<Item = TaskId>) -> String {
    ids.map(|id| id.to_string()).collect::<Vec<_>>().join(",")
}
