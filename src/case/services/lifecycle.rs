//! Service layer for case creation and lifecycle transitions.

use crate::{
    activity::{
        domain::{ActivityAction, ActivityEntry},
        services::record,
    },
    actor::Actor,
    case::domain::{Case, CaseDetails, CaseId, CaseState},
    error::{CaseworkError, CaseworkResult, EntityKind},
    progress::CaseProgress,
    store::ports::CaseworkStore,
    task::{
        domain::{Task, TaskDraft, TaskId},
        services::{force_complete_task, insert_task, lock_case},
    },
    validation::optional_text,
};
use mockable::Clock;
use std::sync::Arc;

/// A task instantiated together with its case.
#[derive(Debug, Clone, PartialEq, Eq)]
struct InitialTask {
    draft: TaskDraft,
    predecessor_position: Option<usize>,
}

/// Request payload for opening a case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCaseRequest {
    details: CaseDetails,
    initial_state: CaseState,
    tasks: Vec<InitialTask>,
}

impl CreateCaseRequest {
    /// Creates a request for a draft case without tasks.
    #[must_use]
    pub const fn new(details: CaseDetails) -> Self {
        Self {
            details,
            initial_state: CaseState::Draft,
            tasks: Vec::new(),
        }
    }

    /// Opens the case directly in `Active`.
    #[must_use]
    pub const fn activated(mut self) -> Self {
        self.initial_state = CaseState::Active;
        self
    }

    /// Appends an initial task.
    #[must_use]
    pub fn with_task(mut self, draft: TaskDraft) -> Self {
        self.tasks.push(InitialTask {
            draft,
            predecessor_position: None,
        });
        self
    }

    /// Appends an initial task that depends on the initial task at
    /// `predecessor_position` (zero-based, must come earlier).
    #[must_use]
    pub fn with_dependent_task(mut self, draft: TaskDraft, predecessor_position: usize) -> Self {
        self.tasks.push(InitialTask {
            draft,
            predecessor_position: Some(predecessor_position),
        });
        self
    }
}

/// Request payload for moving a case to another state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionCaseRequest {
    /// Case to move.
    pub case_id: CaseId,
    /// Requested state.
    pub target: CaseState,
    /// Caller performing the move.
    pub actor: Actor,
    /// Optional note stored with the activity entry.
    pub note: Option<String>,
}

/// Case lifecycle orchestration service.
#[derive(Clone)]
pub struct CaseLifecycleService<S, C>
where
    S: CaseworkStore,
    C: Clock + Send + Sync + 'static,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> CaseLifecycleService<S, C>
where
    S: CaseworkStore,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new case lifecycle service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Opens a case with its initial tasks in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`CaseworkError::Validation`] when the case fields or a task
    /// title are invalid, or an initial task depends on a task that does
    /// not precede it.
    #[tracing::instrument(skip(self, request), fields(operator_id = %actor.operator_id()))]
    pub async fn create_case(&self, request: CreateCaseRequest, actor: Actor) -> CaseworkResult<Case> {
        let clock = Arc::clone(&self.clock);
        let CreateCaseRequest {
            details,
            initial_state,
            tasks,
        } = request;
        let opened = Case::open(details, initial_state, &*clock)?;

        let (case, task_count) = self
            .store
            .transaction(move |tx| {
                let case = opened;
                tx.insert_case(&case)?;
                record(
                    tx,
                    &ActivityEntry::new(
                        case.id(),
                        actor.operator_id(),
                        ActivityAction::CaseCreated,
                        &*clock,
                    )
                    .with_change(None::<String>, Some(case.state().as_str()))
                    .with_meta("title", case.title()),
                )?;

                let mut created: Vec<TaskId> = Vec::with_capacity(tasks.len());
                for (position, initial) in tasks.into_iter().enumerate() {
                    let draft = match initial.predecessor_position {
                        Some(predecessor) => {
                            let Some(predecessor_id) = created.get(predecessor).copied() else {
                                return Err(CaseworkError::validation(format!(
                                    "initial task {position} cannot depend on task {predecessor}"
                                )));
                            };
                            initial.draft.depending_on(predecessor_id)
                        }
                        None => initial.draft,
                    };
                    let order_index = u32::try_from(position)
                        .map_err(|_| CaseworkError::validation("too many initial tasks"))?;
                    let task = Task::create(case.id(), draft, order_index, &*clock)?;
                    insert_task(tx, &task, &actor, &*clock)?;
                    created.push(task.id());
                }
                Ok((case, created.len()))
            })
            .await?;

        tracing::info!(
            case_id = %case.id(),
            operator_id = %actor.operator_id(),
            state = %case.state(),
            tasks = task_count,
            "case created"
        );
        Ok(case)
    }

    /// Retrieves a case.
    ///
    /// # Errors
    ///
    /// Returns [`CaseworkError::NotFound`] when the case does not exist.
    pub async fn get_case(&self, case_id: CaseId) -> CaseworkResult<Case> {
        self.store
            .transaction(move |tx| {
                tx.find_case(case_id)?
                    .ok_or_else(|| CaseworkError::not_found(EntityKind::Case, case_id))
            })
            .await
    }

    /// Moves a case to another state.
    ///
    /// Completing a case force-completes every task that is not completed
    /// yet, closing their open sessions, and stamps the completion date the
    /// first time.
    ///
    /// # Errors
    ///
    /// - [`CaseworkError::Forbidden`] when the actor may not move the case.
    /// - [`CaseworkError::InvalidTransition`] when the table forbids the move.
    /// - [`CaseworkError::MandatoryTasksPending`] when completing with
    ///   mandatory tasks outstanding.
    /// - [`CaseworkError::NoActivityYet`] when moving an active case into
    ///   progress before any task started.
    /// - [`CaseworkError::NotFound`] when the case does not exist.
    #[tracing::instrument(
        skip(self, request),
        fields(case_id = %request.case_id, target = %request.target)
    )]
    pub async fn transition_case(&self, request: TransitionCaseRequest) -> CaseworkResult<Case> {
        let clock = Arc::clone(&self.clock);
        let TransitionCaseRequest {
            case_id,
            target,
            actor,
            note,
        } = request;
        let (case, previous, forced) = self
            .store
            .transaction(move |tx| {
                let mut case = lock_case(tx, case_id)?;
                let mut tasks = tx.lock_tasks_for_case(case_id)?;
                let progress = CaseProgress::from_tasks(&tasks);
                tracing::debug!(
                    case_id = %case_id,
                    from = %case.state(),
                    to = %target,
                    mandatory_outstanding = progress.mandatory_outstanding,
                    has_activity = progress.has_activity(),
                    "evaluating case transition gates"
                );
                let previous = case.transition_to(target, &actor, &progress, &*clock)?;

                let mut forced = Vec::new();
                if target == CaseState::Completed {
                    for task in &mut tasks {
                        if force_complete_task(tx, &mut case, task, actor.operator_id(), &*clock)?
                            .is_some()
                        {
                            forced.push(task.id());
                        }
                    }
                }
                tx.update_case(&case)?;

                let mut entry = ActivityEntry::new(
                    case_id,
                    actor.operator_id(),
                    ActivityAction::CaseStateChanged,
                    &*clock,
                )
                .with_change(Some(previous.as_str()), Some(target.as_str()))
                .with_meta("forced_tasks", forced.len());
                if let Some(text) = optional_text(note.as_deref()) {
                    entry = entry.with_meta("note", text);
                }
                record(tx, &entry)?;
                Ok((case, previous, forced))
            })
            .await?;

        if !forced.is_empty() {
            tracing::warn!(
                case_id = %case_id,
                operator_id = %actor.operator_id(),
                forced_tasks = forced.len(),
                "tasks force-completed with their case"
            );
        }
        tracing::info!(
            case_id = %case_id,
            operator_id = %actor.operator_id(),
            from = %previous,
            to = %case.state(),
            "case state changed"
        );
        Ok(case)
    }
}
