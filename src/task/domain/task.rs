//! Task aggregate root and its editable fields.

use super::{TaskId, TaskState};
use crate::{
    actor::{Actor, OperatorId},
    case::domain::CaseId,
    duration::WorkDuration,
    error::{CaseworkError, EntityKind},
    validation::{optional_text, required_text},
};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Fields supplied when a task is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    title: String,
    description: Option<String>,
    mandatory: bool,
    operator_id: Option<OperatorId>,
    estimated: Option<WorkDuration>,
    due_date: Option<NaiveDate>,
    depends_on: Option<TaskId>,
}

impl TaskDraft {
    /// Creates a draft with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            mandatory: false,
            operator_id: None,
            estimated: None,
            due_date: None,
            depends_on: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the task as mandatory for case completion.
    #[must_use]
    pub const fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Assigns the task to an operator.
    #[must_use]
    pub const fn assigned_to(mut self, operator_id: OperatorId) -> Self {
        self.operator_id = Some(operator_id);
        self
    }

    /// Sets the work estimate.
    #[must_use]
    pub const fn with_estimate(mut self, estimated: WorkDuration) -> Self {
        self.estimated = Some(estimated);
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn due_on(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Makes the task depend on a predecessor in the same case.
    #[must_use]
    pub const fn depending_on(mut self, predecessor: TaskId) -> Self {
        self.depends_on = Some(predecessor);
        self
    }

    /// Returns the requested predecessor, if any.
    #[must_use]
    pub const fn depends_on(&self) -> Option<TaskId> {
        self.depends_on
    }
}

/// Partial update of a task's editable fields.
///
/// `None` leaves a field untouched; `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New mandatory flag.
    pub mandatory: Option<bool>,
    /// New assignee.
    pub operator_id: Option<Option<OperatorId>>,
    /// New estimate.
    pub estimated: Option<Option<WorkDuration>>,
    /// New due date.
    pub due_date: Option<Option<NaiveDate>>,
    /// New predecessor.
    pub depends_on: Option<Option<TaskId>>,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    case_id: CaseId,
    title: String,
    description: Option<String>,
    state: TaskState,
    mandatory: bool,
    operator_id: Option<OperatorId>,
    order_index: u32,
    estimated: Option<WorkDuration>,
    worked: WorkDuration,
    due_date: Option<NaiveDate>,
    completed_at: Option<DateTime<Utc>>,
    depends_on: Option<TaskId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Owning case.
    pub case_id: CaseId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted lifecycle state.
    pub state: TaskState,
    /// Persisted mandatory flag.
    pub mandatory: bool,
    /// Persisted assignee.
    pub operator_id: Option<OperatorId>,
    /// Persisted order index.
    pub order_index: u32,
    /// Persisted estimate.
    pub estimated: Option<WorkDuration>,
    /// Persisted worked-time snapshot.
    pub worked: WorkDuration,
    /// Persisted due date.
    pub due_date: Option<NaiveDate>,
    /// Persisted completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted predecessor.
    pub depends_on: Option<TaskId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a task in `NotStarted` at the given position of its case.
    ///
    /// The draft's dependency is taken as-is; callers validate it against
    /// the case's task set first.
    ///
    /// # Errors
    ///
    /// Returns [`CaseworkError::Validation`] when the title is blank.
    pub fn create(
        case_id: CaseId,
        draft: TaskDraft,
        order_index: u32,
        clock: &impl Clock,
    ) -> Result<Self, CaseworkError> {
        let title = required_text(&draft.title, "task title")?;
        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            case_id,
            title,
            description: optional_text(draft.description.as_deref()),
            state: TaskState::NotStarted,
            mandatory: draft.mandatory,
            operator_id: draft.operator_id,
            order_index,
            estimated: draft.estimated,
            worked: WorkDuration::ZERO,
            due_date: draft.due_date,
            completed_at: None,
            depends_on: draft.depends_on,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            case_id: data.case_id,
            title: data.title,
            description: data.description,
            state: data.state,
            mandatory: data.mandatory,
            operator_id: data.operator_id,
            order_index: data.order_index,
            estimated: data.estimated,
            worked: data.worked,
            due_date: data.due_date,
            completed_at: data.completed_at,
            depends_on: data.depends_on,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning case.
    #[must_use]
    pub const fn case_id(&self) -> CaseId {
        self.case_id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// Returns `true` when the case cannot complete without this task.
    #[must_use]
    pub const fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    /// Returns the assigned operator, if any.
    #[must_use]
    pub const fn operator_id(&self) -> Option<OperatorId> {
        self.operator_id
    }

    /// Returns the display position within the case.
    #[must_use]
    pub const fn order_index(&self) -> u32 {
        self.order_index
    }

    /// Returns the estimate, if any.
    #[must_use]
    pub const fn estimated(&self) -> Option<WorkDuration> {
        self.estimated
    }

    /// Returns the sum of closed session durations.
    #[must_use]
    pub const fn worked(&self) -> WorkDuration {
        self.worked
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns when the task was completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the predecessor task, if any.
    #[must_use]
    pub const fn depends_on(&self) -> Option<TaskId> {
        self.depends_on
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Checks that `actor` may change this task.
    ///
    /// # Errors
    ///
    /// Returns [`CaseworkError::Forbidden`] unless the actor is elevated, the
    /// task's operator, or `case_operator`.
    pub fn authorize(
        &self,
        actor: &Actor,
        case_operator: Option<OperatorId>,
        action: &str,
    ) -> Result<(), CaseworkError> {
        if actor.may_act_for(&[self.operator_id, case_operator]) {
            return Ok(());
        }
        Err(CaseworkError::forbidden(
            actor.operator_id(),
            format!("{action} task {}", self.id),
        ))
    }

    /// Checks the dependency gate for starting work.
    ///
    /// `dependency` must be the task named by [`Task::depends_on`].
    ///
    /// # Errors
    ///
    /// Returns [`CaseworkError::DependencyNotSatisfied`] when the predecessor
    /// is not completed, or [`CaseworkError::NotFound`] when it is missing.
    pub fn ensure_dependency_met(&self, dependency: Option<&Self>) -> Result<(), CaseworkError> {
        let Some(dependency_id) = self.depends_on else {
            return Ok(());
        };
        match dependency {
            Some(predecessor) if predecessor.id == dependency_id => {
                if predecessor.state == TaskState::Completed {
                    Ok(())
                } else {
                    Err(CaseworkError::DependencyNotSatisfied {
                        task_id: self.id,
                        dependency_id,
                        dependency_state: predecessor.state,
                    })
                }
            }
            _ => Err(CaseworkError::not_found(EntityKind::Task, dependency_id)),
        }
    }

    /// Applies a regular lifecycle transition and returns the previous state.
    ///
    /// Moving to `InProgress` checks the dependency gate before the
    /// transition table. Moving to `Completed` stamps the completion date.
    ///
    /// # Errors
    ///
    /// Returns [`CaseworkError::DependencyNotSatisfied`] or
    /// [`CaseworkError::InvalidTransition`].
    pub fn transition_to(
        &mut self,
        target: TaskState,
        dependency: Option<&Self>,
        clock: &impl Clock,
    ) -> Result<TaskState, CaseworkError> {
        if target == TaskState::InProgress {
            self.ensure_dependency_met(dependency)?;
        }
        if !self.state.can_transition_to(target) {
            return Err(self.invalid_transition(target));
        }
        Ok(self.set_state(target, clock))
    }

    /// Completes the task regardless of dependency gates.
    ///
    /// Returns the previous state, or `None` when the task was already
    /// completed.
    pub fn force_complete(&mut self, clock: &impl Clock) -> Option<TaskState> {
        if self.state == TaskState::Completed {
            return None;
        }
        Some(self.set_state(TaskState::Completed, clock))
    }

    /// Reopens a completed task for rework and clears its completion date.
    ///
    /// # Errors
    ///
    /// Returns [`CaseworkError::InvalidTransition`] unless the task is
    /// completed.
    pub fn reopen(&mut self, clock: &impl Clock) -> Result<(), CaseworkError> {
        if self.state != TaskState::Completed {
            return Err(self.invalid_transition(TaskState::InProgress));
        }
        self.set_state(TaskState::InProgress, clock);
        Ok(())
    }

    /// Applies field changes and returns the names of the fields that
    /// actually changed.
    ///
    /// Dependency changes must already have been validated against the
    /// case's task set.
    ///
    /// # Errors
    ///
    /// Returns [`CaseworkError::Validation`] when the new title is blank or
    /// the task would depend on itself.
    pub fn apply_changes(
        &mut self,
        changes: TaskChanges,
        clock: &impl Clock,
    ) -> Result<Vec<&'static str>, CaseworkError> {
        let mut changed = Vec::new();
        if let Some(title) = changes.title {
            let normalized = required_text(&title, "task title")?;
            if normalized != self.title {
                self.title = normalized;
                changed.push("title");
            }
        }
        if let Some(description) = changes.description {
            let normalized = optional_text(description.as_deref());
            if normalized != self.description {
                self.description = normalized;
                changed.push("description");
            }
        }
        if let Some(depends_on) = changes.depends_on {
            if depends_on == Some(self.id) {
                return Err(CaseworkError::validation("a task cannot depend on itself"));
            }
            replace_if_changed(&mut self.depends_on, depends_on, "depends_on", &mut changed);
        }
        if let Some(mandatory) = changes.mandatory {
            replace_if_changed(&mut self.mandatory, mandatory, "mandatory", &mut changed);
        }
        if let Some(operator_id) = changes.operator_id {
            replace_if_changed(&mut self.operator_id, operator_id, "operator_id", &mut changed);
        }
        if let Some(estimated) = changes.estimated {
            replace_if_changed(&mut self.estimated, estimated, "estimated", &mut changed);
        }
        if let Some(due_date) = changes.due_date {
            replace_if_changed(&mut self.due_date, due_date, "due_date", &mut changed);
        }
        if !changed.is_empty() {
            self.touch(clock);
        }
        Ok(changed)
    }

    /// Moves the task to a new display position.
    pub(crate) fn move_to(&mut self, order_index: u32, clock: &impl Clock) {
        if self.order_index != order_index {
            self.order_index = order_index;
            self.touch(clock);
        }
    }

    /// Replaces the worked-time snapshot.
    pub(crate) fn record_worked(&mut self, worked: WorkDuration, clock: &impl Clock) {
        if self.worked != worked {
            self.worked = worked;
            self.touch(clock);
        }
    }

    fn set_state(&mut self, target: TaskState, clock: &impl Clock) -> TaskState {
        let previous = self.state;
        self.state = target;
        self.completed_at = match target {
            TaskState::Completed => Some(clock.utc()),
            TaskState::NotStarted | TaskState::InProgress | TaskState::Blocked => None,
        };
        self.touch(clock);
        previous
    }

    fn invalid_transition(&self, target: TaskState) -> CaseworkError {
        CaseworkError::InvalidTransition {
            entity: EntityKind::Task,
            from: self.state.as_str().to_owned(),
            to: target.as_str().to_owned(),
        }
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

fn replace_if_changed<T: PartialEq>(
    field: &mut T,
    new_value: T,
    name: &'static str,
    changed: &mut Vec<&'static str>,
) {
    if *field != new_value {
        *field = new_value;
        changed.push(name);
    }
}
