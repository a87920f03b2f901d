//! Activity entries.

use super::{ActivityAction, ActivityId};
use crate::{actor::OperatorId, case::domain::CaseId, task::domain::TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One immutable record in a case's activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    id: ActivityId,
    case_id: CaseId,
    task_id: Option<TaskId>,
    operator_id: OperatorId,
    action: ActivityAction,
    old_value: Option<String>,
    new_value: Option<String>,
    metadata: Value,
    recorded_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted activity entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedActivityData {
    /// Persisted entry identifier.
    pub id: ActivityId,
    /// Case the entry belongs to.
    pub case_id: CaseId,
    /// Task the entry concerns, if any.
    pub task_id: Option<TaskId>,
    /// Operator who performed the action.
    pub operator_id: OperatorId,
    /// Persisted action kind.
    pub action: ActivityAction,
    /// Value before the change.
    pub old_value: Option<String>,
    /// Value after the change.
    pub new_value: Option<String>,
    /// Structured details.
    pub metadata: Value,
    /// When the entry was written.
    pub recorded_at: DateTime<Utc>,
}

impl ActivityEntry {
    /// Starts an entry for `action` performed by `operator_id` on a case.
    #[must_use]
    pub fn new(
        case_id: CaseId,
        operator_id: OperatorId,
        action: ActivityAction,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: ActivityId::new(),
            case_id,
            task_id: None,
            operator_id,
            action,
            old_value: None,
            new_value: None,
            metadata: Value::Object(Map::new()),
            recorded_at: clock.utc(),
        }
    }

    /// Attaches the task the action concerns.
    #[must_use]
    pub const fn for_task(mut self, task_id: TaskId) -> Self {
        self.task_id = Some(task_id);
        self
    }

    /// Records the before and after values.
    #[must_use]
    pub fn with_change(
        mut self,
        old_value: Option<impl Into<String>>,
        new_value: Option<impl Into<String>>,
    ) -> Self {
        self.old_value = old_value.map(Into::into);
        self.new_value = new_value.map(Into::into);
        self
    }

    /// Adds one metadata key.
    #[must_use]
    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        if let Value::Object(map) = &mut self.metadata {
            map.insert(key.to_owned(), value.into());
        }
        self
    }

    /// Reconstructs an entry from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedActivityData) -> Self {
        Self {
            id: data.id,
            case_id: data.case_id,
            task_id: data.task_id,
            operator_id: data.operator_id,
            action: data.action,
            old_value: data.old_value,
            new_value: data.new_value,
            metadata: data.metadata,
            recorded_at: data.recorded_at,
        }
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> ActivityId {
        self.id
    }

    /// Returns the case the entry belongs to.
    #[must_use]
    pub const fn case_id(&self) -> CaseId {
        self.case_id
    }

    /// Returns the task the entry concerns, if any.
    #[must_use]
    pub const fn task_id(&self) -> Option<TaskId> {
        self.task_id
    }

    /// Returns the acting operator.
    #[must_use]
    pub const fn operator_id(&self) -> OperatorId {
        self.operator_id
    }

    /// Returns the action kind.
    #[must_use]
    pub const fn action(&self) -> ActivityAction {
        self.action
    }

    /// Returns the value before the change.
    #[must_use]
    pub fn old_value(&self) -> Option<&str> {
        self.old_value.as_deref()
    }

    /// Returns the value after the change.
    #[must_use]
    pub fn new_value(&self) -> Option<&str> {
        self.new_value.as_deref()
    }

    /// Returns the structured details.
    #[must_use]
    pub const fn metadata(&self) -> &Value {
        &self.metadata
    }

    /// Returns when the entry was written.
    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}
