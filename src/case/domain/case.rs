//! Case aggregate root.

use super::{CaseId, CasePriority, CaseState, ClientId, TemplateId};
use crate::{
    actor::{Actor, OperatorId},
    duration::WorkDuration,
    error::{CaseworkError, EntityKind},
    progress::CaseProgress,
    validation::required_text,
};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Descriptive fields supplied when a case is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseDetails {
    /// Client the case is billed to.
    pub client_id: ClientId,
    /// Free-form case type (practice area, service line).
    pub case_type: String,
    /// Case title.
    pub title: String,
    /// Case priority.
    pub priority: CasePriority,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// Optional estimate of the total work.
    pub estimated: Option<WorkDuration>,
    /// Template the case was instantiated from, if any.
    pub template_id: Option<TemplateId>,
    /// Operator responsible for the case.
    pub operator_id: Option<OperatorId>,
}

/// Case aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    id: CaseId,
    client_id: ClientId,
    case_type: String,
    title: String,
    state: CaseState,
    priority: CasePriority,
    due_date: Option<NaiveDate>,
    estimated: Option<WorkDuration>,
    worked: WorkDuration,
    completed_at: Option<DateTime<Utc>>,
    template_id: Option<TemplateId>,
    operator_id: Option<OperatorId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted case aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedCaseData {
    /// Persisted case identifier.
    pub id: CaseId,
    /// Persisted descriptive fields.
    pub details: CaseDetails,
    /// Persisted lifecycle state.
    pub state: CaseState,
    /// Persisted worked-time rollup.
    pub worked: WorkDuration,
    /// Persisted completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Case {
    /// Opens a new case in `initial_state`.
    ///
    /// # Errors
    ///
    /// Returns [`CaseworkError::Validation`] when the client reference is nil,
    /// the title or case type is blank, or `initial_state` is neither `Draft`
    /// nor `Active`.
    pub fn open(
        details: CaseDetails,
        initial_state: CaseState,
        clock: &impl Clock,
    ) -> Result<Self, CaseworkError> {
        if !matches!(initial_state, CaseState::Draft | CaseState::Active) {
            return Err(CaseworkError::validation(format!(
                "a case cannot be opened in state {initial_state}"
            )));
        }
        if details.client_id.into_inner().is_nil() {
            return Err(CaseworkError::validation("a case needs a client reference"));
        }
        let title = required_text(&details.title, "case title")?;
        let case_type = required_text(&details.case_type, "case type")?;
        let timestamp = clock.utc();

        Ok(Self {
            id: CaseId::new(),
            client_id: details.client_id,
            case_type,
            title,
            state: initial_state,
            priority: details.priority,
            due_date: details.due_date,
            estimated: details.estimated,
            worked: WorkDuration::ZERO,
            completed_at: None,
            template_id: details.template_id,
            operator_id: details.operator_id,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a case from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedCaseData) -> Self {
        let PersistedCaseData {
            id,
            details,
            state,
            worked,
            completed_at,
            created_at,
            updated_at,
        } = data;
        Self {
            id,
            client_id: details.client_id,
            case_type: details.case_type,
            title: details.title,
            state,
            priority: details.priority,
            due_date: details.due_date,
            estimated: details.estimated,
            worked,
            completed_at,
            template_id: details.template_id,
            operator_id: details.operator_id,
            created_at,
            updated_at,
        }
    }

    /// Returns the case identifier.
    #[must_use]
    pub const fn id(&self) -> CaseId {
        self.id
    }

    /// Returns the client reference.
    #[must_use]
    pub const fn client_id(&self) -> ClientId {
        self.client_id
    }

    /// Returns the case type.
    #[must_use]
    pub fn case_type(&self) -> &str {
        &self.case_type
    }

    /// Returns the case title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> CaseState {
        self.state
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> CasePriority {
        self.priority
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the estimated work, if any.
    #[must_use]
    pub const fn estimated(&self) -> Option<WorkDuration> {
        self.estimated
    }

    /// Returns the worked-time rollup over every task of the case.
    #[must_use]
    pub const fn worked(&self) -> WorkDuration {
        self.worked
    }

    /// Returns when the case was first completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the template reference, if any.
    #[must_use]
    pub const fn template_id(&self) -> Option<TemplateId> {
        self.template_id
    }

    /// Returns the responsible operator, if any.
    #[must_use]
    pub const fn operator_id(&self) -> Option<OperatorId> {
        self.operator_id
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

    /// Returns the descriptive fields of the case.
    #[must_use]
    pub fn details(&self) -> CaseDetails {
        CaseDetails {
            client_id: self.client_id,
            case_type: self.case_type.clone(),
            title: self.title.clone(),
            priority: self.priority,
            due_date: self.due_date,
            estimated: self.estimated,
            template_id: self.template_id,
            operator_id: self.operator_id,
        }
    }

    /// Checks that `actor` may manage this case's tasks and sessions.
    ///
    /// # Errors
    ///
    /// Returns [`CaseworkError::Forbidden`] unless the actor is elevated or
    /// the responsible operator.
    pub fn authorize(&self, actor: &Actor, action: &str) -> Result<(), CaseworkError> {
        if actor.may_act_for(&[self.operator_id]) {
            return Ok(());
        }
        Err(CaseworkError::forbidden(actor.operator_id(), action))
    }

    /// Checks that tasks of this case may still change.
    ///
    /// # Errors
    ///
    /// Returns [`CaseworkError::Validation`] once the case is completed,
    /// invoiced or archived.
    pub fn ensure_accepts_work(&self) -> Result<(), CaseworkError> {
        if self.state.accepts_work() {
            return Ok(());
        }
        Err(CaseworkError::validation(format!(
            "case {} is {} and no longer accepts changes",
            self.id, self.state
        )))
    }

    /// Moves the case to `target` after checking authorisation, the
    /// transition table and the progress gates.
    ///
    /// Returns the previous state. Reaching `Completed` stamps the completion
    /// date the first time only.
    ///
    /// # Errors
    ///
    /// - [`CaseworkError::Forbidden`] when the actor may not perform the move;
    ///   invoicing always requires elevated privileges.
    /// - [`CaseworkError::InvalidTransition`] when the table forbids the move.
    /// - [`CaseworkError::MandatoryTasksPending`] when completing with
    ///   mandatory tasks outstanding.
    /// - [`CaseworkError::NoActivityYet`] when moving from `Active` to
    ///   `InProgress` before any task started.
    pub fn transition_to(
        &mut self,
        target: CaseState,
        actor: &Actor,
        progress: &CaseProgress,
        clock: &impl Clock,
    ) -> Result<CaseState, CaseworkError> {
        let authorised = if target == CaseState::Invoiced {
            actor.is_elevated()
        } else {
            actor.may_act_for(&[self.operator_id])
        };
        if !authorised {
            return Err(CaseworkError::forbidden(
                actor.operator_id(),
                format!("move case {} to {target}", self.id),
            ));
        }

        if !self.state.can_transition_to(target) {
            return Err(CaseworkError::InvalidTransition {
                entity: EntityKind::Case,
                from: self.state.as_str().to_owned(),
                to: target.as_str().to_owned(),
            });
        }

        match target {
            CaseState::Completed if progress.mandatory_outstanding > 0 => {
                return Err(CaseworkError::MandatoryTasksPending {
                    case_id: self.id,
                    outstanding: progress.mandatory_outstanding,
                });
            }
            CaseState::InProgress
                if self.state == CaseState::Active && !progress.has_activity() =>
            {
                return Err(CaseworkError::NoActivityYet { case_id: self.id });
            }
            _ => {}
        }

        let previous = self.state;
        let now = clock.utc();
        self.state = target;
        if target == CaseState::Completed && self.completed_at.is_none() {
            self.completed_at = Some(now);
        }
        self.updated_at = now;
        Ok(previous)
    }

    /// Replaces the worked-time rollup.
    pub(crate) fn record_worked(&mut self, worked: WorkDuration, clock: &impl Clock) {
        if self.worked != worked {
            self.worked = worked;
            self.updated_at = clock.utc();
        }
    }
}
