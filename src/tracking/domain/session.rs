//! Tracking session aggregate.

use super::{Interval, ParseTrackingValueError, SessionId};
use crate::{
    actor::OperatorId,
    duration::WorkDuration,
    error::{CaseworkError, SessionConflict},
    task::domain::TaskId,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an operator interrupted their work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptionKind {
    /// Personal break.
    Break,
    /// Internal meeting.
    Meeting,
    /// Incoming or outgoing call.
    PhoneCall,
    /// Switched to an urgent client request.
    ClientRequest,
    /// Any other reason.
    Other,
}

impl InterruptionKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Break => "break",
            Self::Meeting => "meeting",
            Self::PhoneCall => "phone_call",
            Self::ClientRequest => "client_request",
            Self::Other => "other",
        }
    }
}

impl TryFrom<&str> for InterruptionKind {
    type Error = ParseTrackingValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "break" => Ok(Self::Break),
            "meeting" => Ok(Self::Meeting),
            "phone_call" => Ok(Self::PhoneCall),
            "client_request" => Ok(Self::ClientRequest),
            "other" => Ok(Self::Other),
            _ => Err(ParseTrackingValueError::interruption(value)),
        }
    }
}

/// How a session came to be closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionClosure {
    /// The operator paused work.
    Paused,
    /// The operator stopped work.
    Stopped,
    /// Closed because the operator started another session.
    AutoClosed,
    /// Closed because its task was completed.
    TaskCompleted,
    /// Recorded after the fact as a closed interval.
    Manual,
}

impl SessionClosure {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Paused => "paused",
            Self::Stopped => "stopped",
            Self::AutoClosed => "auto_closed",
            Self::TaskCompleted => "task_completed",
            Self::Manual => "manual",
        }
    }

    /// Annotation stored on sessions the system closes on the operator's
    /// behalf.
    #[must_use]
    pub const fn annotation(self) -> Option<&'static str> {
        match self {
            Self::AutoClosed => Some("auto-closed for new session"),
            Self::TaskCompleted => Some("closed on task completion"),
            Self::Paused | Self::Stopped | Self::Manual => None,
        }
    }
}

impl TryFrom<&str> for SessionClosure {
    type Error = ParseTrackingValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "paused" => Ok(Self::Paused),
            "stopped" => Ok(Self::Stopped),
            "auto_closed" => Ok(Self::AutoClosed),
            "task_completed" => Ok(Self::TaskCompleted),
            "manual" => Ok(Self::Manual),
            _ => Err(ParseTrackingValueError::closure(value)),
        }
    }
}

impl fmt::Display for SessionClosure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bounded, attributed interval of tracked work on one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingSession {
    id: SessionId,
    task_id: TaskId,
    operator_id: OperatorId,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    manual: bool,
    interruption: Option<InterruptionKind>,
    closure: Option<SessionClosure>,
    note: Option<String>,
}

/// Parameter object for reconstructing a persisted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSessionData {
    /// Persisted session identifier.
    pub id: SessionId,
    /// Task the time was tracked against.
    pub task_id: TaskId,
    /// Operator who tracked the time.
    pub operator_id: OperatorId,
    /// Persisted start.
    pub started_at: DateTime<Utc>,
    /// Persisted end, `None` while open.
    pub ended_at: Option<DateTime<Utc>>,
    /// Whether the session was entered manually.
    pub manual: bool,
    /// Persisted interruption kind.
    pub interruption: Option<InterruptionKind>,
    /// Persisted closure reason.
    pub closure: Option<SessionClosure>,
    /// Persisted note.
    pub note: Option<String>,
}

impl TrackingSession {
    /// Opens a session starting now.
    #[must_use]
    pub fn start(task_id: TaskId, operator_id: OperatorId, clock: &impl Clock) -> Self {
        Self {
            id: SessionId::new(),
            task_id,
            operator_id,
            started_at: clock.utc(),
            ended_at: None,
            manual: false,
            interruption: None,
            closure: None,
            note: None,
        }
    }

    /// Records an already-closed session entered after the fact.
    #[must_use]
    pub fn manual(
        task_id: TaskId,
        operator_id: OperatorId,
        interval: Interval,
        note: Option<String>,
    ) -> Self {
        Self {
            id: SessionId::new(),
            task_id,
            operator_id,
            started_at: interval.start(),
            ended_at: Some(interval.end()),
            manual: true,
            interruption: None,
            closure: Some(SessionClosure::Manual),
            note,
        }
    }

    /// Reconstructs a session from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedSessionData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            operator_id: data.operator_id,
            started_at: data.started_at,
            ended_at: data.ended_at,
            manual: data.manual,
            interruption: data.interruption,
            closure: data.closure,
            note: data.note,
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the tracked task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the owning operator.
    #[must_use]
    pub const fn operator_id(&self) -> OperatorId {
        self.operator_id
    }

    /// Returns the start instant.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns the end instant, `None` while open.
    #[must_use]
    pub const fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Returns `true` when the session was entered manually.
    #[must_use]
    pub const fn is_manual(&self) -> bool {
        self.manual
    }

    /// Returns the interruption kind recorded on pause.
    #[must_use]
    pub const fn interruption(&self) -> Option<InterruptionKind> {
        self.interruption
    }

    /// Returns how the session was closed.
    #[must_use]
    pub const fn closure(&self) -> Option<SessionClosure> {
        self.closure
    }

    /// Returns the note, if any.
    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Returns `true` while the session has no end.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Returns the duration of a closed session.
    #[must_use]
    pub fn duration(&self) -> Option<WorkDuration> {
        self.ended_at
            .map(|ended_at| WorkDuration::between(self.started_at, ended_at))
    }

    /// Returns the time the session occupies as of `now`; open sessions
    /// extend to `now`. Returns `None` for an empty span.
    #[must_use]
    pub fn occupied_until(&self, now: DateTime<Utc>) -> Option<Interval> {
        Interval::new(self.started_at, self.ended_at.unwrap_or(now)).ok()
    }

    /// Checks that `operator_id` may close this session.
    ///
    /// # Errors
    ///
    /// Returns [`CaseworkError::Forbidden`] when another operator owns the
    /// session, or [`CaseworkError::SessionConflict`] when it is closed.
    pub fn ensure_closable_by(&self, operator_id: OperatorId) -> Result<(), CaseworkError> {
        if self.operator_id != operator_id {
            return Err(CaseworkError::forbidden(
                operator_id,
                format!("close session {} owned by another operator", self.id),
            ));
        }
        if !self.is_open() {
            return Err(SessionConflict::AlreadyClosed(self.id).into());
        }
        Ok(())
    }

    /// Returns the length the session would have if closed at `end`.
    #[must_use]
    pub fn elapsed_until(&self, end: DateTime<Utc>) -> WorkDuration {
        WorkDuration::between(self.started_at, end)
    }

    /// Closes the session on an interruption.
    pub(crate) fn pause(
        &mut self,
        end: DateTime<Utc>,
        reason: Option<InterruptionKind>,
        note: Option<String>,
    ) -> WorkDuration {
        self.interruption = reason;
        self.close(end, SessionClosure::Paused, note)
    }

    /// Closes the session at the end of work.
    pub(crate) fn stop(&mut self, end: DateTime<Utc>, note: Option<String>) -> WorkDuration {
        self.close(end, SessionClosure::Stopped, note)
    }

    /// Closes the session on the operator's behalf with the closure's
    /// annotation.
    pub(crate) fn close_on_behalf(
        &mut self,
        end: DateTime<Utc>,
        closure: SessionClosure,
    ) -> WorkDuration {
        self.close(end, closure, closure.annotation().map(str::to_owned))
    }

    fn close(
        &mut self,
        end: DateTime<Utc>,
        closure: SessionClosure,
        note: Option<String>,
    ) -> WorkDuration {
        let ended_at = end.max(self.started_at);
        self.ended_at = Some(ended_at);
        self.closure = Some(closure);
        if note.is_some() {
            self.note = note;
        }
        WorkDuration::between(self.started_at, ended_at)
    }
}
