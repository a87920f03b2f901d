//! Kinds of audited actions.

use super::ParseActivityActionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of mutation recorded in the activity log.
///
/// The storage codes are the ones reporting tools already query, so they
/// are fixed and never derived from the variant names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityAction {
    /// A case was created.
    #[serde(rename = "creazione_pratica")]
    CaseCreated,
    /// A case changed state.
    #[serde(rename = "cambio_stato")]
    CaseStateChanged,
    /// A task was created.
    #[serde(rename = "creazione_task")]
    TaskCreated,
    /// Task fields were edited.
    #[serde(rename = "modifica_task")]
    TaskUpdated,
    /// A task changed state.
    #[serde(rename = "cambio_stato_task")]
    TaskStateChanged,
    /// A task was completed by its case's completion.
    #[serde(rename = "completamento_forzato")]
    TaskForceCompleted,
    /// A task was deleted.
    #[serde(rename = "eliminazione_task")]
    TaskDeleted,
    /// The tasks of a case were reordered.
    #[serde(rename = "riordino_task")]
    TasksReordered,
    /// A tracking session was started.
    #[serde(rename = "avvio_sessione")]
    SessionStarted,
    /// A tracking session was paused.
    #[serde(rename = "pausa_sessione")]
    SessionPaused,
    /// A tracking session was stopped.
    #[serde(rename = "stop_sessione")]
    SessionStopped,
    /// A tracking session was closed by the system.
    #[serde(rename = "chiusura_automatica")]
    SessionAutoClosed,
    /// A closed session was entered manually.
    #[serde(rename = "inserimento_manuale")]
    ManualEntry,
}

impl ActivityAction {
    /// Every action kind.
    pub const ALL: [Self; 13] = [
        Self::CaseCreated,
        Self::CaseStateChanged,
        Self::TaskCreated,
        Self::TaskUpdated,
        Self::TaskStateChanged,
        Self::TaskForceCompleted,
        Self::TaskDeleted,
        Self::TasksReordered,
        Self::SessionStarted,
        Self::SessionPaused,
        Self::SessionStopped,
        Self::SessionAutoClosed,
        Self::ManualEntry,
    ];

    /// Returns the storage code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CaseCreated => "creazione_pratica",
            Self::CaseStateChanged => "cambio_stato",
            Self::TaskCreated => "creazione_task",
            Self::TaskUpdated => "modifica_task",
            Self::TaskStateChanged => "cambio_stato_task",
            Self::TaskForceCompleted => "completamento_forzato",
            Self::TaskDeleted => "eliminazione_task",
            Self::TasksReordered => "riordino_task",
            Self::SessionStarted => "avvio_sessione",
            Self::SessionPaused => "pausa_sessione",
            Self::SessionStopped => "stop_sessione",
            Self::SessionAutoClosed => "chiusura_automatica",
            Self::ManualEntry => "inserimento_manuale",
        }
    }
}

impl TryFrom<&str> for ActivityAction {
    type Error = ParseActivityActionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == normalized)
            .ok_or_else(|| ParseActivityActionError(value.to_owned()))
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
