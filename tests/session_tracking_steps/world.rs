//! Shared world state for session tracking BDD scenarios.

use crate::test_helpers::Casework;
use casework::{
    CaseworkError, OperatorId,
    store::adapters::memory::InMemoryCaseworkStore,
    task::domain::TaskId,
    tracking::domain::{SessionId, TrackingSession},
};
use chrono::{DateTime, NaiveTime, Utc};
use mockable::Clock;
use rstest::fixture;
use std::{collections::HashMap, sync::Arc};

/// Scenario world for session tracking behaviour tests.
pub struct TrackingWorld {
    /// Services under test.
    pub casework: Casework<InMemoryCaseworkStore>,
    /// Operator tracking the time.
    pub operator: OperatorId,
    /// Task identifiers keyed by title.
    pub tasks: HashMap<String, TaskId>,
    /// Sessions opened in the scenario keyed by task title.
    pub sessions: HashMap<String, SessionId>,
    /// Session opened most recently.
    pub current_session: Option<SessionId>,
    /// Session the last start closed on the operator's behalf.
    pub auto_closed: Option<TrackingSession>,
    /// Error returned by the last command, if it failed.
    pub last_error: Option<CaseworkError>,
}

impl TrackingWorld {
    /// Creates a world over a fresh in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            casework: Casework::new(Arc::new(InMemoryCaseworkStore::new())),
            operator: OperatorId::new(),
            tasks: HashMap::new(),
            sessions: HashMap::new(),
            current_session: None,
            auto_closed: None,
            last_error: None,
        }
    }

    /// Looks up a task by title.
    ///
    /// # Errors
    ///
    /// Returns an error when no task has that title.
    pub fn task(&self, title: &str) -> eyre::Result<TaskId> {
        self.tasks
            .get(title)
            .copied()
            .ok_or_else(|| eyre::eyre!("unknown task {title}"))
    }

    /// Converts an `hh:mm` value to an instant on the clock's current day.
    ///
    /// # Errors
    ///
    /// Returns an error when `time` is not a valid `hh:mm` value.
    pub fn at(&self, time: &str) -> eyre::Result<DateTime<Utc>> {
        let parsed = NaiveTime::parse_from_str(time, "%H:%M")?;
        Ok(self
            .casework
            .clock
            .utc()
            .date_naive()
            .and_time(parsed)
            .and_utc())
    }

    /// Stores the outcome of a command.
    pub fn record<T>(&mut self, result: Result<T, CaseworkError>) {
        self.last_error = result.err();
    }
}

impl Default for TrackingWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TrackingWorld {
    TrackingWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
