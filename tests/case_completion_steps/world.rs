//! Shared world state for case completion BDD scenarios.

use crate::test_helpers::Casework;
use casework::{
    CaseworkError, OperatorId,
    case::domain::Case,
    store::adapters::memory::InMemoryCaseworkStore,
    task::domain::TaskId,
};
use rstest::fixture;
use std::{collections::HashMap, sync::Arc};

/// Scenario world for case completion behaviour tests.
pub struct CaseWorld {
    /// Services under test.
    pub casework: Casework<InMemoryCaseworkStore>,
    /// Operator managing the case.
    pub operator: OperatorId,
    /// Case opened by the background step.
    pub case: Option<Case>,
    /// Task identifiers keyed by title.
    pub tasks: HashMap<String, TaskId>,
    /// Error returned by the last command, if it failed.
    pub last_error: Option<CaseworkError>,
}

impl CaseWorld {
    /// Creates a world over a fresh in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            casework: Casework::new(Arc::new(InMemoryCaseworkStore::new())),
            operator: OperatorId::new(),
            case: None,
            tasks: HashMap::new(),
            last_error: None,
        }
    }

    /// Returns the case opened by the scenario.
    ///
    /// # Errors
    ///
    /// Returns an error when no case has been opened yet.
    pub fn case(&self) -> eyre::Result<&Case> {
        self.case
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no case opened in scenario world"))
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

    /// Stores the outcome of a command.
    pub fn record<T>(&mut self, result: Result<T, CaseworkError>) {
        self.last_error = result.err();
    }
}

impl Default for CaseWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> CaseWorld {
    CaseWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
