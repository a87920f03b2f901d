//! In-memory store implementation.
//!
//! Transactions run one at a time against a private copy of the cases, tasks
//! and sessions; the copy replaces the shared state only when the work
//! succeeds. Activity is kept outside the copy: entries appended by a
//! transaction are buffered and added to the shared log on commit.

use crate::{
    activity::domain::ActivityEntry,
    actor::OperatorId,
    case::domain::{Case, CaseId},
    error::CaseworkResult,
    store::ports::{CaseworkStore, StoreError, StoreResult, StoreTransaction},
    task::domain::{Task, TaskId},
    tracking::domain::{SessionId, TrackingSession},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

/// Thread-safe in-memory casework store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCaseworkStore {
    state: Arc<Mutex<StoreState>>,
    activity: Arc<Mutex<Vec<ActivityEntry>>>,
    fail_activity_appends: Arc<AtomicBool>,
}

#[derive(Debug, Clone, Default)]
struct StoreState {
    cases: HashMap<CaseId, Case>,
    tasks: HashMap<TaskId, Task>,
    sessions: HashMap<SessionId, TrackingSession>,
}

impl InMemoryCaseworkStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent activity append fail with a persistence
    /// error, or restores normal behaviour.
    pub fn fail_activity_appends(&self, fail: bool) {
        self.fail_activity_appends.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CaseworkStore for InMemoryCaseworkStore {
    async fn transaction<T, F>(&self, work: F) -> CaseworkResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn StoreTransaction) -> CaseworkResult<T> + Send + 'static,
    {
        let mut shared = self.state.lock().map_err(poisoned)?;
        let mut log = self.activity.lock().map_err(poisoned)?;
        let mut transaction = InMemoryTransaction {
            state: shared.clone(),
            committed_activity: &log,
            pending_activity: Vec::new(),
            fail_activity_appends: self.fail_activity_appends.load(Ordering::SeqCst),
        };
        let output = work(&mut transaction)?;
        let InMemoryTransaction {
            state,
            pending_activity,
            ..
        } = transaction;
        *shared = state;
        log.extend(pending_activity);
        Ok(output)
    }
}

fn poisoned<G>(err: std::sync::PoisonError<G>) -> StoreError {
    StoreError::persistence(std::io::Error::other(err.to_string()))
}

struct InMemoryTransaction<'log> {
    state: StoreState,
    committed_activity: &'log [ActivityEntry],
    pending_activity: Vec<ActivityEntry>,
    fail_activity_appends: bool,
}

impl InMemoryTransaction<'_> {
    fn sorted_tasks(&self, case_id: CaseId) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .state
            .tasks
            .values()
            .filter(|task| task.case_id() == case_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|task| (task.order_index(), task.created_at(), task.id()));
        tasks
    }
}

impl StoreTransaction for InMemoryTransaction<'_> {
    fn insert_case(&mut self, case: &Case) -> StoreResult<()> {
        if self.state.cases.contains_key(&case.id()) {
            return Err(StoreError::duplicate("case", case.id()));
        }
        self.state.cases.insert(case.id(), case.clone());
        Ok(())
    }

    fn update_case(&mut self, case: &Case) -> StoreResult<()> {
        let stored = self
            .state
            .cases
            .get_mut(&case.id())
            .ok_or_else(|| StoreError::missing("case", case.id()))?;
        *stored = case.clone();
        Ok(())
    }

    fn find_case(&mut self, id: CaseId) -> StoreResult<Option<Case>> {
        Ok(self.state.cases.get(&id).cloned())
    }

    fn lock_case(&mut self, id: CaseId) -> StoreResult<Option<Case>> {
        self.find_case(id)
    }

    fn insert_task(&mut self, task: &Task) -> StoreResult<()> {
        if self.state.tasks.contains_key(&task.id()) {
            return Err(StoreError::duplicate("task", task.id()));
        }
        if !self.state.cases.contains_key(&task.case_id()) {
            return Err(StoreError::missing("case", task.case_id()));
        }
        self.state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    fn update_task(&mut self, task: &Task) -> StoreResult<()> {
        let stored = self
            .state
            .tasks
            .get_mut(&task.id())
            .ok_or_else(|| StoreError::missing("task", task.id()))?;
        *stored = task.clone();
        Ok(())
    }

    fn delete_task(&mut self, id: TaskId) -> StoreResult<()> {
        self.state
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::missing("task", id))
    }

    fn find_task(&mut self, id: TaskId) -> StoreResult<Option<Task>> {
        Ok(self.state.tasks.get(&id).cloned())
    }

    fn lock_task(&mut self, id: TaskId) -> StoreResult<Option<Task>> {
        self.find_task(id)
    }

    fn tasks_for_case(&mut self, case_id: CaseId) -> StoreResult<Vec<Task>> {
        Ok(self.sorted_tasks(case_id))
    }

    fn lock_tasks_for_case(&mut self, case_id: CaseId) -> StoreResult<Vec<Task>> {
        Ok(self.sorted_tasks(case_id))
    }

    fn dependents_of(&mut self, id: TaskId) -> StoreResult<Vec<TaskId>> {
        let mut dependents: Vec<TaskId> = self
            .state
            .tasks
            .values()
            .filter(|task| task.depends_on() == Some(id))
            .map(Task::id)
            .collect();
        dependents.sort_unstable();
        Ok(dependents)
    }

    fn lock_operator_slot(&mut self, _operator_id: OperatorId) -> StoreResult<()> {
        Ok(())
    }

    fn insert_session(&mut self, session: &TrackingSession) -> StoreResult<()> {
        if self.state.sessions.contains_key(&session.id()) {
            return Err(StoreError::duplicate("session", session.id()));
        }
        let operator_has_open_session = session.is_open()
            && self
                .state
                .sessions
                .values()
                .any(|other| other.operator_id() == session.operator_id() && other.is_open());
        if operator_has_open_session {
            return Err(StoreError::duplicate("open session", session.operator_id()));
        }
        self.state.sessions.insert(session.id(), session.clone());
        Ok(())
    }

    fn update_session(&mut self, session: &TrackingSession) -> StoreResult<()> {
        let stored = self
            .state
            .sessions
            .get_mut(&session.id())
            .ok_or_else(|| StoreError::missing("session", session.id()))?;
        *stored = session.clone();
        Ok(())
    }

    fn find_session(&mut self, id: SessionId) -> StoreResult<Option<TrackingSession>> {
        Ok(self.state.sessions.get(&id).cloned())
    }

    fn lock_session(&mut self, id: SessionId) -> StoreResult<Option<TrackingSession>> {
        self.find_session(id)
    }

    fn open_session_for_operator(
        &mut self,
        operator_id: OperatorId,
    ) -> StoreResult<Option<TrackingSession>> {
        Ok(self
            .state
            .sessions
            .values()
            .find(|session| session.operator_id() == operator_id && session.is_open())
            .cloned())
    }

    fn sessions_for_task(&mut self, task_id: TaskId) -> StoreResult<Vec<TrackingSession>> {
        let mut sessions: Vec<TrackingSession> = self
            .state
            .sessions
            .values()
            .filter(|session| session.task_id() == task_id)
            .cloned()
            .collect();
        sessions.sort_by_key(|session| (session.started_at(), session.id()));
        Ok(sessions)
    }

    fn sessions_for_operator_between(
        &mut self,
        operator_id: OperatorId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<Vec<TrackingSession>> {
        let mut sessions: Vec<TrackingSession> = self
            .state
            .sessions
            .values()
            .filter(|session| {
                session.operator_id() == operator_id
                    && session.started_at() < to
                    && session.ended_at().is_none_or(|ended_at| ended_at > from)
            })
            .cloned()
            .collect();
        sessions.sort_by_key(|session| (session.started_at(), session.id()));
        Ok(sessions)
    }

    fn delete_sessions_for_task(&mut self, task_id: TaskId) -> StoreResult<usize> {
        let before = self.state.sessions.len();
        self.state
            .sessions
            .retain(|_, session| session.task_id() != task_id);
        Ok(before.saturating_sub(self.state.sessions.len()))
    }

    fn append_activity(&mut self, entry: &ActivityEntry) -> StoreResult<()> {
        if self.fail_activity_appends {
            return Err(StoreError::persistence(std::io::Error::other(
                "activity log unavailable",
            )));
        }
        self.pending_activity.push(entry.clone());
        Ok(())
    }

    fn activity_for_case(&mut self, case_id: CaseId) -> StoreResult<Vec<ActivityEntry>> {
        Ok(self
            .committed_activity
            .iter()
            .chain(&self.pending_activity)
            .filter(|entry| entry.case_id() == case_id)
            .cloned()
            .collect())
    }
}
