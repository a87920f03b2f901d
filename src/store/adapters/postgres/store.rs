//! `PostgreSQL` store implementation.

use super::{
    models::{
        ActivityRow, CaseRow, NewActivityRow, NewCaseRow, NewSessionRow, NewTaskRow, SessionRow,
        TaskRow,
    },
    schema::{activity_entries, cases, tasks, tracking_sessions},
};
use crate::{
    activity::domain::{ActivityAction, ActivityEntry, ActivityId, PersistedActivityData},
    actor::OperatorId,
    case::domain::{
        Case, CaseDetails, CaseId, CasePriority, CaseState, ClientId, PersistedCaseData,
        TemplateId,
    },
    duration::WorkDuration,
    error::{CaseworkError, CaseworkResult},
    store::ports::{CaseworkStore, StoreError, StoreResult, StoreTransaction},
    task::domain::{PersistedTaskData, Task, TaskId, TaskState},
    tracking::domain::{
        InterruptionKind, PersistedSessionData, SessionClosure, SessionId, TrackingSession,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by the casework store.
pub type CaseworkPgPool = Pool<ConnectionManager<PgConnection>>;

const ONE_OPEN_SESSION_INDEX: &str = "idx_tracking_sessions_one_open";

/// `PostgreSQL`-backed casework store.
///
/// Each transaction runs on a blocking worker thread inside a database
/// transaction. Row locks use `SELECT ... FOR UPDATE`; an operator's
/// open-session slot is guarded by a transaction-scoped advisory lock and
/// backed by a partial unique index.
#[derive(Debug, Clone)]
pub struct PostgresCaseworkStore {
    pool: CaseworkPgPool,
}

impl PostgresCaseworkStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: CaseworkPgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CaseworkStore for PostgresCaseworkStore {
    async fn transaction<T, F>(&self, work: F) -> CaseworkResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn StoreTransaction) -> CaseworkResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut pooled = pool.get().map_err(StoreError::persistence)?;
            let connection: &mut PgConnection = &mut pooled;
            connection
                .transaction::<T, TransactionAbort, _>(|conn| {
                    let mut transaction = PgTransaction { connection: conn };
                    work(&mut transaction).map_err(TransactionAbort::Work)
                })
                .map_err(CaseworkError::from)
        })
        .await
        .map_err(StoreError::persistence)?
    }
}

/// Reason a database transaction was rolled back.
enum TransactionAbort {
    Work(CaseworkError),
    Database(DieselError),
}

impl From<DieselError> for TransactionAbort {
    fn from(err: DieselError) -> Self {
        Self::Database(err)
    }
}

impl From<TransactionAbort> for CaseworkError {
    fn from(abort: TransactionAbort) -> Self {
        match abort {
            TransactionAbort::Work(err) => err,
            TransactionAbort::Database(err) => StoreError::persistence(err).into(),
        }
    }
}

struct PgTransaction<'conn> {
    connection: &'conn mut PgConnection,
}

impl StoreTransaction for PgTransaction<'_> {
    fn insert_case(&mut self, case: &Case) -> StoreResult<()> {
        diesel::insert_into(cases::table)
            .values(&case_to_row(case))
            .execute(self.connection)
            .map_err(|err| duplicate_or_persistence(err, "case", case.id()))?;
        Ok(())
    }

    fn update_case(&mut self, case: &Case) -> StoreResult<()> {
        let updated = diesel::update(cases::table.find(case.id().into_inner()))
            .set(&case_to_row(case))
            .execute(self.connection)
            .map_err(StoreError::persistence)?;
        ensure_updated(updated, "case", case.id())
    }

    fn find_case(&mut self, id: CaseId) -> StoreResult<Option<Case>> {
        cases::table
            .find(id.into_inner())
            .select(CaseRow::as_select())
            .first::<CaseRow>(self.connection)
            .optional()
            .map_err(StoreError::persistence)?
            .map(row_to_case)
            .transpose()
    }

    fn lock_case(&mut self, id: CaseId) -> StoreResult<Option<Case>> {
        cases::table
            .find(id.into_inner())
            .select(CaseRow::as_select())
            .for_update()
            .first::<CaseRow>(self.connection)
            .optional()
            .map_err(StoreError::persistence)?
            .map(row_to_case)
            .transpose()
    }

    fn insert_task(&mut self, task: &Task) -> StoreResult<()> {
        let row = task_to_row(task)?;
        diesel::insert_into(tasks::table)
            .values(&row)
            .execute(self.connection)
            .map_err(|err| duplicate_or_persistence(err, "task", task.id()))?;
        Ok(())
    }

    fn update_task(&mut self, task: &Task) -> StoreResult<()> {
        let row = task_to_row(task)?;
        let updated = diesel::update(tasks::table.find(task.id().into_inner()))
            .set(&row)
            .execute(self.connection)
            .map_err(StoreError::persistence)?;
        ensure_updated(updated, "task", task.id())
    }

    fn delete_task(&mut self, id: TaskId) -> StoreResult<()> {
        let deleted = diesel::delete(tasks::table.find(id.into_inner()))
            .execute(self.connection)
            .map_err(StoreError::persistence)?;
        ensure_updated(deleted, "task", id)
    }

    fn find_task(&mut self, id: TaskId) -> StoreResult<Option<Task>> {
        tasks::table
            .find(id.into_inner())
            .select(TaskRow::as_select())
            .first::<TaskRow>(self.connection)
            .optional()
            .map_err(StoreError::persistence)?
            .map(row_to_task)
            .transpose()
    }

    fn lock_task(&mut self, id: TaskId) -> StoreResult<Option<Task>> {
        tasks::table
            .find(id.into_inner())
            .select(TaskRow::as_select())
            .for_update()
            .first::<TaskRow>(self.connection)
            .optional()
            .map_err(StoreError::persistence)?
            .map(row_to_task)
            .transpose()
    }

    fn tasks_for_case(&mut self, case_id: CaseId) -> StoreResult<Vec<Task>> {
        tasks::table
            .filter(tasks::case_id.eq(case_id.into_inner()))
            .order((tasks::order_index.asc(), tasks::created_at.asc(), tasks::id.asc()))
            .select(TaskRow::as_select())
            .load::<TaskRow>(self.connection)
            .map_err(StoreError::persistence)?
            .into_iter()
            .map(row_to_task)
            .collect()
    }

    fn lock_tasks_for_case(&mut self, case_id: CaseId) -> StoreResult<Vec<Task>> {
        tasks::table
            .filter(tasks::case_id.eq(case_id.into_inner()))
            .order((tasks::order_index.asc(), tasks::created_at.asc(), tasks::id.asc()))
            .select(TaskRow::as_select())
            .for_update()
            .load::<TaskRow>(self.connection)
            .map_err(StoreError::persistence)?
            .into_iter()
            .map(row_to_task)
            .collect()
    }

    fn dependents_of(&mut self, id: TaskId) -> StoreResult<Vec<TaskId>> {
        let ids = tasks::table
            .filter(tasks::depends_on.eq(id.into_inner()))
            .order(tasks::id.asc())
            .select(tasks::id)
            .load::<uuid::Uuid>(self.connection)
            .map_err(StoreError::persistence)?;
        Ok(ids.into_iter().map(TaskId::from_uuid).collect())
    }

    fn lock_operator_slot(&mut self, operator_id: OperatorId) -> StoreResult<()> {
        diesel::sql_query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind::<diesel::sql_types::Text, _>(operator_id.to_string())
            .execute(self.connection)
            .map_err(StoreError::persistence)?;
        Ok(())
    }

    fn insert_session(&mut self, session: &TrackingSession) -> StoreResult<()> {
        diesel::insert_into(tracking_sessions::table)
            .values(&session_to_row(session))
            .execute(self.connection)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                    if is_one_open_session_violation(info.as_ref()) =>
                {
                    StoreError::duplicate("open session", session.operator_id())
                }
                other => duplicate_or_persistence(other, "session", session.id()),
            })?;
        Ok(())
    }

    fn update_session(&mut self, session: &TrackingSession) -> StoreResult<()> {
        let updated = diesel::update(tracking_sessions::table.find(session.id().into_inner()))
            .set(&session_to_row(session))
            .execute(self.connection)
            .map_err(StoreError::persistence)?;
        ensure_updated(updated, "session", session.id())
    }

    fn find_session(&mut self, id: SessionId) -> StoreResult<Option<TrackingSession>> {
        tracking_sessions::table
            .find(id.into_inner())
            .select(SessionRow::as_select())
            .first::<SessionRow>(self.connection)
            .optional()
            .map_err(StoreError::persistence)?
            .map(row_to_session)
            .transpose()
    }

    fn lock_session(&mut self, id: SessionId) -> StoreResult<Option<TrackingSession>> {
        tracking_sessions::table
            .find(id.into_inner())
            .select(SessionRow::as_select())
            .for_update()
            .first::<SessionRow>(self.connection)
            .optional()
            .map_err(StoreError::persistence)?
            .map(row_to_session)
            .transpose()
    }

    fn open_session_for_operator(
        &mut self,
        operator_id: OperatorId,
    ) -> StoreResult<Option<TrackingSession>> {
        tracking_sessions::table
            .filter(tracking_sessions::operator_id.eq(operator_id.into_inner()))
            .filter(tracking_sessions::ended_at.is_null())
            .select(SessionRow::as_select())
            .first::<SessionRow>(self.connection)
            .optional()
            .map_err(StoreError::persistence)?
            .map(row_to_session)
            .transpose()
    }

    fn sessions_for_task(&mut self, task_id: TaskId) -> StoreResult<Vec<TrackingSession>> {
        tracking_sessions::table
            .filter(tracking_sessions::task_id.eq(task_id.into_inner()))
            .order((tracking_sessions::started_at.asc(), tracking_sessions::id.asc()))
            .select(SessionRow::as_select())
            .load::<SessionRow>(self.connection)
            .map_err(StoreError::persistence)?
            .into_iter()
            .map(row_to_session)
            .collect()
    }

    fn sessions_for_operator_between(
        &mut self,
        operator_id: OperatorId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<Vec<TrackingSession>> {
        tracking_sessions::table
            .filter(tracking_sessions::operator_id.eq(operator_id.into_inner()))
            .filter(tracking_sessions::started_at.lt(to))
            .filter(
                tracking_sessions::ended_at
                    .is_null()
                    .or(tracking_sessions::ended_at.assume_not_null().gt(from)),
            )
            .order((tracking_sessions::started_at.asc(), tracking_sessions::id.asc()))
            .select(SessionRow::as_select())
            .load::<SessionRow>(self.connection)
            .map_err(StoreError::persistence)?
            .into_iter()
            .map(row_to_session)
            .collect()
    }

    fn delete_sessions_for_task(&mut self, task_id: TaskId) -> StoreResult<usize> {
        diesel::delete(
            tracking_sessions::table.filter(tracking_sessions::task_id.eq(task_id.into_inner())),
        )
        .execute(self.connection)
        .map_err(StoreError::persistence)
    }

    fn append_activity(&mut self, entry: &ActivityEntry) -> StoreResult<()> {
        diesel::insert_into(activity_entries::table)
            .values(&activity_to_row(entry))
            .execute(self.connection)
            .map_err(|err| duplicate_or_persistence(err, "activity entry", entry.id()))?;
        Ok(())
    }

    fn activity_for_case(&mut self, case_id: CaseId) -> StoreResult<Vec<ActivityEntry>> {
        activity_entries::table
            .filter(activity_entries::case_id.eq(case_id.into_inner()))
            .order(activity_entries::seq.asc())
            .select(ActivityRow::as_select())
            .load::<ActivityRow>(self.connection)
            .map_err(StoreError::persistence)?
            .into_iter()
            .map(row_to_activity)
            .collect()
    }
}

fn ensure_updated(rows: usize, entity: &'static str, id: impl ToString) -> StoreResult<()> {
    if rows == 0 {
        return Err(StoreError::missing(entity, id));
    }
    Ok(())
}

fn duplicate_or_persistence(err: DieselError, entity: &'static str, id: impl ToString) -> StoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            StoreError::duplicate(entity, id)
        }
        other => StoreError::persistence(other),
    }
}

fn is_one_open_session_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == ONE_OPEN_SESSION_INDEX)
}

fn case_to_row(case: &Case) -> NewCaseRow {
    NewCaseRow {
        id: case.id().into_inner(),
        client_id: case.client_id().into_inner(),
        case_type: case.case_type().to_owned(),
        title: case.title().to_owned(),
        state: case.state().as_str().to_owned(),
        priority: case.priority().as_str().to_owned(),
        due_date: case.due_date(),
        estimated_secs: case.estimated().map(WorkDuration::as_seconds),
        worked_secs: case.worked().as_seconds(),
        completed_at: case.completed_at(),
        template_id: case.template_id().map(TemplateId::into_inner),
        operator_id: case.operator_id().map(OperatorId::into_inner),
        created_at: case.created_at(),
        updated_at: case.updated_at(),
    }
}

fn row_to_case(row: CaseRow) -> StoreResult<Case> {
    let state = CaseState::try_from(row.state.as_str()).map_err(StoreError::persistence)?;
    let priority = CasePriority::try_from(row.priority.as_str()).map_err(StoreError::persistence)?;
    Ok(Case::from_persisted(PersistedCaseData {
        id: CaseId::from_uuid(row.id),
        details: CaseDetails {
            client_id: ClientId::from_uuid(row.client_id),
            case_type: row.case_type,
            title: row.title,
            priority,
            due_date: row.due_date,
            estimated: row.estimated_secs.map(WorkDuration::from_seconds),
            template_id: row.template_id.map(TemplateId::from_uuid),
            operator_id: row.operator_id.map(OperatorId::from_uuid),
        },
        state,
        worked: WorkDuration::from_seconds(row.worked_secs),
        completed_at: row.completed_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn task_to_row(task: &Task) -> StoreResult<NewTaskRow> {
    let order_index = i32::try_from(task.order_index()).map_err(StoreError::persistence)?;
    Ok(NewTaskRow {
        id: task.id().into_inner(),
        case_id: task.case_id().into_inner(),
        title: task.title().to_owned(),
        description: task.description().map(str::to_owned),
        state: task.state().as_str().to_owned(),
        mandatory: task.is_mandatory(),
        operator_id: task.operator_id().map(OperatorId::into_inner),
        order_index,
        estimated_secs: task.estimated().map(WorkDuration::as_seconds),
        worked_secs: task.worked().as_seconds(),
        due_date: task.due_date(),
        completed_at: task.completed_at(),
        depends_on: task.depends_on().map(TaskId::into_inner),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn row_to_task(row: TaskRow) -> StoreResult<Task> {
    let state = TaskState::try_from(row.state.as_str()).map_err(StoreError::persistence)?;
    let order_index = u32::try_from(row.order_index).map_err(StoreError::persistence)?;
    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        case_id: CaseId::from_uuid(row.case_id),
        title: row.title,
        description: row.description,
        state,
        mandatory: row.mandatory,
        operator_id: row.operator_id.map(OperatorId::from_uuid),
        order_index,
        estimated: row.estimated_secs.map(WorkDuration::from_seconds),
        worked: WorkDuration::from_seconds(row.worked_secs),
        due_date: row.due_date,
        completed_at: row.completed_at,
        depends_on: row.depends_on.map(TaskId::from_uuid),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn session_to_row(session: &TrackingSession) -> NewSessionRow {
    NewSessionRow {
        id: session.id().into_inner(),
        task_id: session.task_id().into_inner(),
        operator_id: session.operator_id().into_inner(),
        started_at: session.started_at(),
        ended_at: session.ended_at(),
        duration_secs: session.duration().map(WorkDuration::as_seconds),
        manual: session.is_manual(),
        interruption: session.interruption().map(|kind| kind.as_str().to_owned()),
        closure: session.closure().map(|closure| closure.as_str().to_owned()),
        note: session.note().map(str::to_owned),
    }
}

fn row_to_session(row: SessionRow) -> StoreResult<TrackingSession> {
    let interruption = row
        .interruption
        .as_deref()
        .map(InterruptionKind::try_from)
        .transpose()
        .map_err(StoreError::persistence)?;
    let closure = row
        .closure
        .as_deref()
        .map(SessionClosure::try_from)
        .transpose()
        .map_err(StoreError::persistence)?;
    Ok(TrackingSession::from_persisted(PersistedSessionData {
        id: SessionId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        operator_id: OperatorId::from_uuid(row.operator_id),
        started_at: row.started_at,
        ended_at: row.ended_at,
        manual: row.manual,
        interruption,
        closure,
        note: row.note,
    }))
}

fn activity_to_row(entry: &ActivityEntry) -> NewActivityRow {
    NewActivityRow {
        id: entry.id().into_inner(),
        case_id: entry.case_id().into_inner(),
        task_id: entry.task_id().map(TaskId::into_inner),
        operator_id: entry.operator_id().into_inner(),
        action: entry.action().as_str().to_owned(),
        old_value: entry.old_value().map(str::to_owned),
        new_value: entry.new_value().map(str::to_owned),
        metadata: entry.metadata().clone(),
        recorded_at: entry.recorded_at(),
    }
}

fn row_to_activity(row: ActivityRow) -> StoreResult<ActivityEntry> {
    let action = ActivityAction::try_from(row.action.as_str()).map_err(StoreError::persistence)?;
    Ok(ActivityEntry::from_persisted(PersistedActivityData {
        id: ActivityId::from_uuid(row.id),
        case_id: CaseId::from_uuid(row.case_id),
        task_id: row.task_id.map(TaskId::from_uuid),
        operator_id: OperatorId::from_uuid(row.operator_id),
        action,
        old_value: row.old_value,
        new_value: row.new_value,
        metadata: row.metadata,
        recorded_at: row.recorded_at,
    }))
}
