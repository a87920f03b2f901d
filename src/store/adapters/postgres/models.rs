//! Diesel row models for casework persistence.

use super::schema::{activity_entries, cases, tasks, tracking_sessions};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for case records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cases)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CaseRow {
    pub id: uuid::Uuid,
    pub client_id: uuid::Uuid,
    pub case_type: String,
    pub title: String,
    pub state: String,
    pub priority: String,
    pub due_date: Option<NaiveDate>,
    pub estimated_secs: Option<i64>,
    pub worked_secs: i64,
    pub completed_at: Option<DateTime<Utc>>,
    pub template_id: Option<uuid::Uuid>,
    pub operator_id: Option<uuid::Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert and update model for case records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = cases)]
#[diesel(treat_none_as_null = true)]
pub struct NewCaseRow {
    pub id: uuid::Uuid,
    pub client_id: uuid::Uuid,
    pub case_type: String,
    pub title: String,
    pub state: String,
    pub priority: String,
    pub due_date: Option<NaiveDate>,
    pub estimated_secs: Option<i64>,
    pub worked_secs: i64,
    pub completed_at: Option<DateTime<Utc>>,
    pub template_id: Option<uuid::Uuid>,
    pub operator_id: Option<uuid::Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    pub id: uuid::Uuid,
    pub case_id: uuid::Uuid,
    pub title: String,
    pub description: Option<String>,
    pub state: String,
    pub mandatory: bool,
    pub operator_id: Option<uuid::Uuid>,
    pub order_index: i32,
    pub estimated_secs: Option<i64>,
    pub worked_secs: i64,
    pub due_date: Option<NaiveDate>,
    pub completed_at: Option<DateTime<Utc>>,
    pub depends_on: Option<uuid::Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert and update model for task records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct NewTaskRow {
    pub id: uuid::Uuid,
    pub case_id: uuid::Uuid,
    pub title: String,
    pub description: Option<String>,
    pub state: String,
    pub mandatory: bool,
    pub operator_id: Option<uuid::Uuid>,
    pub order_index: i32,
    pub estimated_secs: Option<i64>,
    pub worked_secs: i64,
    pub due_date: Option<NaiveDate>,
    pub completed_at: Option<DateTime<Utc>>,
    pub depends_on: Option<uuid::Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query result row for tracking sessions.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tracking_sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SessionRow {
    pub id: uuid::Uuid,
    pub task_id: uuid::Uuid,
    pub operator_id: uuid::Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub manual: bool,
    pub interruption: Option<String>,
    pub closure: Option<String>,
    pub note: Option<String>,
}

/// Insert and update model for tracking sessions.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tracking_sessions)]
#[diesel(treat_none_as_null = true)]
pub struct NewSessionRow {
    pub id: uuid::Uuid,
    pub task_id: uuid::Uuid,
    pub operator_id: uuid::Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_secs: Option<i64>,
    pub manual: bool,
    pub interruption: Option<String>,
    pub closure: Option<String>,
    pub note: Option<String>,
}

/// Query result row for activity entries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = activity_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ActivityRow {
    pub id: uuid::Uuid,
    pub case_id: uuid::Uuid,
    pub task_id: Option<uuid::Uuid>,
    pub operator_id: uuid::Uuid,
    pub action: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub metadata: Value,
    pub recorded_at: DateTime<Utc>,
}

/// Insert model for activity entries; the append sequence is assigned by
/// the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = activity_entries)]
pub struct NewActivityRow {
    pub id: uuid::Uuid,
    pub case_id: uuid::Uuid,
    pub task_id: Option<uuid::Uuid>,
    pub operator_id: uuid::Uuid,
    pub action: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub metadata: Value,
    pub recorded_at: DateTime<Utc>,
}
