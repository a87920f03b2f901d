//! Shared test helpers for `PostgreSQL` integration tests.

use crate::test_helpers::Casework;
use casework::store::adapters::postgres::{CaseworkPgPool, PostgresCaseworkStore};
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use std::sync::Arc;
use uuid::Uuid;

/// Environment variable naming the test database.
pub const DATABASE_URL_VAR: &str = "CASEWORK_TEST_DATABASE_URL";

/// SQL creating the casework tables.
pub const CREATE_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_casework_tables/up.sql");

/// Services over a store confined to a private schema.
pub struct PgWorld {
    pub casework: Casework<PostgresCaseworkStore>,
    pub schema: String,
}

#[derive(Debug)]
struct SearchPath(String);

impl CustomizeConnection<PgConnection, diesel::r2d2::Error> for SearchPath {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!("SET search_path TO {}", self.0))
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Creates a fresh schema with the casework tables and wires the services
/// to it. Returns `None` when no test database is configured.
///
/// # Errors
///
/// Returns an error if connecting, migrating, or building the pool fails.
pub fn setup() -> eyre::Result<Option<PgWorld>> {
    let Ok(url) = std::env::var(DATABASE_URL_VAR) else {
        return Ok(None);
    };
    let schema = format!("casework_test_{}", Uuid::new_v4().simple());

    let mut conn = PgConnection::establish(&url)?;
    conn.batch_execute(&format!(
        "CREATE SCHEMA {schema}; SET search_path TO {schema};"
    ))?;
    conn.batch_execute(CREATE_SCHEMA_SQL)?;

    let pool: CaseworkPgPool = Pool::builder()
        .max_size(8)
        .connection_customizer(Box::new(SearchPath(schema.clone())))
        .build(ConnectionManager::<PgConnection>::new(url))?;
    let store = Arc::new(PostgresCaseworkStore::new(pool));
    Ok(Some(PgWorld {
        casework: Casework::new(store),
        schema,
    }))
}

/// Drops the schema created by [`setup`].
///
/// # Errors
///
/// Returns an error if the schema cannot be dropped.
pub fn teardown(schema: &str) -> eyre::Result<()> {
    let url = std::env::var(DATABASE_URL_VAR)?;
    let mut conn = PgConnection::establish(&url)?;
    conn.batch_execute(&format!("DROP SCHEMA {schema} CASCADE"))?;
    Ok(())
}
