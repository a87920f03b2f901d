//! `PostgreSQL` adapter for the casework store.
//!
//! The schema lives in `migrations/`; apply it with Diesel's migration
//! tooling or by executing the `up.sql` files in order.

mod models;
mod schema;
mod store;

pub use store::{CaseworkPgPool, PostgresCaseworkStore};
