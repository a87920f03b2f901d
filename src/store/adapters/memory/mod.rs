//! In-memory casework store for tests and single-process use.

mod store;

pub use store::InMemoryCaseworkStore;
