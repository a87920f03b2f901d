//! Port contracts for casework persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by casework services.

mod error;
mod store;

pub use error::{StoreError, StoreResult};
pub use store::{CaseworkStore, StoreTransaction};

#[cfg(test)]
pub use store::MockStoreTransaction;
