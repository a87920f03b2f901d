//! Transactional persistence for cases, tasks, sessions and activity.
//!
//! Every top-level casework command runs inside a single store transaction:
//! the state machines read and lock what they need through
//! [`ports::StoreTransaction`], mutate, append activity, and either commit
//! everything or nothing.
//!
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod ports;
