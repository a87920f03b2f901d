//! Casework: billable case management core.
//!
//! A case moves through a lifecycle and is broken down into dependent tasks
//! that operators track time against. This crate provides the three coupled
//! state machines behind that workflow and keeps an append-only activity
//! log of every change.
//!
//! # Architecture
//!
//! Casework follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence
//! - **Adapters**: In-memory and `PostgreSQL` implementations of the ports
//! - **Services**: Async orchestration, one store transaction per command
//!
//! # Modules
//!
//! - [`case`]: Case lifecycle gated by task progress
//! - [`task`]: Task lifecycle, dependencies and ordering
//! - [`tracking`]: Time-tracking sessions and worked-time rollups
//! - [`progress`]: Completion metrics derived from a case's tasks
//! - [`activity`]: Append-only audit log
//! - [`store`]: Transactional persistence port and adapters
//! - [`config`]: Layered configuration loading

pub mod activity;
pub mod actor;
pub mod case;
pub mod config;
pub mod duration;
pub mod error;
mod ids;
pub mod progress;
pub mod store;
pub mod task;
pub mod tracking;
mod validation;

#[cfg(test)]
mod test_support;

pub use actor::{Actor, ActorRole, OperatorId};
pub use config::CaseworkConfig;
pub use duration::WorkDuration;
pub use error::{CaseworkError, CaseworkResult};
