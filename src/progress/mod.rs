//! Progress aggregation for cases.
//!
//! Progress is a pure function of a case's tasks: [`CaseProgress::from_tasks`]
//! computes it, and [`ProgressService`] exposes it read-only to callers. The
//! case state machine evaluates the same aggregate inside its own
//! transaction to gate completion.

mod aggregate;
mod service;

pub use aggregate::CaseProgress;
pub use service::ProgressService;
