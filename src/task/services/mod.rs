//! Application services for task lifecycle orchestration.

mod completion;
mod lifecycle;

pub(crate) use completion::force_complete_task;
pub(crate) use lifecycle::{insert_task, lock_case};
pub use lifecycle::{CreateTaskRequest, TaskLifecycleService};
