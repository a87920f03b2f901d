//! Domain model for task lifecycle management.
//!
//! Tasks belong to a case, carry an optional single predecessor in the same
//! case, and hold a display position. Lifecycle moves go through
//! [`Task::transition_to`]; ordering and dependency rules over the whole
//! case live in [`ordering`].

mod error;
mod ids;
pub mod ordering;
mod state;
mod task;

pub use error::ParseTaskStateError;
pub use ids::TaskId;
pub use state::TaskState;
pub use task::{PersistedTaskData, Task, TaskChanges, TaskDraft};
