//! Identifier types for the task domain.

use crate::ids::uuid_id;

uuid_id! {
    /// Unique identifier for a task.
    TaskId
}
