//! Identifier types for the activity domain.

use crate::ids::uuid_id;

uuid_id! {
    /// Unique identifier for an activity entry.
    ActivityId
}
