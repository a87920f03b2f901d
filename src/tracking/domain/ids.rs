//! Identifier types for the tracking domain.

use crate::ids::uuid_id;

uuid_id! {
    /// Unique identifier for a tracking session.
    SessionId
}
