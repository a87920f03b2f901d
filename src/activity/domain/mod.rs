//! Domain model for the append-only activity log.

mod action;
mod entry;
mod error;
mod ids;

pub use action::ActivityAction;
pub use entry::{ActivityEntry, PersistedActivityData};
pub use error::ParseActivityActionError;
pub use ids::ActivityId;
