//! Domain model for time tracking.
//!
//! A [`TrackingSession`] covers the half-open [`Interval`] an operator spent
//! on one task. Open sessions have no end; an operator holds at most one of
//! them at a time. [`TrackingPolicy`] carries the duration rules applied when
//! an operator closes or records a session.

mod error;
mod ids;
mod interval;
mod policy;
mod session;

pub use error::ParseTrackingValueError;
pub use ids::SessionId;
pub use interval::Interval;
pub use policy::TrackingPolicy;
pub use session::{InterruptionKind, PersistedSessionData, SessionClosure, TrackingSession};
