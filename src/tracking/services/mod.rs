//! Time-tracking services.

mod closing;
mod rollup;
mod sessions;

pub(crate) use closing::close_open_sessions_for_task;
pub(crate) use rollup::{refresh_case_worked, refresh_worked_time};
pub(crate) use sessions::lock_task_with_case;
#[cfg(test)]
pub(crate) use closing::close_if_open;
#[cfg(test)]
pub(crate) use sessions::lock_session_for_close;
pub use sessions::{ManualEntryRequest, PauseSessionRequest, SessionStart, TimeTrackingService};
