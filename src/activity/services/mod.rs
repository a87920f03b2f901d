//! Activity log services.

mod log;

pub(crate) use log::record;
pub use log::ActivityLogService;
