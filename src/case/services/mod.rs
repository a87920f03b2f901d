//! Application services for case lifecycle orchestration.

mod lifecycle;

pub use lifecycle::{CaseLifecycleService, CreateCaseRequest, TransitionCaseRequest};
