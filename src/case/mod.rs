//! Case lifecycle management.
//!
//! Cases are opened (optionally with an initial task list), moved through
//! their lifecycle by authorised actors, and completed only once every
//! mandatory task is done. Completing a case force-completes its remaining
//! tasks. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Orchestration services in [`services`]

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
