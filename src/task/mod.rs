//! Task lifecycle management.
//!
//! Tasks break a case down into units of work. Each task may depend on one
//! earlier task of the same case and cannot start until that predecessor is
//! completed. Completing a task closes the tracking sessions still open on
//! it.
//!
//! - Domain types in [`domain`]
//! - Orchestration services in [`services`]

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
