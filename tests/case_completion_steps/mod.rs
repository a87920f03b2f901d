//! Step definitions for case completion scenarios.

mod given;
mod then;
mod when;
pub mod world;
