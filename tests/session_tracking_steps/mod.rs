//! Step definitions for session tracking scenarios.

mod given;
mod then;
mod when;
pub mod world;
