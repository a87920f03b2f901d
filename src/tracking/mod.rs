//! Time tracking against tasks.
//!
//! Operators open sessions on tasks, pause or stop them, or enter closed
//! sessions after the fact. Every change refreshes the worked-time rollups
//! of the task and its case.

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
