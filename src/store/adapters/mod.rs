//! Adapter implementations of the casework store port.

pub mod memory;
pub mod postgres;
