//! Unit tests for the case context.
