//! Unit tests for the tracking context.
