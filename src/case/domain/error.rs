//! Error types for parsing persisted case values.

use thiserror::Error;

/// Error returned while parsing case states from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown case state: {0}")]
pub struct ParseCaseStateError(pub String);

/// Error returned while parsing case priorities from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown case priority: {0}")]
pub struct ParseCasePriorityError(pub String);
