//! Error types for parsing persisted activity values.

use thiserror::Error;

/// Error returned while parsing activity action codes from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown activity action: {0}")]
pub struct ParseActivityActionError(pub String);
