//! Error types for parsing persisted tracking values.

use thiserror::Error;

/// Error returned while parsing interruption kinds or closure reasons from
/// persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {field}: {value}")]
pub struct ParseTrackingValueError {
    /// Name of the column being parsed.
    pub field: &'static str,
    /// Offending value.
    pub value: String,
}

impl ParseTrackingValueError {
    pub(crate) fn interruption(value: &str) -> Self {
        Self {
            field: "interruption kind",
            value: value.to_owned(),
        }
    }

    pub(crate) fn closure(value: &str) -> Self {
        Self {
            field: "session closure",
            value: value.to_owned(),
        }
    }
}
