//! Errors raised by store adapters.

use std::sync::Arc;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by store implementations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A record with the same identifier already exists.
    #[error("duplicate {entity} identifier: {id}")]
    Duplicate {
        /// Entity table name.
        entity: &'static str,
        /// Conflicting identifier.
        id: String,
    },

    /// An update or delete targeted a record that does not exist.
    #[error("{entity} {id} is missing from the store")]
    Missing {
        /// Entity table name.
        entity: &'static str,
        /// Identifier that was targeted.
        id: String,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Builds a [`StoreError::Duplicate`].
    pub fn duplicate(entity: &'static str, id: impl ToString) -> Self {
        Self::Duplicate {
            entity,
            id: id.to_string(),
        }
    }

    /// Builds a [`StoreError::Missing`].
    pub fn missing(entity: &'static str, id: impl ToString) -> Self {
        Self::Missing {
            entity,
            id: id.to_string(),
        }
    }
}
