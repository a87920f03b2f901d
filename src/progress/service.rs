//! Read-only progress queries.

use super::CaseProgress;
use crate::{
    case::domain::CaseId,
    error::{CaseworkError, CaseworkResult, EntityKind},
    store::ports::CaseworkStore,
};
use std::sync::Arc;

/// Serves case progress to callers.
#[derive(Clone)]
pub struct ProgressService<S>
where
    S: CaseworkStore,
{
    store: Arc<S>,
}

impl<S> ProgressService<S>
where
    S: CaseworkStore,
{
    /// Creates a new progress service.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the current progress of a case.
    ///
    /// # Errors
    ///
    /// Returns [`CaseworkError::NotFound`] when the case does not exist, or
    /// store failures.
    #[tracing::instrument(skip(self), fields(case_id = %case_id))]
    pub async fn case_progress(&self, case_id: CaseId) -> CaseworkResult<CaseProgress> {
        self.store
            .transaction(move |tx| {
                if tx.find_case(case_id)?.is_none() {
                    return Err(CaseworkError::not_found(EntityKind::Case, case_id));
                }
                let tasks = tx.tasks_for_case(case_id)?;
                Ok(CaseProgress::from_tasks(&tasks))
            })
            .await
    }
}
