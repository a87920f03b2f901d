//! Appending to and reading the activity log.

use crate::{
    activity::domain::ActivityEntry,
    case::domain::CaseId,
    error::{CaseworkError, CaseworkResult, EntityKind},
    store::ports::{CaseworkStore, StoreTransaction},
};
use std::sync::Arc;

/// Appends `entry` inside the caller's transaction.
///
/// A failed append is returned as an error so the enclosing transaction
/// rolls back together with the mutation it describes.
pub(crate) fn record(tx: &mut dyn StoreTransaction, entry: &ActivityEntry) -> CaseworkResult<()> {
    tx.append_activity(entry)?;
    tracing::debug!(
        case_id = %entry.case_id(),
        task_id = ?entry.task_id(),
        operator_id = %entry.operator_id(),
        action = %entry.action(),
        "activity recorded"
    );
    Ok(())
}

/// Read access to case activity logs.
#[derive(Clone)]
pub struct ActivityLogService<S>
where
    S: CaseworkStore,
{
    store: Arc<S>,
}

impl<S> ActivityLogService<S>
where
    S: CaseworkStore,
{
    /// Creates a new activity log service.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns a case's activity entries in append order.
    ///
    /// # Errors
    ///
    /// Returns [`CaseworkError::NotFound`] when the case does not exist, or
    /// store failures.
    #[tracing::instrument(skip(self), fields(case_id = %case_id))]
    pub async fn list_case_activity(&self, case_id: CaseId) -> CaseworkResult<Vec<ActivityEntry>> {
        self.store
            .transaction(move |tx| {
                if tx.find_case(case_id)?.is_none() {
                    return Err(CaseworkError::not_found(EntityKind::Case, case_id));
                }
                Ok(tx.activity_for_case(case_id)?)
            })
            .await
    }
}
