//! Row locks and the one-open-session guarantee.

use super::helpers::{setup, teardown};
use casework::{
    CaseworkError, OperatorId, error::SessionConflict, task::domain::TaskDraft,
    tracking::services::ManualEntryRequest,
};
use chrono::Duration;
use mockable::Clock;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_starts_leave_one_open_session() -> eyre::Result<()> {
    let Some(world) = setup()? else {
        return Ok(());
    };
    let operator = OperatorId::new();
    let casework = Arc::new(world.casework);
    let case = casework
        .open_case(
            operator,
            (0..6).map(|n| TaskDraft::new(format!("Task {n}"))).collect(),
        )
        .await?;
    let tasks = casework.tasks.list_case_tasks(case.id()).await?;

    let handles: Vec<_> = tasks
        .iter()
        .map(|task| {
            let casework = Arc::clone(&casework);
            let task_id = task.id();
            tokio::spawn(async move { casework.tracking.start_session(task_id, operator).await })
        })
        .collect();
    let mut started = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => started += 1,
            Err(CaseworkError::Store(_)) => {}
            Err(other) => return Err(other.into()),
        }
    }

    let mut open = 0;
    for task in &tasks {
        open += casework
            .tracking
            .task_sessions(task.id())
            .await?
            .iter()
            .filter(|session| session.is_open())
            .count();
    }
    assert!(started >= 1);
    assert_eq!(open, 1);

    teardown(&world.schema)
}

#[tokio::test(flavor = "multi_thread")]
async fn manual_entry_overlap_is_checked_against_stored_sessions() -> eyre::Result<()> {
    let Some(world) = setup()? else {
        return Ok(());
    };
    let operator = OperatorId::new();
    let casework = &world.casework;
    let case = casework
        .open_case(operator, vec![TaskDraft::new("Due diligence")])
        .await?;
    let task_id = casework
        .tasks
        .list_case_tasks(case.id())
        .await?
        .first()
        .map(|task| task.id())
        .ok_or_else(|| eyre::eyre!("case has no task"))?;
    casework.clock.advance_minutes(300);
    let now = casework.clock.utc();
    let entry = |from: i64, to: i64| ManualEntryRequest {
        task_id,
        operator_id: operator,
        start: now - Duration::minutes(from),
        end: now - Duration::minutes(to),
        note: None,
    };

    casework.tracking.record_manual_entry(entry(120, 60)).await?;
    casework.tracking.record_manual_entry(entry(60, 30)).await?;
    let overlapping = casework.tracking.record_manual_entry(entry(90, 45)).await;

    assert!(matches!(
        overlapping,
        Err(CaseworkError::SessionConflict(SessionConflict::Overlap { .. }))
    ));
    let task = casework.tasks.get_task(task_id).await?;
    assert_eq!(task.worked().whole_minutes(), 90);

    teardown(&world.schema)
}
