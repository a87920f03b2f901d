//! Concurrent commands against one operator or one task.

use super::helpers::{World, world};
use casework::{
    Actor, CaseworkError,
    task::domain::{TaskDraft, TaskState},
};
use rstest::rstest;
use std::sync::Arc;

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_starts_leave_one_open_session(world: World) -> eyre::Result<()> {
    let operator = world.operator;
    let casework = Arc::new(world.casework);
    let case = casework
        .open_case(
            operator,
            (0..8).map(|n| TaskDraft::new(format!("Task {n}"))).collect(),
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
    for handle in handles {
        handle.await??;
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
    assert_eq!(open, 1);
    assert!(casework.tracking.active_session(operator).await?.is_some());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_completions_apply_once(world: World) -> eyre::Result<()> {
    let operator = world.operator;
    let casework = Arc::new(world.casework);
    let case = casework
        .open_case(operator, vec![TaskDraft::new("Sign engagement letter")])
        .await?;
    let task_id = casework
        .tasks
        .list_case_tasks(case.id())
        .await?
        .first()
        .map(|task| task.id())
        .ok_or_else(|| eyre::eyre!("case has no task"))?;
    let actor = Actor::operator(operator);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let casework = Arc::clone(&casework);
            tokio::spawn(async move {
                casework
                    .tasks
                    .transition_task(task_id, TaskState::Completed, actor)
                    .await
            })
        })
        .collect();
    let mut succeeded = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => succeeded += 1,
            Err(CaseworkError::InvalidTransition { .. }) => {}
            Err(other) => return Err(other.into()),
        }
    }

    assert_eq!(succeeded, 1);
    Ok(())
}
