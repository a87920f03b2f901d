//! A command whose activity append fails leaves no trace.

use super::helpers::{World, world};
use casework::{
    Actor, CaseworkError,
    case::{domain::CaseState, services::TransitionCaseRequest},
    task::domain::{TaskDraft, TaskState},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_log_append_rolls_back_case_completion(world: World) -> eyre::Result<()> {
    let case = world
        .casework
        .open_case(
            world.operator,
            vec![TaskDraft::new("Draft will"), TaskDraft::new("Witness signing")],
        )
        .await?;
    let before = world.casework.activity.list_case_activity(case.id()).await?;

    world.store.fail_activity_appends(true);
    let result = world
        .casework
        .cases
        .transition_case(TransitionCaseRequest {
            case_id: case.id(),
            target: CaseState::Completed,
            actor: Actor::operator(world.operator),
            note: None,
        })
        .await;
    world.store.fail_activity_appends(false);

    assert!(matches!(result, Err(CaseworkError::Store(_))));
    let stored = world.casework.cases.get_case(case.id()).await?;
    assert_eq!(stored.state(), CaseState::Active);
    assert!(stored.completed_at().is_none());
    let tasks = world.casework.tasks.list_case_tasks(case.id()).await?;
    assert!(tasks.iter().all(|task| task.state() == TaskState::NotStarted));
    let after = world.casework.activity.list_case_activity(case.id()).await?;
    assert_eq!(after.len(), before.len());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_log_append_keeps_previous_session_open(world: World) -> eyre::Result<()> {
    let case = world
        .casework
        .open_case(
            world.operator,
            vec![TaskDraft::new("Research"), TaskDraft::new("Write opinion")],
        )
        .await?;
    let tasks = world.casework.tasks.list_case_tasks(case.id()).await?;
    let (Some(first), Some(second)) = (tasks.first(), tasks.get(1)) else {
        return Err(eyre::eyre!("expected two tasks"));
    };
    let earlier = world
        .casework
        .tracking
        .start_session(first.id(), world.operator)
        .await?;
    world.casework.clock.advance_minutes(15);

    world.store.fail_activity_appends(true);
    let result = world
        .casework
        .tracking
        .start_session(second.id(), world.operator)
        .await;
    world.store.fail_activity_appends(false);

    assert!(matches!(result, Err(CaseworkError::Store(_))));
    let active = world.casework.tracking.active_session(world.operator).await?;
    assert_eq!(active.map(|session| session.id()), Some(earlier.session.id()));
    let untouched = world.casework.tasks.get_task(first.id()).await?;
    assert_eq!(untouched.worked().as_seconds(), 0);
    Ok(())
}
