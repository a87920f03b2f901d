//! Case, task and session flows against real rows.

use super::helpers::{setup, teardown};
use casework::{
    Actor, CaseworkError, OperatorId,
    activity::domain::ActivityAction,
    case::{domain::CaseState, services::TransitionCaseRequest},
    task::{
        domain::{TaskDraft, TaskState},
        services::CreateTaskRequest,
    },
    tracking::{
        domain::{InterruptionKind, SessionClosure},
        services::PauseSessionRequest,
    },
};

#[tokio::test(flavor = "multi_thread")]
async fn case_round_trips_through_completion() -> eyre::Result<()> {
    let Some(world) = setup()? else {
        return Ok(());
    };
    let operator = OperatorId::new();
    let actor = Actor::operator(operator);
    let casework = &world.casework;

    let case = casework
        .open_case(operator, vec![TaskDraft::new("Collect records").mandatory()])
        .await?;
    let first = casework
        .tasks
        .list_case_tasks(case.id())
        .await?
        .first()
        .map(|task| task.id())
        .ok_or_else(|| eyre::eyre!("case has no task"))?;
    let second = casework
        .tasks
        .create_task(
            CreateTaskRequest::new(case.id(), TaskDraft::new("Review").depending_on(first)),
            actor,
        )
        .await?;

    let started = casework.tracking.start_session(first, operator).await?;
    casework.clock.advance_minutes(40);
    let paused = casework
        .tracking
        .pause_session(PauseSessionRequest {
            session_id: started.session.id(),
            operator_id: operator,
            reason: Some(InterruptionKind::ClientRequest),
            note: None,
        })
        .await?;
    assert_eq!(paused.closure(), Some(SessionClosure::Paused));
    assert_eq!(paused.interruption(), Some(InterruptionKind::ClientRequest));
    let stored = casework.tracking.task_sessions(first).await?;
    let minutes: Vec<_> = stored
        .iter()
        .map(|session| session.duration().map(|duration| duration.whole_minutes()))
        .collect();
    assert_eq!(minutes, vec![Some(40)]);

    let guarded = casework.tasks.delete_task(first, actor).await;
    assert!(matches!(guarded, Err(CaseworkError::HasDependents { .. })));

    casework
        .tasks
        .transition_task(first, TaskState::Completed, actor)
        .await?;
    let completed = casework
        .cases
        .transition_case(TransitionCaseRequest {
            case_id: case.id(),
            target: CaseState::Completed,
            actor,
            note: Some("filed".to_owned()),
        })
        .await?;

    assert_eq!(completed.state(), CaseState::Completed);
    assert_eq!(completed.worked().whole_minutes(), 40);
    let review = casework.tasks.get_task(second.id()).await?;
    assert_eq!(review.state(), TaskState::Completed);
    let actions: Vec<ActivityAction> = casework
        .activity
        .list_case_activity(case.id())
        .await?
        .iter()
        .map(|entry| entry.action())
        .collect();
    assert_eq!(actions.first(), Some(&ActivityAction::CaseCreated));
    assert_eq!(actions.last(), Some(&ActivityAction::CaseStateChanged));
    assert!(actions.contains(&ActivityAction::TaskForceCompleted));

    teardown(&world.schema)
}

#[tokio::test(flavor = "multi_thread")]
async fn reorder_and_delete_persist_dense_positions() -> eyre::Result<()> {
    let Some(world) = setup()? else {
        return Ok(());
    };
    let operator = OperatorId::new();
    let actor = Actor::operator(operator);
    let casework = &world.casework;
    let case = casework
        .open_case(
            operator,
            vec![TaskDraft::new("A"), TaskDraft::new("B"), TaskDraft::new("C")],
        )
        .await?;
    let ids: Vec<_> = casework
        .tasks
        .list_case_tasks(case.id())
        .await?
        .iter()
        .map(|task| task.id())
        .collect();

    casework
        .tasks
        .reorder_tasks(case.id(), ids.iter().rev().copied().collect(), actor)
        .await?;
    let c_id = *ids.last().ok_or_else(|| eyre::eyre!("missing task"))?;
    casework.tasks.delete_task(c_id, actor).await?;

    let layout: Vec<(String, u32)> = casework
        .tasks
        .list_case_tasks(case.id())
        .await?
        .iter()
        .map(|task| (task.title().to_owned(), task.order_index()))
        .collect();
    assert_eq!(layout, [("B".to_owned(), 0), ("A".to_owned(), 1)]);

    teardown(&world.schema)
}
