//! End-to-end walkthroughs of a case and of an operator's working day.

use super::helpers::{World, world};
use casework::{
    Actor, CaseworkError,
    activity::domain::ActivityAction,
    case::{domain::CaseState, services::TransitionCaseRequest},
    task::{
        domain::{TaskDraft, TaskState},
        services::CreateTaskRequest,
    },
    tracking::domain::SessionClosure,
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dependent_mandatory_tasks_gate_case_completion(world: World) -> eyre::Result<()> {
    let actor = Actor::operator(world.operator);
    let case = world
        .casework
        .open_case(world.operator, vec![TaskDraft::new("T1").mandatory()])
        .await?;
    let t1 = world
        .casework
        .tasks
        .list_case_tasks(case.id())
        .await?
        .first()
        .map(|task| task.id())
        .ok_or_else(|| eyre::eyre!("case has no task"))?;
    let t2 = world
        .casework
        .tasks
        .create_task(
            CreateTaskRequest::new(case.id(), TaskDraft::new("T2").mandatory().depending_on(t1)),
            actor,
        )
        .await?
        .id();

    let early = world
        .casework
        .tasks
        .transition_task(t2, TaskState::InProgress, actor)
        .await;
    assert!(matches!(early, Err(CaseworkError::DependencyNotSatisfied { .. })));

    world
        .casework
        .tasks
        .transition_task(t1, TaskState::Completed, actor)
        .await?;
    world
        .casework
        .tasks
        .transition_task(t2, TaskState::InProgress, actor)
        .await?;
    let progress = world.casework.progress.case_progress(case.id()).await?;
    assert_eq!(progress.percent, 50);
    assert_eq!(progress.mandatory_outstanding, 1);

    world
        .casework
        .tasks
        .transition_task(t2, TaskState::Completed, actor)
        .await?;
    let completed = world
        .casework
        .cases
        .transition_case(TransitionCaseRequest {
            case_id: case.id(),
            target: CaseState::Completed,
            actor,
            note: None,
        })
        .await?;

    assert_eq!(completed.state(), CaseState::Completed);
    assert!(completed.completed_at().is_some());
    let entries = world.casework.activity.list_case_activity(case.id()).await?;
    let state_changes: Vec<_> = entries
        .iter()
        .filter(|entry| entry.action() == ActivityAction::CaseStateChanged)
        .collect();
    assert_eq!(state_changes.len(), 1);
    let change = state_changes
        .first()
        .ok_or_else(|| eyre::eyre!("missing cambio_stato entry"))?;
    assert_eq!(change.old_value(), Some("active"));
    assert_eq!(change.new_value(), Some("completed"));
    let progress = world.casework.progress.case_progress(case.id()).await?;
    assert_eq!(progress.percent, 100);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn starting_second_task_auto_closes_first(world: World) -> eyre::Result<()> {
    let case = world
        .casework
        .open_case(
            world.operator,
            vec![TaskDraft::new("Task A"), TaskDraft::new("Task B")],
        )
        .await?;
    let tasks = world.casework.tasks.list_case_tasks(case.id()).await?;
    let (Some(a), Some(b)) = (tasks.first(), tasks.get(1)) else {
        return Err(eyre::eyre!("expected two tasks"));
    };

    let first = world
        .casework
        .tracking
        .start_session(a.id(), world.operator)
        .await?;
    world.casework.clock.set_time("09:30")?;
    let second = world
        .casework
        .tracking
        .start_session(b.id(), world.operator)
        .await?;

    let closed = second
        .auto_closed
        .ok_or_else(|| eyre::eyre!("first session was not auto-closed"))?;
    assert_eq!(closed.id(), first.session.id());
    assert_eq!(closed.duration().map(|worked| worked.whole_minutes()), Some(30));
    assert_eq!(closed.closure(), Some(SessionClosure::AutoClosed));
    assert!(closed.note().is_some_and(|note| note.contains("auto-closed")));

    let active = world
        .casework
        .tracking
        .active_session(world.operator)
        .await?
        .ok_or_else(|| eyre::eyre!("no open session"))?;
    assert_eq!(active.id(), second.session.id());
    assert_eq!(active.task_id(), b.id());

    let actions: Vec<ActivityAction> = world
        .casework
        .activity
        .list_case_activity(case.id())
        .await?
        .iter()
        .map(|entry| entry.action())
        .collect();
    let auto_close = actions
        .iter()
        .rposition(|action| *action == ActivityAction::SessionAutoClosed);
    let restart = actions
        .iter()
        .rposition(|action| *action == ActivityAction::SessionStarted);
    assert!(auto_close < restart, "auto-close must be logged before the new start");
    Ok(())
}
