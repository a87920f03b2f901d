//! Worked-time sums and manual entry overlap rules.

use super::helpers::{World, world};
use casework::{
    CaseworkError, WorkDuration,
    error::SessionConflict,
    task::domain::TaskDraft,
    tracking::services::ManualEntryRequest,
};
use chrono::Duration;
use mockable::Clock;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn worked_time_is_exact_sum_of_closed_sessions(world: World) -> eyre::Result<()> {
    let case = world
        .casework
        .open_case(world.operator, vec![TaskDraft::new("Prepare accounts")])
        .await?;
    let task_id = world
        .casework
        .tasks
        .list_case_tasks(case.id())
        .await?
        .first()
        .map(|task| task.id())
        .ok_or_else(|| eyre::eyre!("case has no task"))?;

    let lengths = [7_i64, 13, 45, 120];
    for minutes in lengths {
        let started = world
            .casework
            .tracking
            .start_session(task_id, world.operator)
            .await?;
        world.casework.clock.advance_minutes(minutes);
        world
            .casework
            .tracking
            .stop_session(started.session.id(), world.operator, None)
            .await?;
        world.casework.clock.advance_minutes(1);
    }

    let expected = WorkDuration::from_minutes(lengths.iter().sum());
    let task = world.casework.tasks.get_task(task_id).await?;
    assert_eq!(task.worked(), expected);
    let sessions = world.casework.tracking.task_sessions(task_id).await?;
    let summed: WorkDuration = sessions.iter().filter_map(|session| session.duration()).sum();
    assert_eq!(summed, expected);
    assert_eq!(world.casework.cases.get_case(case.id()).await?.worked(), expected);
    Ok(())
}

#[rstest]
#[case(120, 60, true)]
#[case(240, 180, true)]
#[case(200, 150, false)]
#[case(170, 130, false)]
#[case(190, 110, false)]
#[tokio::test(flavor = "multi_thread")]
async fn manual_entry_abutting_succeeds_and_overlap_fails(
    world: World,
    #[case] start_ago: i64,
    #[case] end_ago: i64,
    #[case] accepted: bool,
) -> eyre::Result<()> {
    let case = world
        .casework
        .open_case(world.operator, vec![TaskDraft::new("Client meeting")])
        .await?;
    let task_id = world
        .casework
        .tasks
        .list_case_tasks(case.id())
        .await?
        .first()
        .map(|task| task.id())
        .ok_or_else(|| eyre::eyre!("case has no task"))?;
    world.casework.clock.advance_minutes(6 * 60);
    let now = world.casework.clock.utc();
    let entry = |from: i64, to: i64| ManualEntryRequest {
        task_id,
        operator_id: world.operator,
        start: now - Duration::minutes(from),
        end: now - Duration::minutes(to),
        note: None,
    };

    world
        .casework
        .tracking
        .record_manual_entry(entry(180, 120))
        .await?;
    let result = world
        .casework
        .tracking
        .record_manual_entry(entry(start_ago, end_ago))
        .await;

    if accepted {
        assert!(result.is_ok(), "expected acceptance, got {result:?}");
    } else {
        assert!(matches!(
            result,
            Err(CaseworkError::SessionConflict(SessionConflict::Overlap { .. }))
        ));
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn other_operators_do_not_conflict(world: World) -> eyre::Result<()> {
    let case = world
        .casework
        .open_case(world.operator, vec![TaskDraft::new("Audit fieldwork")])
        .await?;
    let task_id = world
        .casework
        .tasks
        .list_case_tasks(case.id())
        .await?
        .first()
        .map(|task| task.id())
        .ok_or_else(|| eyre::eyre!("case has no task"))?;
    world.casework.clock.advance_minutes(120);
    let now = world.casework.clock.utc();
    let colleague = casework::OperatorId::new();

    for operator_id in [world.operator, colleague] {
        world
            .casework
            .tracking
            .record_manual_entry(ManualEntryRequest {
                task_id,
                operator_id,
                start: now - Duration::minutes(90),
                end: now - Duration::minutes(30),
                note: None,
            })
            .await?;
    }

    let task = world.casework.tasks.get_task(task_id).await?;
    assert_eq!(task.worked().whole_minutes(), 120);
    Ok(())
}
