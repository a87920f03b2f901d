//! Then steps for session tracking BDD scenarios.

use super::world::{TrackingWorld, run_async};
use casework::{
    CaseworkError,
    error::SessionConflict,
    tracking::domain::SessionClosure,
};
use rstest_bdd_macros::then;

#[then(r#"the session on "{title}" was auto-closed after {minutes:i64} minutes"#)]
fn session_was_auto_closed(
    world: &TrackingWorld,
    title: String,
    minutes: i64,
) -> Result<(), eyre::Report> {
    let expected = world
        .sessions
        .get(&title)
        .copied()
        .ok_or_else(|| eyre::eyre!("no session started on {title}"))?;
    let closed = world
        .auto_closed
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no session was auto-closed"))?;
    if closed.id() != expected {
        return Err(eyre::eyre!("auto-closed session {} is not on {title}", closed.id()));
    }
    if closed.closure() != Some(SessionClosure::AutoClosed) {
        return Err(eyre::eyre!("session closed as {:?}", closed.closure()));
    }
    let worked = closed.duration().map(|duration| duration.whole_minutes());
    if worked != Some(minutes) {
        return Err(eyre::eyre!("session lasted {worked:?} minutes, expected {minutes}"));
    }
    Ok(())
}

#[then(r#"the operator's only open session is on "{title}""#)]
fn only_open_session_is_on(world: &TrackingWorld, title: String) -> Result<(), eyre::Report> {
    let task_id = world.task(&title)?;
    let active = run_async(world.casework.tracking.active_session(world.operator))?
        .ok_or_else(|| eyre::eyre!("operator has no open session"))?;
    if active.task_id() != task_id {
        return Err(eyre::eyre!("open session tracks {}, not {title}", active.task_id()));
    }
    let still_open = world
        .tasks
        .values()
        .map(|task| run_async(world.casework.tracking.task_sessions(*task)))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .flatten()
        .filter(|session| session.is_open())
        .count();
    if still_open != 1 {
        return Err(eyre::eyre!("{still_open} sessions are open"));
    }
    Ok(())
}

#[then("the command succeeds")]
fn command_succeeds(world: &TrackingWorld) -> Result<(), eyre::Report> {
    match &world.last_error {
        None => Ok(()),
        Some(err) => Err(eyre::eyre!("command failed: {err}")),
    }
}

#[then("the command fails with a session overlap")]
fn fails_with_overlap(world: &TrackingWorld) -> Result<(), eyre::Report> {
    match &world.last_error {
        Some(CaseworkError::SessionConflict(SessionConflict::Overlap { .. })) => Ok(()),
        other => Err(eyre::eyre!("expected a session overlap, got {other:?}")),
    }
}

#[then("the command fails because a note is required")]
fn fails_for_missing_note(world: &TrackingWorld) -> Result<(), eyre::Report> {
    match &world.last_error {
        Some(CaseworkError::RequireNote { .. }) => Ok(()),
        other => Err(eyre::eyre!("expected a missing note failure, got {other:?}")),
    }
}

#[then(r#""{title}" has {minutes:i64} worked minutes"#)]
fn task_has_worked_minutes(
    world: &TrackingWorld,
    title: String,
    minutes: i64,
) -> Result<(), eyre::Report> {
    let task = run_async(world.casework.tasks.get_task(world.task(&title)?))?;
    let worked = task.worked().whole_minutes();
    if worked != minutes {
        return Err(eyre::eyre!("{title} has {worked} worked minutes, expected {minutes}"));
    }
    Ok(())
}
