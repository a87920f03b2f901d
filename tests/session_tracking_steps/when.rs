//! When steps for session tracking BDD scenarios.

use super::world::{TrackingWorld, run_async};
use casework::tracking::services::ManualEntryRequest;
use rstest_bdd_macros::when;

#[when(r#"the clock reads "{time}""#)]
fn clock_moves_to(world: &mut TrackingWorld, time: String) -> Result<(), eyre::Report> {
    world.casework.clock.set_time(&time)
}

#[when(r#"the operator starts a session on "{title}""#)]
fn start_session(world: &mut TrackingWorld, title: String) -> Result<(), eyre::Report> {
    let task_id = world.task(&title)?;
    let started = run_async(world.casework.tracking.start_session(task_id, world.operator))?;
    world.sessions.insert(title, started.session.id());
    world.current_session = Some(started.session.id());
    world.auto_closed = started.auto_closed;
    world.last_error = None;
    Ok(())
}

#[when("the operator stops the session without a note")]
fn stop_without_note(world: &mut TrackingWorld) -> Result<(), eyre::Report> {
    stop_current(world, None)
}

#[when(r#"the operator stops the session with note "{note}""#)]
fn stop_with_note(world: &mut TrackingWorld, note: String) -> Result<(), eyre::Report> {
    stop_current(world, Some(note))
}

#[when(r#"the operator records "{title}" from "{start}" to "{end}""#)]
fn record_manual_entry(
    world: &mut TrackingWorld,
    title: String,
    start: String,
    end: String,
) -> Result<(), eyre::Report> {
    let request = ManualEntryRequest {
        task_id: world.task(&title)?,
        operator_id: world.operator,
        start: world.at(&start)?,
        end: world.at(&end)?,
        note: None,
    };
    let result = run_async(world.casework.tracking.record_manual_entry(request));
    world.record(result);
    Ok(())
}

fn stop_current(world: &mut TrackingWorld, note: Option<String>) -> Result<(), eyre::Report> {
    let session_id = world
        .current_session
        .ok_or_else(|| eyre::eyre!("no session started in scenario world"))?;
    let result = run_async(
        world
            .casework
            .tracking
            .stop_session(session_id, world.operator, note),
    );
    world.record(result);
    Ok(())
}
