//! When steps for case completion BDD scenarios.

use super::world::{CaseWorld, run_async};
use casework::{
    Actor,
    case::{domain::CaseState, services::TransitionCaseRequest},
    task::domain::TaskState,
};
use rstest_bdd_macros::when;

#[when(r#"task "{title}" is moved to "{state}""#)]
fn move_task(world: &mut CaseWorld, title: String, state: String) -> Result<(), eyre::Report> {
    let task_id = world.task(&title)?;
    let target = TaskState::try_from(state.as_str())?;
    let result = run_async(world.casework.tasks.transition_task(
        task_id,
        target,
        Actor::operator(world.operator),
    ));
    world.record(result);
    Ok(())
}

#[when(r#"the case is moved to "{state}""#)]
fn move_case(world: &mut CaseWorld, state: String) -> Result<(), eyre::Report> {
    let request = TransitionCaseRequest {
        case_id: world.case()?.id(),
        target: CaseState::try_from(state.as_str())?,
        actor: Actor::operator(world.operator),
        note: None,
    };
    match run_async(world.casework.cases.transition_case(request)) {
        Ok(case) => {
            world.case = Some(case);
            world.last_error = None;
        }
        Err(err) => world.last_error = Some(err),
    }
    Ok(())
}
