//! Then steps for case completion BDD scenarios.

use super::world::{CaseWorld, run_async};
use casework::{
    CaseworkError,
    activity::domain::ActivityAction,
    case::domain::CaseState,
    task::domain::TaskState,
};
use rstest_bdd_macros::then;

#[then("the command fails because a dependency is not satisfied")]
fn fails_on_dependency(world: &CaseWorld) -> Result<(), eyre::Report> {
    match &world.last_error {
        Some(CaseworkError::DependencyNotSatisfied { .. }) => Ok(()),
        other => Err(eyre::eyre!("expected a dependency failure, got {other:?}")),
    }
}

#[then("the command fails because {count:usize} mandatory tasks are pending")]
fn fails_on_pending_mandatory(world: &CaseWorld, count: usize) -> Result<(), eyre::Report> {
    match &world.last_error {
        Some(CaseworkError::MandatoryTasksPending { outstanding, .. }) if *outstanding == count => Ok(()),
        other => Err(eyre::eyre!(
            "expected {count} pending mandatory tasks, got {other:?}"
        )),
    }
}

#[then(r#"task "{title}" is "{state}""#)]
fn task_is_in_state(world: &CaseWorld, title: String, state: String) -> Result<(), eyre::Report> {
    let expected = TaskState::try_from(state.as_str())?;
    let task = run_async(world.casework.tasks.get_task(world.task(&title)?))?;
    if task.state() != expected {
        return Err(eyre::eyre!(
            "task {title} is {}, expected {expected}",
            task.state()
        ));
    }
    Ok(())
}

#[then(r#"the case is "{state}" with a completion date"#)]
fn case_is_completed(world: &CaseWorld, state: String) -> Result<(), eyre::Report> {
    let expected = CaseState::try_from(state.as_str())?;
    let case = run_async(world.casework.cases.get_case(world.case()?.id()))?;
    if case.state() != expected {
        return Err(eyre::eyre!("case is {}, expected {expected}", case.state()));
    }
    if case.completed_at().is_none() {
        return Err(eyre::eyre!("case has no completion date"));
    }
    Ok(())
}

#[then(r#"the case log holds {count:usize} "{action}" entries"#)]
fn case_log_holds(world: &CaseWorld, count: usize, action: String) -> Result<(), eyre::Report> {
    let wanted = ActivityAction::try_from(action.as_str())?;
    let entries = run_async(world.casework.activity.list_case_activity(world.case()?.id()))?;
    let found = entries
        .iter()
        .filter(|entry| entry.action() == wanted)
        .count();
    if found != count {
        return Err(eyre::eyre!("found {found} {action} entries, expected {count}"));
    }
    Ok(())
}
