//! Given steps for case completion BDD scenarios.

use super::world::{CaseWorld, run_async};
use casework::{
    Actor,
    task::{domain::TaskDraft, services::CreateTaskRequest},
};
use rstest_bdd_macros::given;

#[given(r#"an active case with mandatory task "{title}""#)]
fn active_case_with_mandatory_task(world: &mut CaseWorld, title: String) -> Result<(), eyre::Report> {
    let case = run_async(
        world
            .casework
            .open_case(world.operator, vec![TaskDraft::new(title.as_str()).mandatory()]),
    )?;
    let tasks = run_async(world.casework.tasks.list_case_tasks(case.id()))?;
    let first = tasks
        .first()
        .ok_or_else(|| eyre::eyre!("case opened without its task"))?;
    world.tasks.insert(title, first.id());
    world.case = Some(case);
    Ok(())
}

#[given(r#"a mandatory task "{title}" depending on "{predecessor}""#)]
fn mandatory_dependent_task(
    world: &mut CaseWorld,
    title: String,
    predecessor: String,
) -> Result<(), eyre::Report> {
    let predecessor_id = world.task(&predecessor)?;
    let draft = TaskDraft::new(title.as_str())
        .mandatory()
        .depending_on(predecessor_id);
    add_task(world, title, draft)
}

#[given(r#"an optional task "{title}""#)]
fn optional_task(world: &mut CaseWorld, title: String) -> Result<(), eyre::Report> {
    let draft = TaskDraft::new(title.as_str());
    add_task(world, title, draft)
}

fn add_task(world: &mut CaseWorld, title: String, draft: TaskDraft) -> Result<(), eyre::Report> {
    let case_id = world.case()?.id();
    let task = run_async(world.casework.tasks.create_task(
        CreateTaskRequest::new(case_id, draft),
        Actor::operator(world.operator),
    ))?;
    world.tasks.insert(title, task.id());
    Ok(())
}
