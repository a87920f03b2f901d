//! Given steps for session tracking BDD scenarios.

use super::world::{TrackingWorld, run_async};
use casework::task::domain::TaskDraft;
use rstest_bdd_macros::given;

#[given(r#"an active case with tasks "{first}" and "{second}""#)]
fn active_case_with_tasks(
    world: &mut TrackingWorld,
    first: String,
    second: String,
) -> Result<(), eyre::Report> {
    let case = run_async(world.casework.open_case(
        world.operator,
        vec![
            TaskDraft::new(first.as_str()),
            TaskDraft::new(second.as_str()),
        ],
    ))?;
    for task in run_async(world.casework.tasks.list_case_tasks(case.id()))? {
        world.tasks.insert(task.title().to_owned(), task.id());
    }
    Ok(())
}

#[given(r#"the clock reads "{time}""#)]
fn clock_reads(world: &mut TrackingWorld, time: String) -> Result<(), eyre::Report> {
    world.casework.clock.set_time(&time)
}
