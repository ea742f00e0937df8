use serde::Serialize;

use crate::cli::task::{task_line, today, TaskListOutput, TaskView};
use crate::cli::Context;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};

#[derive(Serialize)]
struct ClearOutput {
    removed: usize,
}

pub fn run_list(ctx: &Context) -> Result<()> {
    let tasks = ctx.book.done().list_completed()?;
    let today = today();

    let header = if tasks.is_empty() {
        "No completed tasks".to_string()
    } else {
        format!("Completed tasks ({})", tasks.len())
    };
    let mut human = HumanOutput::new(header);
    for task in &tasks {
        human.push_detail(task_line(task, ctx.width(), today));
    }

    let output = TaskListOutput {
        total: tasks.len(),
        tasks: tasks.iter().map(|task| TaskView::new(task, today)).collect(),
    };
    emit_success(ctx.output, "completed list", &output, Some(&human))
}

pub fn run_restore(ctx: &Context, id: &str) -> Result<()> {
    let target = ctx.book.done().resolve(id)?;
    let task = ctx
        .book
        .done()
        .restore(&target.id)?
        .ok_or_else(|| Error::TaskNotFound(target.id.clone()))?;

    let mut human = HumanOutput::new("Task restored");
    human.push_summary("ID", task.id.clone());
    human.push_summary("Description", task.description_display(ctx.width()));
    emit_success(ctx.output, "completed restore", &task, Some(&human))
}

pub fn run_rm(ctx: &Context, id: &str) -> Result<()> {
    let target = ctx.book.done().resolve(id)?;
    let task = ctx
        .book
        .done()
        .remove(&target.id)?
        .ok_or_else(|| Error::TaskNotFound(target.id.clone()))?;

    let mut human = HumanOutput::new("Completed task deleted");
    human.push_summary("ID", task.id.clone());
    emit_success(ctx.output, "completed rm", &task, Some(&human))
}

pub fn run_clear(ctx: &Context, yes: bool) -> Result<()> {
    let count = ctx.book.done().list_completed()?.len();
    if count == 0 {
        let human = HumanOutput::new("No completed tasks to delete");
        return emit_success(
            ctx.output,
            "completed clear",
            &ClearOutput { removed: 0 },
            Some(&human),
        );
    }
    if !yes {
        return Err(Error::InvalidArgument(format!(
            "refusing to delete {count} completed tasks without --yes"
        )));
    }

    let removed = ctx.book.done().clear()?;
    let human = HumanOutput::new(format!("Deleted {removed} completed tasks"));
    emit_success(
        ctx.output,
        "completed clear",
        &ClearOutput { removed },
        Some(&human),
    )
}
