//! taskstash active-task command implementations.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::book::RepairReport;
use crate::cli::{Context, SortKey};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::task::{DueStatus, Priority, Task, TaskInput, NO_DATE, NO_TIME};

pub struct AddOptions {
    pub description: String,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

/// A task as printed in JSON output.
#[derive(Serialize)]
pub(super) struct TaskView<'a> {
    #[serde(flatten)]
    task: &'a Task,
    #[serde(skip_serializing_if = "Option::is_none")]
    due: Option<DueStatus>,
}

impl<'a> TaskView<'a> {
    pub(super) fn new(task: &'a Task, today: NaiveDate) -> Self {
        Self {
            task,
            due: task.due_status(today),
        }
    }
}

#[derive(Serialize)]
pub(super) struct TaskListOutput<'a> {
    pub total: usize,
    pub tasks: Vec<TaskView<'a>>,
}

#[derive(Serialize)]
struct CountOutput {
    removed: usize,
}

pub(super) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// One-line rendering used by list views.
pub(super) fn task_line(task: &Task, width: usize, today: NaiveDate) -> String {
    let mut line = format!(
        "{}  [{}] {} | {}",
        task.id,
        task.priority,
        task.description_display(width),
        task.category_display(width)
    );
    match (task.date_display(), task.time_display()) {
        (Some(date), Some(time)) => line.push_str(&format!(" | {date} {time}")),
        (Some(date), None) => line.push_str(&format!(" | {date}")),
        (None, Some(time)) => line.push_str(&format!(" | {time}")),
        (None, None) => {}
    }
    if let Some(due) = task.due_status(today) {
        line.push_str(&format!(" ({})", due.label()));
    }
    line
}

pub(super) fn task_summary(human: &mut HumanOutput, task: &Task, width: usize) {
    human.push_summary("ID", task.id.clone());
    human.push_summary("Description", task.description_display(width));
    human.push_summary("Category", task.category_display(width));
    human.push_summary("Priority", task.priority.to_string());
    human.push_summary("Date", task.date_display().unwrap_or_else(|| NO_DATE.to_string()));
    human.push_summary("Time", task.time_display().unwrap_or_else(|| NO_TIME.to_string()));
}

pub fn run_add(ctx: &Context, options: AddOptions) -> Result<()> {
    let mut input = TaskInput::new(options.description);
    input.category = options.category;
    if let Some(raw) = options.priority.as_deref() {
        input.priority = Some(raw.parse::<Priority>()?);
    }
    let date = options.date.as_deref().map(parse_date).transpose()?;
    input.deadline_date = date;
    input.deadline_time = options
        .time
        .as_deref()
        .map(|raw| parse_time(raw, date.map(|d| d.date_naive()).unwrap_or_else(today)))
        .transpose()?;

    let task = ctx.book.tasks().create(input)?;

    let mut human = HumanOutput::new("Task created");
    task_summary(&mut human, &task, ctx.width());
    emit_success(ctx.output, "add", &task, Some(&human))
}

pub fn run_list(ctx: &Context) -> Result<()> {
    let tasks = ctx.book.tasks().list_active()?;
    let today = today();

    let header = if tasks.is_empty() {
        "No active tasks".to_string()
    } else {
        format!("Active tasks ({})", tasks.len())
    };
    let mut human = HumanOutput::new(header);
    for task in &tasks {
        human.push_detail(task_line(task, ctx.width(), today));
    }

    let output = TaskListOutput {
        total: tasks.len(),
        tasks: tasks.iter().map(|task| TaskView::new(task, today)).collect(),
    };
    emit_success(ctx.output, "list", &output, Some(&human))
}

pub fn run_show(ctx: &Context, id: &str) -> Result<()> {
    let task = ctx.book.tasks().resolve(id)?;
    let today = today();

    let mut human = HumanOutput::new("Task");
    task_summary(&mut human, &task, usize::MAX);
    if let Some(due) = task.due_status(today) {
        human.push_summary("Due", due.label());
    }
    emit_success(ctx.output, "show", &TaskView::new(&task, today), Some(&human))
}

pub fn run_done(ctx: &Context, id: &str) -> Result<()> {
    let target = ctx.book.tasks().resolve(id)?;
    let task = ctx
        .book
        .tasks()
        .mark_done(&target.id)?
        .ok_or_else(|| Error::TaskNotFound(target.id.clone()))?;

    let mut human = HumanOutput::new("Task completed");
    human.push_summary("ID", task.id.clone());
    human.push_summary("Description", task.description_display(ctx.width()));
    emit_success(ctx.output, "done", &task, Some(&human))
}

pub fn run_rm(ctx: &Context, id: &str) -> Result<()> {
    let target = ctx.book.tasks().resolve(id)?;
    let task = ctx
        .book
        .tasks()
        .delete(&target.id)?
        .ok_or_else(|| Error::TaskNotFound(target.id.clone()))?;

    let mut human = HumanOutput::new("Task deleted");
    human.push_summary("ID", task.id.clone());
    emit_success(ctx.output, "rm", &task, Some(&human))
}

pub fn run_sort(ctx: &Context, by: SortKey) -> Result<()> {
    let tasks = match by {
        SortKey::Deadline => ctx.book.tasks().sort_by_deadline()?,
        SortKey::Priority => ctx.book.tasks().sort_by_priority()?,
    };
    let today = today();

    let label = match by {
        SortKey::Deadline => "deadline",
        SortKey::Priority => "priority",
    };
    let mut human = HumanOutput::new(format!("Sorted {} tasks by {label}", tasks.len()));
    for task in &tasks {
        human.push_detail(task_line(task, ctx.width(), today));
    }

    let output = TaskListOutput {
        total: tasks.len(),
        tasks: tasks.iter().map(|task| TaskView::new(task, today)).collect(),
    };
    emit_success(ctx.output, "sort", &output, Some(&human))
}

pub fn run_clear(ctx: &Context, yes: bool) -> Result<()> {
    let count = ctx.book.tasks().list_active()?.len();
    if count == 0 {
        let human = HumanOutput::new("No active tasks to delete");
        return emit_success(ctx.output, "clear", &CountOutput { removed: 0 }, Some(&human));
    }
    if !yes {
        return Err(Error::InvalidArgument(format!(
            "refusing to delete {count} active tasks without --yes"
        )));
    }

    let removed = ctx.book.tasks().clear_all()?;
    let human = HumanOutput::new(format!("Deleted {removed} active tasks"));
    emit_success(ctx.output, "clear", &CountOutput { removed }, Some(&human))
}

pub fn run_repair(ctx: &Context) -> Result<()> {
    let report: RepairReport = ctx.book.repair()?;

    let mut human = HumanOutput::new("Repair finished");
    match &report.recovered {
        Some(pending) => human.push_summary(
            "Recovered move",
            format!("{:?} {}", pending.kind, pending.task.id),
        ),
        None => human.push_summary("Recovered move", "none"),
    }
    human.push_summary("Re-keyed ids", report.rekeyed.to_string());
    emit_success(ctx.output, "repair", &report, Some(&human))
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(value) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(value.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            Error::InvalidArgument(format!("invalid date '{raw}' (expected YYYY-MM-DD)"))
        })
}

fn parse_time(raw: &str, day: NaiveDate) -> Result<DateTime<Utc>> {
    let time = NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| Error::InvalidArgument(format!("invalid time '{raw}' (expected HH:MM)")))?;
    Ok(day.and_time(time).and_utc())
}
