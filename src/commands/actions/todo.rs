//! Handlers for the secretary cog.

use chrono::{Local, NaiveTime};

use crate::commands::{CommandContext, CommandOutcome};
use crate::error::BotError;
use crate::registry::Resolution;
use crate::sessions::{Paginator, SessionOptions, TaskPanel};
use crate::tasks::Task;

const TASKS_PER_PAGE: usize = 5;

/// `todo add <text>` - opens the task-creation panel.
///
/// The insert happens when the panel's Finish control submits; see the
/// bot's submission handling.
pub fn add(ctx: &CommandContext, resolution: &Resolution) -> Result<CommandOutcome, BotError> {
    let text = resolution.rest();
    if text.is_empty() {
        return Ok(CommandOutcome::text(format!(
            "What should I remember?\nUsage: `{}todo add <task>`",
            ctx.prefix
        )));
    }

    Ok(CommandOutcome::session(
        Box::new(TaskPanel::new(text)),
        SessionOptions::default().invoker_only(ctx.user_id),
    ))
}

/// `todo list [overdue_only]` - paginated listing, soonest due first.
pub async fn list(
    ctx: &CommandContext,
    resolution: &Resolution,
) -> Result<CommandOutcome, BotError> {
    let overdue_only = matches!(
        resolution.args.first().map(String::as_str),
        Some("overdue" | "overdue_only" | "true" | "1")
    );

    let mut tasks = if overdue_only {
        ctx.tasks.overdue_tasks_for_user(ctx.user_id).await?
    } else {
        ctx.tasks.tasks_for_user(ctx.user_id).await?
    };

    if tasks.is_empty() {
        let response = if overdue_only {
            "\u{2705} You have no overdue tasks"
        } else {
            "\u{2705} You have no tasks"
        };
        return Ok(CommandOutcome::text(response));
    }

    // Soonest first; tasks without any due data sort as today at 00:00.
    let today = Local::now().date_naive();
    tasks.sort_by_key(|task| {
        task.due_instant(today)
            .unwrap_or_else(|| today.and_time(NaiveTime::MIN))
    });

    let paginator = Paginator::new(
        tasks,
        TASKS_PER_PAGE,
        Box::new(|indices, page: &[Task]| {
            let mut lines = vec!["\u{1F4DD} Your Tasks".to_string()];
            for (offset, task) in page.iter().enumerate() {
                let due = task
                    .due_description()
                    .unwrap_or_else(|| "No due date".to_string());
                lines.push(format!(
                    "`{}.` [#{}] {}\n> **Due: {}**\n> *Set: {}*",
                    indices.start + offset + 1,
                    task.task_id,
                    task.task,
                    due,
                    task.datetime_created.format("%B %d, %Y at %I:%M %p")
                ));
            }
            lines.join("\n")
        }),
    );

    Ok(CommandOutcome::session(
        Box::new(paginator),
        SessionOptions::default().invoker_only(ctx.user_id),
    ))
}

/// `todo remove <task_id>`
pub async fn remove(
    ctx: &CommandContext,
    resolution: &Resolution,
) -> Result<CommandOutcome, BotError> {
    let Some(task_id) = resolution.args.first().and_then(|raw| raw.parse::<i64>().ok()) else {
        return Ok(CommandOutcome::text(format!(
            "Which task? The id is the `#` number in `{}todo list`.",
            ctx.prefix
        )));
    };

    // Only the owner may delete; a foreign id reads as not found.
    let task = ctx.tasks.get_by_id(task_id).await?;
    let Some(task) = task.filter(|task| task.user_id == ctx.user_id) else {
        return Ok(CommandOutcome::text(format!("Task #{task_id} not found.")));
    };

    ctx.tasks.delete(task.task_id).await?;
    Ok(CommandOutcome::text(format!(
        "\u{1F5D1} Removed task #{}: {}",
        task.task_id, task.task
    )))
}
