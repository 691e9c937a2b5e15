//! Schedule management tools
//!
//! All three run without confirmation. Scheduler failures are narrated as
//! tool output so the model can report them.

use crate::scheduler::{EXECUTE_TASK, Scheduler};
use crate::spec::{ScheduleSpec, WhenArgs};
use autorag_tools::{Field, InputSchema, ToolDescriptor, ToolOutput, executor_fn, parse_args};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

pub const SCHEDULE_TASK: &str = "scheduleTask";
pub const GET_SCHEDULED_TASKS: &str = "getScheduledTasks";
pub const CANCEL_SCHEDULED_TASK: &str = "cancelScheduledTask";

/// Returned when the model could not produce a schedule
pub const NOT_A_VALID_SCHEDULE: &str = "Not a valid schedule input";

/// Returned by `getScheduledTasks` when nothing is stored
pub const NO_SCHEDULED_TASKS: &str = "No scheduled tasks found.";

#[derive(Debug, Deserialize)]
struct ScheduleTaskArgs {
    description: String,
    when: WhenArgs,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CancelArgs {
    task_id: String,
}

/// `scheduleTask`: store a task for later execution
pub fn schedule_task_tool(scheduler: Arc<dyn Scheduler>) -> ToolDescriptor {
    let when = InputSchema::empty()
        .field(
            Field::string("type", "How the task should be scheduled")
                .one_of(["scheduled", "delayed", "cron", "no-schedule"]),
        )
        .field(Field::string("date", "ISO 8601 date and time for a scheduled task").optional())
        .field(Field::number("delayInSeconds", "Delay in seconds for a delayed task").optional())
        .field(Field::string("cron", "Cron expression for a recurring task").optional());

    let schema = InputSchema::empty()
        .field(Field::string("description", "What the task should do"))
        .field(Field::object("when", "When the task should run", when));

    ToolDescriptor::new(
        SCHEDULE_TASK,
        "A tool to schedule a task to be executed at a later time",
        schema,
    )
    .with_executor(executor_fn(move |args| {
        let scheduler = scheduler.clone();
        async move {
            let args: ScheduleTaskArgs = parse_args(SCHEDULE_TASK, args)?;
            Ok(ToolOutput::Text(schedule_task(scheduler.as_ref(), args).await))
        }
    }))
}

async fn schedule_task(scheduler: &dyn Scheduler, args: ScheduleTaskArgs) -> String {
    let spec = match ScheduleSpec::try_from(args.when) {
        Ok(spec) => spec,
        Err(e) => return format!("Error scheduling task: {e}"),
    };
    let Some(timing) = spec.timing() else {
        return NOT_A_VALID_SCHEDULE.to_string();
    };

    match scheduler
        .schedule(timing, EXECUTE_TASK, args.description.clone())
        .await
    {
        Ok(handle) => {
            info!(schedule_id = %handle.id, kind = spec.kind(), "Task scheduled");
            format!("Task scheduled for type \"{}\" : {}", spec.kind(), args.description)
        }
        Err(e) => {
            warn!(error = %e, "Scheduling failed");
            format!("Error scheduling task: {e}")
        }
    }
}

/// `getScheduledTasks`: list stored schedules
pub fn get_scheduled_tasks_tool(scheduler: Arc<dyn Scheduler>) -> ToolDescriptor {
    ToolDescriptor::new(
        GET_SCHEDULED_TASKS,
        "List all tasks that have been scheduled",
        InputSchema::empty(),
    )
    .with_executor(executor_fn(move |_args| {
        let scheduler = scheduler.clone();
        async move {
            let output = match scheduler.list_schedules().await {
                Ok(handles) if handles.is_empty() => ToolOutput::from(NO_SCHEDULED_TASKS),
                Ok(handles) => match serde_json::to_value(&handles) {
                    Ok(value) => ToolOutput::Structured(value),
                    Err(e) => ToolOutput::Text(format!("Error listing scheduled tasks: {e}")),
                },
                Err(e) => ToolOutput::Text(format!("Error listing scheduled tasks: {e}")),
            };
            Ok(output)
        }
    }))
}

/// `cancelScheduledTask`: remove a stored schedule by id
pub fn cancel_scheduled_task_tool(scheduler: Arc<dyn Scheduler>) -> ToolDescriptor {
    let schema =
        InputSchema::empty().field(Field::string("taskId", "The ID of the task to cancel"));

    ToolDescriptor::new(CANCEL_SCHEDULED_TASK, "Cancel a scheduled task using its ID", schema)
        .with_executor(executor_fn(move |args| {
            let scheduler = scheduler.clone();
            async move {
                let CancelArgs { task_id } = parse_args(CANCEL_SCHEDULED_TASK, args)?;
                let text = match scheduler.cancel_schedule(&task_id).await {
                    Ok(()) => format!("Task {task_id} has been successfully canceled."),
                    Err(e) => format!("Error canceling task {task_id}: {e}"),
                };
                Ok(ToolOutput::Text(text))
            }
        }))
}

/// The three schedule tools sharing one scheduler
pub fn scheduling_tools(scheduler: Arc<dyn Scheduler>) -> Vec<ToolDescriptor> {
    vec![
        schedule_task_tool(scheduler.clone()),
        get_scheduled_tasks_tool(scheduler.clone()),
        cancel_scheduled_task_tool(scheduler),
    ]
}
