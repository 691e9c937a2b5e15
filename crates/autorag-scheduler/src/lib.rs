//! Task scheduling for autorag-agent
//!
//! Tools the model uses to schedule, list and cancel deferred tasks, the
//! [`Scheduler`] seam they forward to, and an in-process implementation.

pub mod error;
pub mod scheduler;
pub mod spec;
pub mod tools;

pub use error::{Result, SchedulerError};
pub use scheduler::{EXECUTE_TASK, InMemoryScheduler, ScheduleHandle, ScheduleKind, Scheduler};
pub use spec::{ScheduleSpec, Timing, WhenArgs};
pub use tools::{
    CANCEL_SCHEDULED_TASK, GET_SCHEDULED_TASKS, NO_SCHEDULED_TASKS, NOT_A_VALID_SCHEDULE,
    SCHEDULE_TASK, cancel_scheduled_task_tool, get_scheduled_tasks_tool, schedule_task_tool,
    scheduling_tools,
};
