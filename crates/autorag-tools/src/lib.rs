//! Tool management and dispatch for autorag-agent
//!
//! This crate decides, for every tool call the model issues, whether it runs
//! straight away or waits for a human, runs it, and turns whatever happens
//! into a [`ToolResult`] for the transcript.
//!
//! - [`ToolDescriptor`]: name, description, [`InputSchema`], optional executor
//! - [`CapabilityRegistry`]: the immutable set of descriptors shown to the model
//! - [`gate`]: the confirmation policy (no inline executor ⇒ ask first)
//! - [`ConfirmedExecutionRegistry`]: executors run only after approval
//! - [`Dispatcher`]: the state machine tying them together

pub mod dispatcher;
pub mod gate;
pub mod registry;
pub mod schema;
pub mod tool;

pub use dispatcher::{
    APPROVAL_NO, APPROVAL_YES, DECLINED_RESULT, Decision, Dispatch, DispatchObserver, Dispatcher,
    DispatcherBuilder, Invocation, InvocationState, PendingInvocation, ResolutionKind, ToolResult,
};
pub use gate::{requires_confirmation, tools_requiring_confirmation};
pub use registry::{CapabilityRegistry, CapabilityRegistryBuilder, ConfirmedExecutionRegistry};
pub use schema::{Field, FieldType, InputSchema};
pub use tool::{Executor, FnExecutor, ToolDescriptor, ToolOutput, executor_fn, parse_args};
