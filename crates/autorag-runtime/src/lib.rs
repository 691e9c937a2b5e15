//! Agent runtime for autorag-agent
//!
//! This crate assembles the default tool set, runs the chat loop against an
//! injected model provider, and suspends a turn whenever a tool call needs a
//! human decision.

pub mod agent;
pub mod prompt;
pub mod runtime;
pub mod toolset;

// Re-export key types
pub use agent::{
    AgentEventHandler, ChatAgent, ChatAgentBuilder, ChatConfig, MAX_ITERATIONS_REACHED,
    RESPONSE_TRUNCATED, TurnOutcome,
};
pub use prompt::SYSTEM_PROMPT;
pub use runtime::{AgentRuntime, AgentRuntimeBuilder};
pub use toolset::{
    GET_LOCAL_TIME, GET_WEATHER_INFORMATION, ToolSet, local_time_tool, weather_executor,
    weather_tool,
};
