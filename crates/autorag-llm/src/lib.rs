//! Conversational model boundary for autorag-agent
//!
//! The model itself lives outside this workspace. This crate only fixes the
//! shape of what crosses the boundary:
//!
//! - Message types for the conversation transcript
//! - Completion request/response types
//! - Tool definitions advertised to the model
//! - The [`LLMProvider`] trait a model driver implements

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod tools;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role, ToolCall};
pub use provider::LLMProvider;
pub use tools::ToolDefinition;
