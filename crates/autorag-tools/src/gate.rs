//! Confirmation gate
//!
//! A tool runs on its own exactly when its descriptor carries an inline
//! executor. There is no override list and no risk scoring.

use crate::registry::CapabilityRegistry;
use crate::tool::{Executor, ToolDescriptor};
use std::sync::Arc;

/// How an invocation of a descriptor proceeds
pub enum ExecutionMode<'a> {
    /// Run immediately with the inline executor
    Auto(&'a Arc<dyn Executor>),
    /// Suspend until a human decides
    ConfirmFirst,
}

/// Classify a descriptor
pub fn classify(descriptor: &ToolDescriptor) -> ExecutionMode<'_> {
    match descriptor.executor() {
        Some(executor) => ExecutionMode::Auto(executor),
        None => ExecutionMode::ConfirmFirst,
    }
}

/// `true` when the descriptor has no inline executor
pub fn requires_confirmation(descriptor: &ToolDescriptor) -> bool {
    matches!(classify(descriptor), ExecutionMode::ConfirmFirst)
}

/// Names of every confirmation-required tool, in registry order
///
/// This is the list a UI uses to decide which tool calls get approve/deny
/// buttons. Always derive it from the registry.
pub fn tools_requiring_confirmation(registry: &CapabilityRegistry) -> Vec<String> {
    registry
        .iter()
        .filter(|t| requires_confirmation(t))
        .map(|t| t.name().to_string())
        .collect()
}
