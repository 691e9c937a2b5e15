//! Execution dispatcher
//!
//! Per invocation the dispatcher walks a small state machine:
//!
//! ```text
//! Pending ─┬─ auto-executing ──────► AutoRunning ──► Resolved
//!          └─ confirmation-required ► AwaitingConfirmation
//!                                      ├─ approved ► Running ──► Resolved
//!                                      └─ denied   ────────────► Resolved
//! ```
//!
//! Every path ends in a [`ToolResult`]. Executor errors, panics, unknown
//! tools, invalid arguments and missing confirmed executors are all logged
//! and narrated into the result text; nothing escapes as an error.

use crate::gate::{self, ExecutionMode};
use crate::registry::{CapabilityRegistry, ConfirmedExecutionRegistry};
use crate::tool::{Executor, ToolDescriptor};
use autorag_core::{Error, Result};
use futures::FutureExt;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// UI wire string for an approval
pub const APPROVAL_YES: &str = "Yes, confirmed.";

/// UI wire string for a denial
pub const APPROVAL_NO: &str = "No, denied.";

/// Result text when a human declines a tool call
pub const DECLINED_RESULT: &str = "Error: User denied access to tool execution";

/// A tool call issued by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    /// Correlates the call across the suspend/resume boundary
    pub invocation_id: String,
    pub tool_name: String,
    pub args: Value,
}

impl Invocation {
    pub fn new(
        invocation_id: impl Into<String>,
        tool_name: impl Into<String>,
        args: Value,
    ) -> Self {
        Self {
            invocation_id: invocation_id.into(),
            tool_name: tool_name.into(),
            args,
        }
    }

    /// Invocation with a freshly generated id
    pub fn with_generated_id(tool_name: impl Into<String>, args: Value) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), tool_name, args)
    }
}

/// Human decision on a confirmation-required call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Denied,
}

impl Decision {
    pub fn from_approved(approved: bool) -> Self {
        if approved { Self::Approved } else { Self::Denied }
    }

    /// The UI wire string for this decision
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Approved => APPROVAL_YES,
            Self::Denied => APPROVAL_NO,
        }
    }
}

impl FromStr for Decision {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            APPROVAL_YES => Ok(Self::Approved),
            APPROVAL_NO => Ok(Self::Denied),
            other => match other.to_ascii_lowercase().as_str() {
                "yes" | "y" | "approve" | "approved" | "true" => Ok(Self::Approved),
                "no" | "n" | "deny" | "denied" | "false" => Ok(Self::Denied),
                _ => Err(Error::Generic(format!("Unrecognized decision: {other}"))),
            },
        }
    }
}

/// Lifecycle state of an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationState {
    Pending,
    AutoRunning,
    AwaitingConfirmation,
    Running,
    Resolved,
}

/// How an invocation was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionKind {
    /// Executor ran and succeeded
    Completed,
    /// Executor ran and returned an error (or panicked)
    Failed,
    /// Arguments failed schema validation; nothing ran
    InvalidInput,
    /// Tool name not in the registry; nothing ran
    UnknownTool,
    /// Approved, but no confirmed executor registered
    MissingExecutor,
    /// Human denied the call; nothing ran
    Declined,
}

/// Terminal outcome of an invocation, ready for the transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub invocation_id: String,
    pub tool_name: String,
    pub content: String,
    pub is_error: bool,
    pub kind: ResolutionKind,
}

impl ToolResult {
    fn new(invocation: &Invocation, kind: ResolutionKind, content: String) -> Self {
        let is_error = !matches!(kind, ResolutionKind::Completed);
        Self {
            invocation_id: invocation.invocation_id.clone(),
            tool_name: invocation.tool_name.clone(),
            content,
            is_error,
            kind,
        }
    }

    fn from_error(invocation: &Invocation, kind: ResolutionKind, error: &Error) -> Self {
        Self::new(invocation, kind, format!("Error: {error}"))
    }
}

/// A confirmation-required call waiting for a human decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingInvocation {
    pub invocation: Invocation,
}

impl PendingInvocation {
    pub fn invocation_id(&self) -> &str {
        &self.invocation.invocation_id
    }

    pub fn tool_name(&self) -> &str {
        &self.invocation.tool_name
    }
}

/// Result of dispatching one invocation
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Resolved(ToolResult),
    AwaitingConfirmation(PendingInvocation),
}

impl Dispatch {
    pub fn invocation_id(&self) -> &str {
        match self {
            Self::Resolved(result) => &result.invocation_id,
            Self::AwaitingConfirmation(pending) => pending.invocation_id(),
        }
    }
}

/// Receives state transitions, e.g. to stream tool status to a UI
pub trait DispatchObserver: Send + Sync {
    fn on_transition(&self, invocation: &Invocation, state: InvocationState);
}

/// Routes model-issued invocations to executors
pub struct Dispatcher {
    registry: Arc<CapabilityRegistry>,
    confirmed: ConfirmedExecutionRegistry,
    observer: Option<Arc<dyn DispatchObserver>>,
}

impl Dispatcher {
    /// Create a dispatcher over an existing registry pair
    ///
    /// Mismatches between the two registries are logged, not rejected; an
    /// approved call without a confirmed executor resolves as
    /// [`ResolutionKind::MissingExecutor`]. Use [`Dispatcher::builder`] to
    /// pair descriptors and executors at construction instead.
    pub fn new(registry: Arc<CapabilityRegistry>, confirmed: ConfirmedExecutionRegistry) -> Self {
        let dispatcher = Self {
            registry,
            confirmed,
            observer: None,
        };
        for problem in dispatcher.pairing_problems() {
            warn!(problem = %problem, "Tool registry pairing problem");
        }
        dispatcher
    }

    /// Start a builder that pairs confirmation-required tools with executors
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Attach an observer for state transitions
    pub fn with_observer(mut self, observer: Arc<dyn DispatchObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    pub fn confirmed(&self) -> &ConfirmedExecutionRegistry {
        &self.confirmed
    }

    /// Names of confirmation-required tools, for the UI
    pub fn tools_requiring_confirmation(&self) -> Vec<String> {
        gate::tools_requiring_confirmation(&self.registry)
    }

    /// Describe every mismatch between the registry and the confirmed executors
    pub fn pairing_problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for tool in self.registry.iter() {
            let confirmed = self.confirmed.contains(tool.name());
            if gate::requires_confirmation(tool) && !confirmed {
                problems.push(format!(
                    "confirmation-required tool '{}' has no confirmed executor",
                    tool.name()
                ));
            } else if !gate::requires_confirmation(tool) && confirmed {
                problems.push(format!(
                    "auto-executing tool '{}' also has a confirmed executor",
                    tool.name()
                ));
            }
        }
        for name in self.confirmed.names() {
            if !self.registry.contains(name) {
                problems.push(format!("confirmed executor '{name}' has no tool descriptor"));
            }
        }
        problems
    }

    fn transition(&self, invocation: &Invocation, state: InvocationState) {
        debug!(
            invocation_id = %invocation.invocation_id,
            tool_name = %invocation.tool_name,
            state = ?state,
            "Invocation state changed"
        );
        if let Some(observer) = &self.observer {
            observer.on_transition(invocation, state);
        }
    }

    fn resolved(&self, invocation: &Invocation, result: ToolResult) -> ToolResult {
        self.transition(invocation, InvocationState::Resolved);
        result
    }

    /// Look up and validate, or produce the early-exit result
    fn admit(
        &self,
        invocation: &Invocation,
    ) -> std::result::Result<&Arc<ToolDescriptor>, ToolResult> {
        let Some(descriptor) = self.registry.get(&invocation.tool_name) else {
            let error = Error::UnknownTool(invocation.tool_name.clone());
            warn!(tool_name = %invocation.tool_name, "Model requested unknown tool");
            return Err(ToolResult::from_error(invocation, ResolutionKind::UnknownTool, &error));
        };

        if let Err(error) = descriptor.validate(&invocation.args) {
            warn!(tool_name = %invocation.tool_name, error = %error, "Tool input rejected");
            return Err(ToolResult::from_error(invocation, ResolutionKind::InvalidInput, &error));
        }

        Ok(descriptor)
    }

    /// Dispatch one invocation
    ///
    /// Auto-executing tools run to completion before this returns.
    /// Confirmation-required tools return
    /// [`Dispatch::AwaitingConfirmation`] without running anything.
    pub async fn dispatch(&self, invocation: Invocation) -> Dispatch {
        self.transition(&invocation, InvocationState::Pending);

        let descriptor = match self.admit(&invocation) {
            Ok(descriptor) => descriptor,
            Err(result) => return Dispatch::Resolved(self.resolved(&invocation, result)),
        };

        match gate::classify(descriptor) {
            ExecutionMode::ConfirmFirst => {
                info!(
                    invocation_id = %invocation.invocation_id,
                    tool_name = %invocation.tool_name,
                    "Tool requires confirmation"
                );
                self.transition(&invocation, InvocationState::AwaitingConfirmation);
                Dispatch::AwaitingConfirmation(PendingInvocation { invocation })
            }
            ExecutionMode::Auto(executor) => {
                self.transition(&invocation, InvocationState::AutoRunning);
                let result = run_executor(executor.as_ref(), &invocation).await;
                Dispatch::Resolved(self.resolved(&invocation, result))
            }
        }
    }

    /// Dispatch several invocations concurrently, preserving input order
    pub async fn dispatch_all(&self, invocations: Vec<Invocation>) -> Vec<Dispatch> {
        join_all(invocations.into_iter().map(|inv| self.dispatch(inv))).await
    }

    /// Apply a human decision to a pending invocation
    pub async fn resolve(&self, pending: PendingInvocation, decision: Decision) -> ToolResult {
        let invocation = pending.invocation;

        if decision == Decision::Denied {
            info!(
                invocation_id = %invocation.invocation_id,
                tool_name = %invocation.tool_name,
                "Tool call declined"
            );
            let result = ToolResult::new(
                &invocation,
                ResolutionKind::Declined,
                DECLINED_RESULT.to_string(),
            );
            return self.resolved(&invocation, result);
        }

        // pending calls may come back from a persisted transcript
        if let Err(result) = self.admit(&invocation) {
            return self.resolved(&invocation, result);
        }

        self.transition(&invocation, InvocationState::Running);

        let Some(executor) = self.confirmed.get(&invocation.tool_name) else {
            let error = Error::MissingExecutor(invocation.tool_name.clone());
            warn!(
                invocation_id = %invocation.invocation_id,
                tool_name = %invocation.tool_name,
                "Approved tool has no confirmed executor"
            );
            let result =
                ToolResult::from_error(&invocation, ResolutionKind::MissingExecutor, &error);
            return self.resolved(&invocation, result);
        };

        let result = run_executor(executor.as_ref(), &invocation).await;
        self.resolved(&invocation, result)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("tools", &self.registry.names())
            .field("confirmed", &self.confirmed.names())
            .finish_non_exhaustive()
    }
}

async fn run_executor(executor: &dyn Executor, invocation: &Invocation) -> ToolResult {
    let input_preview: String = invocation.args.to_string().chars().take(500).collect();
    info!(
        tool_name = %invocation.tool_name,
        invocation_id = %invocation.invocation_id,
        input_preview = %input_preview,
        "Executing tool"
    );

    let start_time = Instant::now();
    let outcome = AssertUnwindSafe(executor.execute(invocation.args.clone()))
        .catch_unwind()
        .await;
    let duration_ms = start_time.elapsed().as_millis() as u64;

    match outcome {
        Ok(Ok(output)) => {
            let content = output.into_text();
            let result_preview: String = content.chars().take(500).collect();
            info!(
                tool_name = %invocation.tool_name,
                duration_ms = duration_ms,
                result_length = content.len(),
                result_preview = %result_preview,
                "Tool execution succeeded"
            );
            ToolResult::new(invocation, ResolutionKind::Completed, content)
        }
        Ok(Err(error)) => {
            warn!(
                tool_name = %invocation.tool_name,
                duration_ms = duration_ms,
                error = %error,
                "Tool execution failed"
            );
            ToolResult::from_error(invocation, ResolutionKind::Failed, &error)
        }
        Err(_) => {
            warn!(
                tool_name = %invocation.tool_name,
                duration_ms = duration_ms,
                "Tool execution panicked"
            );
            let error = Error::ExecutionFailed(format!("tool '{}' panicked", invocation.tool_name));
            ToolResult::from_error(invocation, ResolutionKind::Failed, &error)
        }
    }
}

/// Builds a [`Dispatcher`] with confirmation-required tools paired to their
/// executors in a single call
#[derive(Default)]
pub struct DispatcherBuilder {
    tools: Vec<ToolDescriptor>,
    confirmed: ConfirmedExecutionRegistry,
    observer: Option<Arc<dyn DispatchObserver>>,
}

impl DispatcherBuilder {
    /// Register an auto-executing tool (must carry an inline executor)
    pub fn tool(mut self, tool: ToolDescriptor) -> Self {
        self.tools.push(tool);
        self
    }

    /// Register a confirmation-required tool together with the executor
    /// that runs once a human approves
    ///
    /// Any inline executor on `tool` is discarded so the gate classifies it
    /// as confirmation-required.
    pub fn confirmed_tool(mut self, mut tool: ToolDescriptor, executor: Arc<dyn Executor>) -> Self {
        tool.take_executor();
        self.confirmed.register(tool.name().to_string(), executor);
        self.tools.push(tool);
        self
    }

    /// Attach an observer
    pub fn observer(mut self, observer: Arc<dyn DispatchObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Build, rejecting duplicate names and unpaired tools
    pub fn build(self) -> Result<Dispatcher> {
        let registry = self
            .tools
            .into_iter()
            .fold(CapabilityRegistry::builder(), |b, t| b.register(t))
            .build()?;

        let dispatcher = Dispatcher {
            registry: Arc::new(registry),
            confirmed: self.confirmed,
            observer: self.observer,
        };

        let problems = dispatcher.pairing_problems();
        if !problems.is_empty() {
            return Err(Error::Configuration(problems.join("; ")));
        }
        Ok(dispatcher)
    }
}
