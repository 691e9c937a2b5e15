//! Chat agent loop
//!
//! [`ChatAgent`] owns one conversation transcript and runs the loop:
//! 1. Send the transcript and the registry's tool definitions to the model
//! 2. On plain text, the turn is complete
//! 3. On tool calls, dispatch them all concurrently
//! 4. If any call needs a human decision, suspend and report the pending
//!    calls; [`ChatAgent::decide`] resumes once none are left
//! 5. Otherwise append the results and loop back
//!
//! Tool results are appended in the order the model issued the calls,
//! never in completion order.

use crate::prompt::SYSTEM_PROMPT;
use async_trait::async_trait;
use autorag_core::{Error, Result};
use autorag_llm::{CompletionRequest, LLMProvider, Message, StopReason, ToolDefinition};
use autorag_scheduler::ScheduleHandle;
use autorag_tools::{Decision, Dispatch, Dispatcher, Invocation, PendingInvocation, ToolResult};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Returned when the loop runs out of iterations
pub const MAX_ITERATIONS_REACHED: &str = "Max iterations reached without completion";

/// Returned when the model hit its token limit
pub const RESPONSE_TRUNCATED: &str = "Response truncated due to token limit";

/// Callbacks during a turn, e.g. to stream tool status to a client
#[async_trait]
pub trait AgentEventHandler: Send + Sync {
    /// A tool call was handed to the dispatcher
    async fn on_tool_start(&self, _invocation: &Invocation) {}

    /// A tool call resolved
    async fn on_tool_done(&self, _result: &ToolResult) {}

    /// A tool call is waiting for a human decision
    async fn on_confirmation_required(&self, _pending: &PendingInvocation) {}

    /// The turn completed with final text
    async fn on_complete(&self, _text: &str) {}
}

/// Configuration for the chat loop
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Maximum model calls per user message (prevents infinite loops)
    pub max_iterations: usize,

    /// Model identifier passed to the provider
    pub model: String,

    pub system_prompt: String,

    /// Max tokens per completion
    pub max_tokens: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            model: "claude-sonnet-4-5-20250929".to_string(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            max_tokens: 4096,
        }
    }
}

/// How a turn ended
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// The model produced its final answer
    Completed { text: String },
    /// The turn is suspended until every listed call is decided
    AwaitingConfirmation { pending: Vec<PendingInvocation> },
}

/// Tool calls of a suspended model turn
///
/// Results are slotted by call position, so repeated or empty ids from the
/// model never collapse two calls into one.
#[derive(Debug)]
struct SuspendedTurn {
    iteration: usize,
    results: Vec<Option<ToolResult>>,
    pending: Vec<PendingInvocation>,
    /// Call position of each entry in `pending`
    pending_slots: Vec<usize>,
}

impl SuspendedTurn {
    fn new(iteration: usize, calls: usize) -> Self {
        Self {
            iteration,
            results: vec![None; calls],
            pending: Vec::new(),
            pending_slots: Vec::new(),
        }
    }

    fn resolved_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_some()).count()
    }

    fn into_results(self) -> Vec<ToolResult> {
        self.results.into_iter().flatten().collect()
    }
}

/// A conversation with the model, driven through the dispatcher
pub struct ChatAgent {
    provider: Arc<dyn LLMProvider>,
    dispatcher: Arc<Dispatcher>,
    config: ChatConfig,
    transcript: Vec<Message>,
    suspended: Option<SuspendedTurn>,
    event_handler: Option<Arc<dyn AgentEventHandler>>,
}

impl ChatAgent {
    /// Create a new chat agent with an empty transcript
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        dispatcher: Arc<Dispatcher>,
        config: ChatConfig,
    ) -> Self {
        Self {
            provider,
            dispatcher,
            config,
            transcript: Vec::new(),
            suspended: None,
            event_handler: None,
        }
    }

    /// Set the event handler for receiving turn events
    pub fn with_event_handler(mut self, handler: Arc<dyn AgentEventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Continue from an existing transcript
    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.transcript = history;
        self
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// Calls of the suspended turn still waiting for a decision
    pub fn pending(&self) -> &[PendingInvocation] {
        self.suspended.as_ref().map_or(&[], |turn| turn.pending.as_slice())
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended.is_some()
    }

    /// Append a user message and run the loop
    ///
    /// Fails while a previous turn is still awaiting confirmation.
    pub async fn send(&mut self, text: impl Into<String>) -> Result<TurnOutcome> {
        if self.is_suspended() {
            return Err(Error::Generic(
                "a tool call is awaiting confirmation; decide it before sending a new message"
                    .to_string(),
            ));
        }
        self.transcript.push(Message::user(text));
        self.run_loop(0).await
    }

    /// Run a turn for a scheduled task that has come due
    pub async fn run_scheduled_task(&mut self, task: &ScheduleHandle) -> Result<TurnOutcome> {
        info!(schedule_id = %task.id, "Running scheduled task");
        self.send(format!("Running scheduled task: {}", task.payload))
            .await
    }

    /// Apply a human decision to one pending call
    ///
    /// Returns the same pending list (minus the decided call) while other
    /// calls of the turn are undecided, otherwise resumes the loop.
    pub async fn decide(&mut self, invocation_id: &str, decision: Decision) -> Result<TurnOutcome> {
        let Some(turn) = self.suspended.as_mut() else {
            return Err(Error::Generic(format!(
                "no pending tool call with id '{invocation_id}'"
            )));
        };
        let Some(index) = turn
            .pending
            .iter()
            .position(|p| p.invocation_id() == invocation_id)
        else {
            return Err(Error::Generic(format!(
                "no pending tool call with id '{invocation_id}'"
            )));
        };

        let pending = turn.pending.remove(index);
        let slot = turn.pending_slots.remove(index);
        info!(
            invocation_id = %invocation_id,
            tool_name = %pending.tool_name(),
            decision = decision.as_wire(),
            "Tool call decided"
        );

        let result = self.dispatcher.resolve(pending, decision).await;
        if let Some(handler) = &self.event_handler {
            handler.on_tool_done(&result).await;
        }

        let Some(turn) = self.suspended.as_mut() else {
            return Err(Error::Generic("suspended turn vanished".to_string()));
        };
        turn.results[slot] = Some(result);
        if !turn.pending.is_empty() {
            return Ok(TurnOutcome::AwaitingConfirmation {
                pending: turn.pending.clone(),
            });
        }

        let Some(turn) = self.suspended.take() else {
            return Err(Error::Generic("suspended turn vanished".to_string()));
        };
        let iteration = turn.iteration;
        self.append_results(turn.into_results());
        self.run_loop(iteration).await
    }

    /// Tool definitions advertised to the model
    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.dispatcher
            .registry()
            .iter()
            .map(|tool| {
                ToolDefinition::new(
                    tool.name(),
                    tool.description(),
                    tool.input_schema().to_json_schema(),
                )
            })
            .collect()
    }

    fn append_results(&mut self, results: Vec<ToolResult>) {
        for result in results {
            self.transcript.push(Message::tool_result(
                result.invocation_id,
                result.content,
                result.is_error,
            ));
        }
    }

    async fn complete(&self, text: String) -> TurnOutcome {
        if let Some(handler) = &self.event_handler {
            handler.on_complete(&text).await;
        }
        TurnOutcome::Completed { text }
    }

    async fn run_loop(&mut self, mut iteration: usize) -> Result<TurnOutcome> {
        loop {
            iteration += 1;
            if iteration > self.config.max_iterations {
                warn!(
                    "Max iterations ({}) reached, stopping",
                    self.config.max_iterations
                );
                return Ok(self.complete(MAX_ITERATIONS_REACHED.to_string()).await);
            }

            info!(
                iteration = iteration,
                max_iterations = self.config.max_iterations,
                "Agent iteration started"
            );

            let tools = self.tool_definitions();
            debug!(tool_count = tools.len(), "Available tools");

            let request = CompletionRequest::builder(&self.config.model)
                .messages(self.transcript.clone())
                .system(self.config.system_prompt.clone())
                .max_tokens(self.config.max_tokens)
                .tools(tools)
                .build();

            info!(
                provider = self.provider.name(),
                model = %self.config.model,
                max_tokens = self.config.max_tokens,
                "Sending request to LLM"
            );
            let response = self
                .provider
                .complete(request)
                .await
                .map_err(|e| Error::RemoteOperation(e.to_string()))?;

            info!(
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "LLM response received"
            );

            let response_preview: String = response
                .message
                .text()
                .unwrap_or("")
                .chars()
                .take(300)
                .collect();
            debug!(response_preview = %response_preview, "LLM response content preview");

            self.transcript.push(response.message.clone());

            match response.stop_reason {
                StopReason::EndTurn => {
                    let text = response.message.text().unwrap_or("No response").to_string();
                    info!(
                        iteration = iteration,
                        response_length = text.len(),
                        "Agent completed naturally"
                    );
                    return Ok(self.complete(text).await);
                }

                StopReason::MaxTokens => {
                    warn!("Hit max tokens in LLM response");
                    return Ok(self.complete(RESPONSE_TRUNCATED.to_string()).await);
                }

                StopReason::ToolUse => {
                    let invocations: Vec<Invocation> = response
                        .message
                        .tool_calls()
                        .into_iter()
                        .map(|call| Invocation::new(call.id, call.name, call.input))
                        .collect();

                    if invocations.is_empty() {
                        warn!("No tool calls despite ToolUse stop reason");
                        let text = response.message.text().unwrap_or("No response").to_string();
                        return Ok(self.complete(text).await);
                    }

                    info!(tool_count = invocations.len(), "Agent requested tool use");
                    if let Some(outcome) = self.dispatch_turn(invocations, iteration).await {
                        return Ok(outcome);
                    }
                }
            }
        }
    }

    /// Dispatch one model turn's calls; `Some` when the turn suspends
    async fn dispatch_turn(
        &mut self,
        invocations: Vec<Invocation>,
        iteration: usize,
    ) -> Option<TurnOutcome> {
        let mut turn = SuspendedTurn::new(iteration, invocations.len());

        if let Some(handler) = &self.event_handler {
            for invocation in &invocations {
                handler.on_tool_start(invocation).await;
            }
        }

        // dispatch_all preserves call order
        let dispatches = self.dispatcher.dispatch_all(invocations).await;
        for (slot, dispatch) in dispatches.into_iter().enumerate() {
            match dispatch {
                Dispatch::Resolved(result) => {
                    if let Some(handler) = &self.event_handler {
                        handler.on_tool_done(&result).await;
                    }
                    turn.results[slot] = Some(result);
                }
                Dispatch::AwaitingConfirmation(pending) => {
                    if let Some(handler) = &self.event_handler {
                        handler.on_confirmation_required(&pending).await;
                    }
                    turn.pending.push(pending);
                    turn.pending_slots.push(slot);
                }
            }
        }

        if turn.pending.is_empty() {
            info!(
                result_count = turn.resolved_count(),
                "Tool execution completed, continuing agent loop"
            );
            self.append_results(turn.into_results());
            return None;
        }

        info!(
            pending = turn.pending.len(),
            resolved = turn.resolved_count(),
            "Turn suspended awaiting confirmation"
        );
        let pending = turn.pending.clone();
        self.suspended = Some(turn);
        Some(TurnOutcome::AwaitingConfirmation { pending })
    }
}

/// Builder for ChatAgent
pub struct ChatAgentBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    dispatcher: Option<Arc<Dispatcher>>,
    config: ChatConfig,
    event_handler: Option<Arc<dyn AgentEventHandler>>,
}

impl ChatAgentBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            provider: None,
            dispatcher: None,
            config: ChatConfig::default(),
            event_handler: None,
        }
    }

    /// Set the LLM provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the dispatcher
    pub fn dispatcher(mut self, dispatcher: Arc<Dispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Set the full configuration
    pub fn config(mut self, config: ChatConfig) -> Self {
        self.config = config;
        self
    }

    /// Set maximum iterations
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the system prompt
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    /// Set max tokens
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Set the event handler
    pub fn event_handler(mut self, handler: Arc<dyn AgentEventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Build the agent
    pub fn build(self) -> Result<ChatAgent> {
        let provider = self
            .provider
            .ok_or_else(|| Error::Configuration("Provider not set".to_string()))?;
        let dispatcher = self
            .dispatcher
            .ok_or_else(|| Error::Configuration("Dispatcher not set".to_string()))?;

        let mut agent = ChatAgent::new(provider, dispatcher, self.config);
        agent.event_handler = self.event_handler;
        Ok(agent)
    }
}

impl Default for ChatAgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autorag_llm::{CompletionResponse, ContentBlock, LLMError};
    use autorag_tools::{
        DECLINED_RESULT, Field, InputSchema, ResolutionKind, ToolDescriptor, ToolOutput,
        executor_fn,
    };
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Provider replaying scripted responses and recording requests
    struct ScriptedProvider {
        responses: Mutex<VecDeque<CompletionResponse>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<CompletionResponse>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> autorag_llm::Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| LLMError::UnexpectedResponse("script exhausted".to_string()))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn calls(blocks: &[(&str, &str, serde_json::Value)]) -> CompletionResponse {
        CompletionResponse::tool_use(Message::assistant_blocks(
            blocks
                .iter()
                .map(|(id, name, input)| ContentBlock::ToolUse {
                    id: (*id).to_string(),
                    name: (*name).to_string(),
                    input: input.clone(),
                })
                .collect(),
        ))
    }

    fn dispatcher() -> Arc<Dispatcher> {
        let echo = ToolDescriptor::new(
            "echo",
            "Echo the text back",
            InputSchema::empty().field(Field::string("text", "Text to echo")),
        )
        .with_executor(executor_fn(|args| async move {
            Ok(ToolOutput::Text(args["text"].as_str().unwrap_or_default().to_string()))
        }));
        let wipe = ToolDescriptor::new("wipe", "Wipe the disk", InputSchema::empty());

        Arc::new(
            Dispatcher::builder()
                .tool(echo)
                .confirmed_tool(wipe, executor_fn(|_| async { Ok(ToolOutput::from("wiped")) }))
                .build()
                .unwrap(),
        )
    }

    fn tool_results(transcript: &[Message]) -> Vec<(String, String, bool)> {
        transcript
            .iter()
            .filter_map(|m| m.tool_result_block())
            .map(|(id, content, is_error)| (id.to_string(), content.to_string(), is_error))
            .collect()
    }

    #[test]
    fn test_builder() {
        let builder = ChatAgentBuilder::new()
            .model("test-model")
            .max_iterations(5)
            .system_prompt("Test prompt");

        assert_eq!(builder.config.model, "test-model");
        assert_eq!(builder.config.max_iterations, 5);
        assert_eq!(builder.config.system_prompt, "Test prompt");
        assert!(matches!(builder.build(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_default_config() {
        let config = ChatConfig::default();
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.system_prompt, SYSTEM_PROMPT);
    }

    #[tokio::test]
    async fn test_plain_answer() {
        let provider = ScriptedProvider::new(vec![CompletionResponse::text("Hello!")]);
        let mut agent = ChatAgent::new(provider.clone(), dispatcher(), ChatConfig::default());

        let outcome = agent.send("Hi").await.unwrap();
        assert_eq!(outcome, TurnOutcome::Completed { text: "Hello!".to_string() });
        assert_eq!(agent.transcript().len(), 2);

        let requests = provider.requests.lock().unwrap();
        let names: Vec<&str> = requests[0].tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["echo", "wipe"]);
        assert_eq!(requests[0].system.as_deref(), Some(SYSTEM_PROMPT));
    }

    #[tokio::test]
    async fn test_auto_tools_loop_back_in_call_order() {
        let provider = ScriptedProvider::new(vec![
            calls(&[
                ("c1", "echo", json!({"text": "one"})),
                ("c2", "echo", json!({"text": "two"})),
            ]),
            CompletionResponse::text("done"),
        ]);
        let mut agent = ChatAgent::new(provider.clone(), dispatcher(), ChatConfig::default());

        let outcome = agent.send("echo twice").await.unwrap();
        assert_eq!(outcome, TurnOutcome::Completed { text: "done".to_string() });
        assert_eq!(
            tool_results(agent.transcript()),
            vec![
                ("c1".to_string(), "one".to_string(), false),
                ("c2".to_string(), "two".to_string(), false),
            ]
        );
        assert_eq!(provider.requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_confirmation_suspends_until_all_decided() {
        let provider = ScriptedProvider::new(vec![
            calls(&[
                ("c1", "wipe", json!({})),
                ("c2", "echo", json!({"text": "meanwhile"})),
                ("c3", "wipe", json!({})),
            ]),
            CompletionResponse::text("finished"),
        ]);
        let mut agent = ChatAgent::new(provider.clone(), dispatcher(), ChatConfig::default());

        let TurnOutcome::AwaitingConfirmation { pending } = agent.send("wipe it").await.unwrap()
        else {
            panic!("expected suspension");
        };
        assert_eq!(pending.len(), 2);
        assert!(agent.send("another message").await.is_err());

        let outcome = agent.decide("c3", Decision::Denied).await.unwrap();
        let TurnOutcome::AwaitingConfirmation { pending } = outcome else {
            panic!("c1 is still undecided");
        };
        assert_eq!(pending[0].invocation_id(), "c1");
        assert_eq!(provider.requests.lock().unwrap().len(), 1);

        let outcome = agent.decide("c1", Decision::Approved).await.unwrap();
        assert_eq!(outcome, TurnOutcome::Completed { text: "finished".to_string() });
        assert!(!agent.is_suspended());

        assert_eq!(
            tool_results(agent.transcript()),
            vec![
                ("c1".to_string(), "wiped".to_string(), false),
                ("c2".to_string(), "meanwhile".to_string(), false),
                ("c3".to_string(), DECLINED_RESULT.to_string(), true),
            ]
        );
    }

    #[tokio::test]
    async fn test_repeated_call_ids_keep_every_result() {
        let provider = ScriptedProvider::new(vec![
            calls(&[
                ("", "echo", json!({"text": "one"})),
                ("", "wipe", json!({})),
                ("", "echo", json!({"text": "two"})),
            ]),
            CompletionResponse::text("done"),
        ]);
        let mut agent = ChatAgent::new(provider, dispatcher(), ChatConfig::default());

        let outcome = agent.send("echo and wipe").await.unwrap();
        assert!(matches!(outcome, TurnOutcome::AwaitingConfirmation { .. }));

        let outcome = agent.decide("", Decision::Approved).await.unwrap();
        assert_eq!(outcome, TurnOutcome::Completed { text: "done".to_string() });
        assert_eq!(
            tool_results(agent.transcript()),
            vec![
                (String::new(), "one".to_string(), false),
                (String::new(), "wiped".to_string(), false),
                (String::new(), "two".to_string(), false),
            ]
        );
    }

    #[tokio::test]
    async fn test_decide_unknown_id() {
        let provider = ScriptedProvider::new(vec![]);
        let mut agent = ChatAgent::new(provider, dispatcher(), ChatConfig::default());
        assert!(agent.decide("nope", Decision::Approved).await.is_err());
    }

    #[tokio::test]
    async fn test_max_iterations() {
        let provider = ScriptedProvider::new(vec![
            calls(&[("c1", "echo", json!({"text": "a"}))]),
            calls(&[("c2", "echo", json!({"text": "b"}))]),
            calls(&[("c3", "echo", json!({"text": "c"}))]),
        ]);
        let mut agent = ChatAgentBuilder::new()
            .provider(provider.clone())
            .dispatcher(dispatcher())
            .max_iterations(2)
            .build()
            .unwrap();

        let outcome = agent.send("loop forever").await.unwrap();
        assert_eq!(
            outcome,
            TurnOutcome::Completed {
                text: MAX_ITERATIONS_REACHED.to_string()
            }
        );
        assert_eq!(provider.requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_narrated_to_model() {
        let provider = ScriptedProvider::new(vec![
            calls(&[("c1", "deleteEverything", json!({}))]),
            CompletionResponse::text("Sorry, I can't do that."),
        ]);
        let mut agent = ChatAgent::new(provider, dispatcher(), ChatConfig::default());

        agent.send("delete everything").await.unwrap();
        assert_eq!(
            tool_results(agent.transcript()),
            vec![(
                "c1".to_string(),
                "Error: Tool not found: deleteEverything".to_string(),
                true
            )]
        );
    }

    #[tokio::test]
    async fn test_provider_failure_is_an_error() {
        let provider = ScriptedProvider::new(vec![]);
        let mut agent = ChatAgent::new(provider, dispatcher(), ChatConfig::default());
        assert!(matches!(agent.send("hi").await, Err(Error::RemoteOperation(_))));
    }

    #[tokio::test]
    async fn test_event_handler_sees_lifecycle() {
        #[derive(Default)]
        struct Recorder(Mutex<Vec<String>>);

        #[async_trait]
        impl AgentEventHandler for Recorder {
            async fn on_tool_start(&self, invocation: &Invocation) {
                self.0.lock().unwrap().push(format!("start {}", invocation.tool_name));
            }
            async fn on_tool_done(&self, result: &ToolResult) {
                self.0.lock().unwrap().push(format!("done {:?}", result.kind));
            }
            async fn on_confirmation_required(&self, pending: &PendingInvocation) {
                self.0.lock().unwrap().push(format!("confirm {}", pending.tool_name()));
            }
            async fn on_complete(&self, text: &str) {
                self.0.lock().unwrap().push(format!("complete {text}"));
            }
        }

        let recorder = Arc::new(Recorder::default());
        let provider = ScriptedProvider::new(vec![
            calls(&[("c1", "wipe", json!({}))]),
            CompletionResponse::text("ok"),
        ]);
        let mut agent = ChatAgent::new(provider, dispatcher(), ChatConfig::default())
            .with_event_handler(recorder.clone());

        agent.send("wipe").await.unwrap();
        agent.decide("c1", Decision::Denied).await.unwrap();

        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![
                "start wipe".to_string(),
                "confirm wipe".to_string(),
                format!("done {:?}", ResolutionKind::Declined),
                "complete ok".to_string(),
            ]
        );
    }
}
