//! Runtime wiring with dependency injection
//!
//! The AgentRuntime owns the shared collaborators (search oracle, scheduler,
//! dispatcher) and hands out chat agents bound to them.

use autorag_core::Result;
use autorag_llm::LLMProvider;
use autorag_scheduler::InMemoryScheduler;
use autorag_search::{HttpSearchOracle, SearchOracle};
use autorag_tools::{DispatchObserver, Dispatcher};
use autorag_utils::AppConfig;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::agent::{ChatAgent, ChatConfig, TurnOutcome};
use crate::toolset::ToolSet;

/// Shared resources for chat agents
///
/// # Example
///
/// ```no_run
/// use autorag_runtime::{AgentRuntime, ChatConfig};
/// use autorag_utils::AppConfig;
///
/// # use std::sync::Arc;
/// # use autorag_core::Error;
/// # fn example(provider: Arc<dyn autorag_llm::LLMProvider>) -> autorag_core::Result<()> {
/// let config = AppConfig::from_env().map_err(|e| Error::Configuration(e.to_string()))?;
/// let runtime = AgentRuntime::builder().app_config(config).build()?;
///
/// let agent = runtime.create_chat_agent(provider, ChatConfig::default());
/// # let _ = agent;
/// # Ok(())
/// # }
/// ```
pub struct AgentRuntime {
    dispatcher: Arc<Dispatcher>,
    scheduler: Arc<InMemoryScheduler>,
    app_config: AppConfig,
}

impl AgentRuntime {
    /// Create a new runtime builder
    pub fn builder() -> AgentRuntimeBuilder {
        AgentRuntimeBuilder::new()
    }

    /// Get a reference to the dispatcher
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Get a reference to the scheduler
    pub fn scheduler(&self) -> &Arc<InMemoryScheduler> {
        &self.scheduler
    }

    /// Get a reference to the application configuration
    pub fn app_config(&self) -> &AppConfig {
        &self.app_config
    }

    /// Create a chat agent with an empty transcript
    pub fn create_chat_agent(
        &self,
        provider: Arc<dyn LLMProvider>,
        config: ChatConfig,
    ) -> ChatAgent {
        ChatAgent::new(provider, self.dispatcher.clone(), config)
    }

    /// Run every one-shot scheduled task due at `now` through `agent`
    ///
    /// Stops early if a task's turn suspends for confirmation; the remaining
    /// due tasks are put back on the scheduler unchanged. A task whose turn
    /// fails is put back together with everything behind it, and nothing is
    /// taken while the agent is already suspended.
    pub async fn run_due_tasks(
        &self,
        agent: &mut ChatAgent,
        now: DateTime<Utc>,
    ) -> Result<Vec<TurnOutcome>> {
        if agent.is_suspended() {
            debug!("Agent awaits confirmation, leaving due tasks queued");
            return Ok(Vec::new());
        }

        let due = self.scheduler.take_due(now).await;
        let mut outcomes = Vec::new();

        for (index, task) in due.iter().enumerate() {
            match agent.run_scheduled_task(task).await {
                Ok(outcome) => {
                    let suspended = matches!(outcome, TurnOutcome::AwaitingConfirmation { .. });
                    outcomes.push(outcome);
                    if suspended {
                        let remaining = &due[index + 1..];
                        if !remaining.is_empty() {
                            info!(
                                count = remaining.len(),
                                "Requeueing scheduled tasks behind a suspended turn"
                            );
                            self.scheduler.restore(remaining.to_vec()).await;
                        }
                        break;
                    }
                }
                Err(e) => {
                    let requeued = due[index..].to_vec();
                    warn!(
                        error = %e,
                        count = requeued.len(),
                        "Scheduled task failed, requeueing"
                    );
                    self.scheduler.restore(requeued).await;
                    return Err(e);
                }
            }
        }

        Ok(outcomes)
    }
}

/// Builder for AgentRuntime
pub struct AgentRuntimeBuilder {
    app_config: AppConfig,
    oracle: Option<Arc<dyn SearchOracle>>,
    scheduler: Option<Arc<InMemoryScheduler>>,
    observer: Option<Arc<dyn DispatchObserver>>,
}

impl AgentRuntimeBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            app_config: AppConfig::default(),
            oracle: None,
            scheduler: None,
            observer: None,
        }
    }

    /// Set the application configuration
    pub fn app_config(mut self, config: AppConfig) -> Self {
        self.app_config = config;
        self
    }

    /// Use this oracle instead of the HTTP client built from configuration
    pub fn oracle(mut self, oracle: Arc<dyn SearchOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Share an existing scheduler
    pub fn scheduler(mut self, scheduler: Arc<InMemoryScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Attach a dispatch observer
    pub fn observer(mut self, observer: Arc<dyn DispatchObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Build the runtime
    ///
    /// Without an explicit oracle this needs credentials in the configuration.
    pub fn build(self) -> Result<AgentRuntime> {
        let oracle: Arc<dyn SearchOracle> = match self.oracle {
            Some(oracle) => oracle,
            None => Arc::new(HttpSearchOracle::from_config(&self.app_config)?),
        };
        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Arc::new(InMemoryScheduler::new()));

        let mut tool_set = ToolSet::from_config(&self.app_config, oracle, scheduler.clone())?;
        if let Some(observer) = self.observer {
            tool_set = tool_set.with_observer(observer);
        }

        Ok(AgentRuntime {
            dispatcher: Arc::new(tool_set.into_dispatcher()?),
            scheduler,
            app_config: self.app_config,
        })
    }
}

impl Default for AgentRuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
