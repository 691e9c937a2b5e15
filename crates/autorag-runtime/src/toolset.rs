//! Default tool set
//!
//! Assembles every capability the assistant offers into one [`Dispatcher`].
//! Confirmation-required tools are paired with their confirmed executor in
//! the same builder call, so an unpaired tool fails construction.

use autorag_core::{Error, Result};
use autorag_scheduler::{Scheduler, scheduling_tools};
use autorag_search::{KnowledgeSearch, KnowledgeSource, SearchOracle};
use autorag_tools::{
    DispatchObserver, Dispatcher, Executor, Field, InputSchema, ToolDescriptor, ToolOutput,
    executor_fn, parse_args,
};
use autorag_utils::AppConfig;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

pub const GET_WEATHER_INFORMATION: &str = "getWeatherInformation";
pub const GET_LOCAL_TIME: &str = "getLocalTime";

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    city: String,
}

/// `getWeatherInformation`: needs a human decision before it runs
pub fn weather_tool() -> ToolDescriptor {
    ToolDescriptor::new(
        GET_WEATHER_INFORMATION,
        "Show the weather in a given city to the user",
        InputSchema::empty().field(Field::string("city", "The city to get the weather for")),
    )
}

/// Executor that runs once `getWeatherInformation` is approved
pub fn weather_executor() -> Arc<dyn Executor> {
    executor_fn(|args| async move {
        let WeatherArgs { city } = parse_args(GET_WEATHER_INFORMATION, args)?;
        Ok(ToolOutput::Text(format!("The weather in {city} is sunny")))
    })
}

/// `getLocalTime`: runs immediately
pub fn local_time_tool() -> ToolDescriptor {
    ToolDescriptor::new(
        GET_LOCAL_TIME,
        "Get the local time for a specified location",
        InputSchema::empty().field(Field::string("location", "The location to get the time for")),
    )
    .with_executor(executor_fn(|_args| async { Ok(ToolOutput::from("10am")) }))
}

/// Collaborators the default tool set is built from
pub struct ToolSet {
    pub oracle: Arc<dyn SearchOracle>,
    pub scheduler: Arc<dyn Scheduler>,
    pub knowledge: KnowledgeSource,
    pub governance: KnowledgeSource,
    pub observer: Option<Arc<dyn DispatchObserver>>,
}

impl ToolSet {
    /// Tool set over the sources named in `config`
    pub fn from_config(
        config: &AppConfig,
        oracle: Arc<dyn SearchOracle>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::Configuration(e.to_string()))?;

        Ok(Self {
            oracle,
            scheduler,
            knowledge: KnowledgeSource::general(&config.knowledge_source),
            governance: KnowledgeSource::governance(&config.governance_source),
            observer: None,
        })
    }

    /// Attach a dispatch observer
    pub fn with_observer(mut self, observer: Arc<dyn DispatchObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Build the dispatcher
    pub fn into_dispatcher(self) -> Result<Dispatcher> {
        let knowledge = KnowledgeSearch::new(self.oracle.clone(), self.knowledge);
        let governance = KnowledgeSearch::new(self.oracle, self.governance);

        let mut builder = Dispatcher::builder()
            .tool(knowledge.descriptor())
            .tool(governance.descriptor())
            .tool(local_time_tool())
            .confirmed_tool(weather_tool(), weather_executor());

        for tool in scheduling_tools(self.scheduler) {
            builder = builder.tool(tool);
        }
        if let Some(observer) = self.observer {
            builder = builder.observer(observer);
        }

        let dispatcher = builder.build()?;
        info!(
            tools = ?dispatcher.registry().names(),
            confirmation_required = ?dispatcher.tools_requiring_confirmation(),
            "Tool set assembled"
        );
        Ok(dispatcher)
    }
}
