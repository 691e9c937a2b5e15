//! Capability registry and confirmed-execution registry

use crate::tool::{Executor, ToolDescriptor};
use autorag_core::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable, ordered, name-keyed set of tools exposed to the model
///
/// Built once through [`CapabilityRegistryBuilder`]; lookups never lock.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    tools: Vec<Arc<ToolDescriptor>>,
    index: HashMap<String, usize>,
}

impl CapabilityRegistry {
    /// Start building a registry
    pub fn builder() -> CapabilityRegistryBuilder {
        CapabilityRegistryBuilder::default()
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Arc<ToolDescriptor>> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Check whether a tool is registered
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Tools in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ToolDescriptor>> {
        self.tools.iter()
    }

    /// Tool names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Builder for [`CapabilityRegistry`]
#[derive(Debug, Default)]
pub struct CapabilityRegistryBuilder {
    tools: Vec<ToolDescriptor>,
}

impl CapabilityRegistryBuilder {
    /// Register a tool
    pub fn register(mut self, tool: ToolDescriptor) -> Self {
        self.tools.push(tool);
        self
    }

    /// Build the registry, rejecting duplicate or empty names
    pub fn build(self) -> Result<CapabilityRegistry> {
        let mut registry = CapabilityRegistry::default();
        for tool in self.tools {
            if tool.name().trim().is_empty() {
                return Err(Error::Configuration("tool name must not be empty".to_string()));
            }
            if registry.index.contains_key(tool.name()) {
                return Err(Error::Configuration(format!(
                    "duplicate tool name: {}",
                    tool.name()
                )));
            }
            registry
                .index
                .insert(tool.name().to_string(), registry.tools.len());
            registry.tools.push(Arc::new(tool));
        }
        Ok(registry)
    }
}

/// Executors for confirmation-required tools, run only after approval
#[derive(Default, Clone)]
pub struct ConfirmedExecutionRegistry {
    executors: HashMap<String, Arc<dyn Executor>>,
}

impl ConfirmedExecutionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the executor for `name`, replacing any previous entry
    pub fn register(&mut self, name: impl Into<String>, executor: Arc<dyn Executor>) {
        self.executors.insert(name.into(), executor);
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, name: impl Into<String>, executor: Arc<dyn Executor>) -> Self {
        self.register(name, executor);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Executor>> {
        self.executors.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.executors.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.executors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.executors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}

impl std::fmt::Debug for ConfirmedExecutionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmedExecutionRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::InputSchema;
    use crate::tool::{ToolOutput, executor_fn};

    fn tool(name: &str) -> ToolDescriptor {
        ToolDescriptor::new(name, format!("{name} tool"), InputSchema::empty())
    }

    #[test]
    fn test_registry_order_and_lookup() {
        let registry = CapabilityRegistry::builder()
            .register(tool("searchKnowledge"))
            .register(tool("searchGovernance"))
            .register(tool("getLocalTime"))
            .build()
            .unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.names(),
            vec!["searchKnowledge", "searchGovernance", "getLocalTime"]
        );
        assert_eq!(registry.get("searchGovernance").unwrap().name(), "searchGovernance");
        assert!(registry.get("missing").is_none());
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = CapabilityRegistry::builder()
            .register(tool("scheduleTask"))
            .register(tool("scheduleTask"))
            .build();

        assert!(matches!(result, Err(Error::Configuration(msg)) if msg.contains("scheduleTask")));
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = CapabilityRegistry::builder().register(tool(" ")).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_confirmed_registry() {
        let registry = ConfirmedExecutionRegistry::new()
            .with(
                "getWeatherInformation",
                executor_fn(|_| async { Ok(ToolOutput::from("sunny")) }),
            )
            .with("deleteEverything", executor_fn(|_| async { Ok(ToolOutput::from("ok")) }));

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("getWeatherInformation"));
        assert_eq!(registry.names(), vec!["deleteEverything", "getWeatherInformation"]);
    }
}
