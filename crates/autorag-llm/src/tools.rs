//! Tool definition types advertised to the model

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool summary sent to the model at the start of every turn
///
/// Only name, description and input schema cross the boundary. Whether a
/// tool needs human confirmation is never revealed to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name, the key the model uses to request it
    pub name: String,

    /// Natural-language guidance for tool selection
    pub description: String,

    /// JSON schema for the tool's arguments
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Create a new tool definition
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_definition_serialization() {
        let schema = json!({
            "type": "object",
            "properties": { "query": { "type": "string" } },
            "required": ["query"],
        });

        let tool = ToolDefinition::new("searchKnowledge", "Search the knowledge base", schema);
        let value = serde_json::to_value(&tool).unwrap();

        assert_eq!(value["name"], "searchKnowledge");
        assert_eq!(value["input_schema"]["required"][0], "query");
    }
}
