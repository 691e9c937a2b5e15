//! Tool descriptors and executors

use crate::schema::InputSchema;
use async_trait::async_trait;
use autorag_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// What an executor hands back on success
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Plain text, appended to the transcript verbatim
    Text(String),
    /// Structured payload, serialized to JSON for the transcript
    Structured(Value),
}

impl ToolOutput {
    /// Render as transcript text
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) | Self::Structured(Value::String(text)) => text,
            Self::Structured(value) => {
                serde_json::to_string(&value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

impl From<String> for ToolOutput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ToolOutput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Value> for ToolOutput {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

/// An asynchronous side-effecting operation behind a tool
///
/// Arguments arrive already validated against the owning descriptor's
/// [`InputSchema`].
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, args: Value) -> Result<ToolOutput>;
}

/// Executor backed by an async closure, see [`executor_fn`]
pub struct FnExecutor<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Executor for FnExecutor<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ToolOutput>> + Send,
{
    async fn execute(&self, args: Value) -> Result<ToolOutput> {
        (self.f)(args).await
    }
}

/// Wrap an async closure as a shareable executor
///
/// ```
/// use autorag_tools::{ToolOutput, executor_fn};
///
/// let local_time = executor_fn(|_args| async { Ok(ToolOutput::from("10am")) });
/// # let _ = local_time;
/// ```
pub fn executor_fn<F, Fut>(f: F) -> Arc<dyn Executor>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ToolOutput>> + Send + 'static,
{
    Arc::new(FnExecutor { f })
}

/// Deserialize validated arguments into a typed struct
///
/// Failure here means the schema and the struct disagree, reported as a
/// validation error for `tool`.
pub fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T> {
    let args = if args.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| Error::validation(tool, e.to_string()))
}

/// Declarative unit describing one capability offered to the model
///
/// The presence of an inline executor is the only thing that decides
/// whether the tool runs on its own or waits for a human decision.
#[derive(Clone)]
pub struct ToolDescriptor {
    name: String,
    description: String,
    input_schema: InputSchema,
    executor: Option<Arc<dyn Executor>>,
}

impl ToolDescriptor {
    /// Descriptor without an executor (confirmation-required)
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: InputSchema,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            executor: None,
        }
    }

    /// Attach an inline executor, making the tool auto-executing
    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Drop the inline executor, returning it
    pub(crate) fn take_executor(&mut self) -> Option<Arc<dyn Executor>> {
        self.executor.take()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn input_schema(&self) -> &InputSchema {
        &self.input_schema
    }

    pub fn executor(&self) -> Option<&Arc<dyn Executor>> {
        self.executor.as_ref()
    }

    /// Validate arguments against this tool's schema
    pub fn validate(&self, args: &Value) -> Result<()> {
        self.input_schema
            .validate(args)
            .map_err(|reason| Error::validation(&self.name, reason))
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .field("has_executor", &self.executor.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct CityArgs {
        city: String,
    }

    #[tokio::test]
    async fn test_fn_executor() {
        let exec = executor_fn(|args| async move {
            let args: CityArgs = parse_args("getWeatherInformation", args)?;
            Ok(ToolOutput::Text(format!("The weather in {} is sunny", args.city)))
        });

        let output = exec.execute(json!({"city": "Lisbon"})).await.unwrap();
        assert_eq!(output.into_text(), "The weather in Lisbon is sunny");
    }

    #[test]
    fn test_parse_args_mismatch() {
        let err = parse_args::<CityArgs>("getWeatherInformation", json!({})).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation { ref tool, .. } if tool == "getWeatherInformation"
        ));
    }

    #[test]
    fn test_output_rendering() {
        assert_eq!(ToolOutput::from("plain").into_text(), "plain");
        assert_eq!(ToolOutput::from(json!("quoted")).into_text(), "quoted");
        assert_eq!(ToolOutput::from(json!({"a": 1})).into_text(), r#"{"a":1}"#);
    }

    #[test]
    fn test_descriptor_validate() {
        let tool = ToolDescriptor::new(
            "getLocalTime",
            "Get the local time for a specified location",
            InputSchema::empty().field(Field::string("location", "Location")),
        );

        assert!(tool.executor().is_none());
        assert!(tool.validate(&json!({"location": "Porto"})).is_ok());
        assert!(matches!(
            tool.validate(&json!({})),
            Err(Error::Validation { .. })
        ));
        assert!(format!("{tool:?}").contains("has_executor: false"));
    }
}
