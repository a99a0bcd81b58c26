//! Tool registry - manages and dispatches tool calls
//!
//! Central hub mapping tool names to typed handlers. Execution never fails at
//! this boundary: unknown tools, handler errors and handler panics all come
//! back as error outputs the model can read.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use futures::FutureExt;
use serde_json::Value;

use crate::core::{Result, ToolCall, ToolDefinition, ToolOutput, ToolResult, WeatherAgentError};
use crate::tools::weather::{weather_tool_definitions, CurrentWeatherTool, ForecastTool};
use crate::weather::WeatherProvider;

/// A concrete tool implementation
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Name the handler answers to; must match a declared definition
    fn name(&self) -> &str;

    /// Run the tool. Argument validation is the handler's job.
    async fn call(&self, arguments: &Value) -> Result<Value>;
}

/// Registry of available tools
pub struct ToolRegistry {
    /// Declared tool descriptions, in the order they are offered to the model
    definitions: Vec<ToolDefinition>,
    /// Handlers indexed by tool name
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    /// Create an empty registry for the given declarations
    pub fn new(definitions: Vec<ToolDefinition>) -> Self {
        Self {
            definitions,
            handlers: HashMap::new(),
        }
    }

    /// Create the weather tool set backed by `provider`
    pub fn weather(provider: Arc<dyn WeatherProvider>) -> Result<Self> {
        let mut registry = Self::new(weather_tool_definitions());
        registry.register(CurrentWeatherTool::new(provider.clone()));
        registry.register(ForecastTool::new(provider));
        registry.validate()?;
        Ok(registry)
    }

    /// Register a handler, replacing any previous one with the same name
    pub fn register(&mut self, handler: impl ToolHandler + 'static) {
        let name = handler.name().to_string();
        self.handlers.insert(name, Arc::new(handler));
    }

    /// Check that declarations and handlers match one to one
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        for definition in &self.definitions {
            if !self.handlers.contains_key(&definition.name) {
                problems.push(format!("no handler for declared tool '{}'", definition.name));
            }
        }

        let mut undeclared: Vec<&String> = self
            .handlers
            .keys()
            .filter(|name| !self.definitions.iter().any(|d| &d.name == *name))
            .collect();
        undeclared.sort();
        for name in undeclared {
            problems.push(format!("handler '{}' has no declaration", name));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(WeatherAgentError::config(format!(
                "Tool registry incomplete: {}",
                problems.join("; ")
            )))
        }
    }

    /// Get all tool definitions
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Check whether a tool is registered
    pub fn has_tool(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Execute a tool by name
    pub async fn execute(&self, name: &str, arguments: &Value) -> ToolOutput {
        let handler = match self.handlers.get(name) {
            Some(handler) => handler,
            None => {
                tracing::warn!(tool = name, "Model requested unknown tool");
                return ToolOutput::error(format!("Unknown tool: {}", name));
            }
        };

        match AssertUnwindSafe(handler.call(arguments)).catch_unwind().await {
            Ok(Ok(value)) => {
                tracing::debug!(tool = name, "Tool succeeded");
                ToolOutput::Success(value)
            }
            Ok(Err(e)) => {
                tracing::warn!(tool = name, error = %e, "Tool failed");
                ToolOutput::error(e.to_string())
            }
            Err(_) => {
                tracing::error!(tool = name, "Tool panicked");
                ToolOutput::error(format!("Tool '{}' failed unexpectedly", name))
            }
        }
    }

    /// Execute a tool call and key the output by its call id
    pub async fn execute_call(&self, call: &ToolCall) -> ToolResult {
        let output = self.execute(&call.name, &call.arguments).await;
        ToolResult::new(call, output)
    }

    /// Execute several tool calls concurrently; results keep the call order
    pub async fn execute_all(&self, calls: &[ToolCall]) -> Vec<ToolResult> {
        join_all(calls.iter().map(|call| self.execute_call(call))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl ToolHandler for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        async fn call(&self, arguments: &Value) -> Result<Value> {
            Ok(json!({ "echo": arguments.clone() }))
        }
    }

    struct BrokenTool;

    #[async_trait]
    impl ToolHandler for BrokenTool {
        fn name(&self) -> &str {
            "broken"
        }

        async fn call(&self, _arguments: &Value) -> Result<Value> {
            Err(WeatherAgentError::weather("upstream unreachable"))
        }
    }

    struct PanickingTool;

    #[async_trait]
    impl ToolHandler for PanickingTool {
        fn name(&self) -> &str {
            "panicky"
        }

        async fn call(&self, _arguments: &Value) -> Result<Value> {
            panic!("index out of bounds")
        }
    }

    fn definition(name: &str) -> ToolDefinition {
        ToolDefinition::new(name, "test tool", json!({"type": "object"}))
    }

    fn test_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new(vec![
            definition("echo"),
            definition("broken"),
            definition("panicky"),
        ]);
        registry.register(EchoTool);
        registry.register(BrokenTool);
        registry.register(PanickingTool);
        registry
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = test_registry();
        let output = registry.execute("get_tides", &json!({})).await;

        assert_eq!(output, ToolOutput::error("Unknown tool: get_tides"));
        assert_eq!(output.to_value(), json!({"error": "Unknown tool: get_tides"}));
    }

    #[tokio::test]
    async fn test_success_passes_payload_through() {
        let registry = test_registry();
        let output = registry.execute("echo", &json!({"x": 1})).await;
        assert_eq!(output, ToolOutput::Success(json!({"echo": {"x": 1}})));
    }

    #[tokio::test]
    async fn test_failure_becomes_error_output() {
        let registry = test_registry();
        let output = registry.execute("broken", &json!({})).await;

        let value = output.to_value();
        let message = value["error"].as_str().unwrap();
        assert!(message.contains("upstream unreachable"));
    }

    #[tokio::test]
    async fn test_panic_becomes_error_output() {
        let registry = test_registry();
        let output = registry.execute("panicky", &json!({})).await;

        assert!(output.is_error());
        assert!(!output.to_value()["error"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_execute_all_keeps_order_and_ids() {
        let registry = test_registry();
        let calls = vec![
            ToolCall::new("a", "broken", json!({})),
            ToolCall::new("b", "echo", json!({"n": 2})),
            ToolCall::new("c", "missing", json!({})),
        ];

        let results = registry.execute_all(&calls).await;
        let ids: Vec<&str> = results.iter().map(|r| r.call_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(results[0].is_error());
        assert!(!results[1].is_error());
        assert!(results[2].is_error());
    }

    #[test]
    fn test_validate_reports_missing_and_undeclared() {
        let mut registry = ToolRegistry::new(vec![definition("echo"), definition("forecast")]);
        registry.register(EchoTool);
        registry.register(BrokenTool);

        let err = registry.validate().unwrap_err().to_string();
        assert!(err.contains("no handler for declared tool 'forecast'"));
        assert!(err.contains("handler 'broken' has no declaration"));
    }

    #[test]
    fn test_validate_complete_registry() {
        assert!(test_registry().validate().is_ok());
        assert!(test_registry().has_tool("echo"));
        assert!(!test_registry().has_tool("nope"));
    }
}
