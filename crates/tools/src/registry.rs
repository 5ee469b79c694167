//! Tool registry implementation.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use tripflow_core::{
    traits::{Tool, ToolRegistry},
    types::{ToolDefinition, ToolOutput},
    Error, Result,
};

/// Default tool registry using DashMap.
pub struct DefaultToolRegistry {
    tools: DashMap<String, Arc<dyn Tool>>,
}

impl DefaultToolRegistry {
    /// Create a new tool registry.
    pub fn new() -> Self {
        Self {
            tools: DashMap::new(),
        }
    }

    /// Get the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for DefaultToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolRegistry for DefaultToolRegistry {
    async fn register(&self, tool: Box<dyn Tool>) -> Result<()> {
        let name = tool.name().to_string();
        tracing::info!(tool = %name, "Registering tool");

        if self.tools.contains_key(&name) {
            return Err(Error::internal(format!(
                "Tool '{}' is already registered",
                name
            )));
        }

        self.tools.insert(name, Arc::from(tool));
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ToolDefinition>> {
        let definitions: Vec<_> = self
            .tools
            .iter()
            .map(|entry| ToolDefinition {
                name: entry.name().to_string(),
                description: entry.description().to_string(),
                parameters: entry.parameters(),
            })
            .collect();

        Ok(definitions)
    }

    async fn execute(&self, name: &str, args: serde_json::Value) -> Result<ToolOutput> {
        let tool = self
            .tools
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::tool_not_found(name))?;

        tracing::debug!(tool = %name, "Executing tool");

        tool.execute(args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes the input message back"
        }

        fn parameters(&self) -> Value {
            json!({
                "type": "object",
                "properties": {
                    "message": { "type": "string" }
                },
                "required": ["message"]
            })
        }

        async fn execute(&self, args: Value) -> Result<ToolOutput> {
            let message = args
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("No message provided");
            Ok(ToolOutput::text(format!("Echo: {}", message)))
        }
    }

    #[tokio::test]
    async fn register_list_execute() {
        let registry = DefaultToolRegistry::new();
        registry.register(Box::new(EchoTool)).await.unwrap();
        assert_eq!(registry.len(), 1);

        let defs = registry.list().await.unwrap();
        assert_eq!(defs[0].name, "echo");

        let out = registry
            .execute("echo", json!({"message": "hi"}))
            .await
            .unwrap();
        assert!(out.success);
        assert_eq!(out.content, "Echo: hi");
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let registry = DefaultToolRegistry::new();
        registry.register(Box::new(EchoTool)).await.unwrap();
        assert!(registry.register(Box::new(EchoTool)).await.is_err());
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error() {
        let registry = DefaultToolRegistry::new();
        let err = registry.execute("missing", json!({})).await.unwrap_err();
        assert!(matches!(err, Error::ToolNotFound(_)));
    }
}
