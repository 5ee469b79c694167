//! Tool contracts and the data-driven capability tables.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Output from a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Whether the tool execution was successful.
    pub success: bool,
    /// Human-readable output or failure description.
    pub content: String,
    /// Structured result data.
    pub data: Option<Value>,
}

impl ToolOutput {
    /// Create a successful text output.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: content.into(),
            data: None,
        }
    }

    /// Attach structured data.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Create a failed output.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            content: message.into(),
            data: None,
        }
    }
}

/// Tool definition for the tool registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for tool arguments.
    pub parameters: Value,
}

/// Published parameter contract for one tool.
///
/// This is the single source of truth for "did I gather enough to call this
/// tool" (agent side) and "is an empty result acceptable" (judge side); the
/// same table drives both decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub required_params: Vec<String>,
    pub optional_params: Vec<String>,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required_params: Vec::new(),
            optional_params: Vec::new(),
        }
    }

    pub fn required(mut self, params: &[&str]) -> Self {
        self.required_params = params.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn optional(mut self, params: &[&str]) -> Self {
        self.optional_params = params.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Required parameters absent (or null/empty) in the given arguments.
    pub fn missing_required(&self, args: &Value) -> Vec<String> {
        self.required_params
            .iter()
            .filter(|param| {
                match args.get(param.as_str()) {
                    None | Some(Value::Null) => true,
                    Some(Value::String(s)) => s.trim().is_empty(),
                    Some(_) => false,
                }
            })
            .cloned()
            .collect()
    }
}

/// The capability table for one agent's allowed tool set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapabilityTable {
    pub specs: Vec<ToolSpec>,
}

impl CapabilityTable {
    pub fn new(specs: Vec<ToolSpec>) -> Self {
        Self { specs }
    }

    pub fn get(&self, tool: &str) -> Option<&ToolSpec> {
        self.specs.iter().find(|s| s.name == tool)
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.specs.iter().map(|s| s.name.as_str()).collect()
    }

    /// Render the table for inclusion in agent and judge prompts.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for spec in &self.specs {
            out.push_str(&format!(
                "- {}: {} (required: [{}], optional: [{}])\n",
                spec.name,
                spec.description,
                spec.required_params.join(", "),
                spec.optional_params.join(", ")
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_required_flags_absent_and_blank_params() {
        let spec = ToolSpec::new("get_hotel_rates", "rates")
            .required(&["city", "check_in", "check_out"])
            .optional(&["guests"]);

        let missing = spec.missing_required(&json!({
            "city": "Paris",
            "check_in": "  ",
        }));
        assert_eq!(missing, vec!["check_in".to_string(), "check_out".to_string()]);
    }

    #[test]
    fn table_lookup_by_tool_name() {
        let table = CapabilityTable::new(vec![
            ToolSpec::new("get_weather", "weather").required(&["location"]),
            ToolSpec::new("convert_currency", "fx").required(&["from", "to", "amount"]),
        ]);
        assert!(table.get("get_weather").is_some());
        assert!(table.get("get_flights").is_none());
        assert_eq!(table.tool_names().len(), 2);
    }
}
