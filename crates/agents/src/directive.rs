//! Parsing of agent LLM replies into directives.
//!
//! The agent prompt asks the model to answer with either a tool invocation
//! (`TOOL:` / `ARGS:` lines) or a final answer (`ANSWER:`). Models drift, so
//! the parser also accepts a bare JSON function call, and treats anything
//! else as a final answer rather than failing the dispatch.

use serde_json::{json, Value};

use tripflow_core::json::extract_json_object;

/// One step of an agent's reasoning loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Invoke a tool with the given JSON arguments.
    Invoke { tool: String, args: Value },
    /// The agent is done; this is its summary of the findings.
    Answer(String),
}

/// Parse one LLM reply into a directive.
pub fn parse_directive(reply: &str) -> Directive {
    let trimmed = reply.trim();

    if let Some(rest) = strip_marker(trimmed, "ANSWER:") {
        return Directive::Answer(rest.trim().to_string());
    }

    if let Some(rest) = strip_marker(trimmed, "TOOL:") {
        let mut lines = rest.splitn(2, '\n');
        let tool = lines.next().unwrap_or_default().trim().to_string();
        let args = lines
            .next()
            .and_then(|tail| {
                let tail = tail.trim();
                let tail = tail.strip_prefix("ARGS:").unwrap_or(tail);
                extract_json_object(tail)
            })
            .unwrap_or_else(|| json!({}));
        if !tool.is_empty() {
            return Directive::Invoke { tool, args };
        }
    }

    // Function-call shaped JSON: {"tool": ..., "args": ...} or the
    // OpenAI-style {"name": ..., "arguments": ...}.
    if let Some(value) = extract_json_object(trimmed) {
        let tool = value
            .get("tool")
            .or_else(|| value.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string);
        if let Some(tool) = tool {
            let args = value
                .get("args")
                .or_else(|| value.get("arguments"))
                .cloned()
                .unwrap_or_else(|| json!({}));
            // Arguments sometimes arrive as a JSON-encoded string.
            let args = match args {
                Value::String(s) => extract_json_object(&s).unwrap_or(json!({})),
                other => other,
            };
            return Directive::Invoke { tool, args };
        }
    }

    Directive::Answer(trimmed.to_string())
}

fn strip_marker<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    text.strip_prefix(marker)
}
