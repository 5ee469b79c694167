//! Helpers for pulling JSON out of LLM replies.

use serde_json::Value;

/// Extract the first JSON object embedded in an LLM reply.
///
/// Models wrap JSON in prose or markdown fences more often than not, so this
/// scans for the first brace-balanced object rather than parsing the whole
/// reply. Returns `None` when no parseable object is found.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let text = strip_code_fences(text);

    // Fast path: the whole reply is JSON.
    if let Ok(value) = serde_json::from_str::<Value>(text.trim()) {
        if value.is_object() {
            return Some(value);
        }
    }

    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    let candidate = &text[start..start + offset + 1];
                    return serde_json::from_str(candidate).ok();
                }
            }
            _ => {}
        }
    }
    None
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open.strip_suffix("```").unwrap_or(without_open)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_bare_object() {
        let value = extract_json_object(r#"{"action": "create_plan"}"#).unwrap();
        assert_eq!(value, json!({"action": "create_plan"}));
    }

    #[test]
    fn extracts_object_wrapped_in_prose() {
        let reply = "Sure! Here is the verdict:\n{\"validation_status\": \"pass\"}\nHope that helps.";
        let value = extract_json_object(reply).unwrap();
        assert_eq!(value["validation_status"], "pass");
    }

    #[test]
    fn extracts_object_from_markdown_fence() {
        let reply = "```json\n{\"status\": \"complete\", \"missing_fields\": []}\n```";
        let value = extract_json_object(reply).unwrap();
        assert_eq!(value["status"], "complete");
    }

    #[test]
    fn nested_braces_and_strings_are_balanced() {
        let reply = r#"prefix {"plan": [{"step_number": 1, "description": "look up {weird} text"}]} suffix"#;
        let value = extract_json_object(reply).unwrap();
        assert_eq!(value["plan"][0]["step_number"], 1);
    }

    #[test]
    fn no_object_yields_none() {
        assert!(extract_json_object("no json here").is_none());
        assert!(extract_json_object("{unclosed").is_none());
    }
}
