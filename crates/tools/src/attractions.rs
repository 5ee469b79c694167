//! Attraction and point-of-interest search.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use tracing::warn;

use tripflow_core::config::ToolsConfig;
use tripflow_core::traits::Tool;
use tripflow_core::types::ToolOutput;
use tripflow_core::Result;

pub struct AttractionSearchTool {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl AttractionSearchTool {
    pub fn new(http: reqwest::Client, config: &ToolsConfig) -> Self {
        Self {
            http,
            base_url: config.attractions_api_url.clone(),
            api_key: config
                .travel_api_key
                .as_ref()
                .map(|k| k.expose_secret().clone()),
        }
    }
}

#[async_trait]
impl Tool for AttractionSearchTool {
    fn name(&self) -> &str {
        "search_attractions"
    }

    fn description(&self) -> &str {
        "Search attractions, restaurants, and points of interest in a location"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {"type": "string", "description": "City or area to search"},
                "category": {"type": "string", "description": "attractions, restaurants, or geos"},
                "max_results": {"type": "integer", "description": "Cap on returned places"}
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput> {
        let location = match args.get("location").and_then(Value::as_str) {
            Some(l) if !l.trim().is_empty() => l.to_string(),
            _ => return Ok(ToolOutput::error("search_attractions: 'location' is required")),
        };

        let mut query: Vec<(&str, String)> = vec![
            ("searchQuery", location.clone()),
            (
                "category",
                args.get("category")
                    .and_then(Value::as_str)
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or("attractions")
                    .to_string(),
            ),
        ];
        if let Some(k) = &self.api_key {
            query.push(("key", k.clone()));
        }

        let url = format!("{}/location/search", self.base_url);
        let response = match self.http.get(&url).query(&query).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "attraction search request failed");
                return Ok(ToolOutput::error(format!("attraction search failed: {e}")));
            }
        };
        if !response.status().is_success() {
            return Ok(ToolOutput::error(format!(
                "attractions API returned status {}",
                response.status()
            )));
        }
        let body: Value = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                return Ok(ToolOutput::error(format!(
                    "attractions API sent invalid JSON: {e}"
                )))
            }
        };

        let limit = args
            .get("max_results")
            .and_then(Value::as_u64)
            .unwrap_or(10) as usize;
        let places: Vec<Value> = body
            .get("data")
            .and_then(Value::as_array)
            .map(|items| items.iter().take(limit).cloned().collect())
            .unwrap_or_default();

        if places.is_empty() {
            return Ok(ToolOutput::text(format!("No attractions found in {location}"))
                .with_data(json!({"places": []})));
        }
        Ok(
            ToolOutput::text(format!("Found {} places in {location}", places.len()))
                .with_data(json!({ "places": places })),
        )
    }
}
