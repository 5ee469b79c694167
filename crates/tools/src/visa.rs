//! Visa requirement lookup.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use tracing::warn;

use tripflow_core::config::ToolsConfig;
use tripflow_core::traits::Tool;
use tripflow_core::types::ToolOutput;
use tripflow_core::Result;

pub struct VisaRequirementTool {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl VisaRequirementTool {
    pub fn new(http: reqwest::Client, config: &ToolsConfig) -> Self {
        Self {
            http,
            base_url: config.visa_api_url.clone(),
            api_key: config
                .travel_api_key
                .as_ref()
                .map(|k| k.expose_secret().clone()),
        }
    }
}

#[async_trait]
impl Tool for VisaRequirementTool {
    fn name(&self) -> &str {
        "get_visa_requirements"
    }

    fn description(&self) -> &str {
        "Visa requirements for a traveller of one nationality entering a destination country"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "nationality": {"type": "string", "description": "Traveller's passport country"},
                "destination": {"type": "string", "description": "Country being entered"},
                "departure_country": {"type": "string", "description": "Country departing from, if different from nationality"}
            },
            "required": ["nationality", "destination"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput> {
        let nationality = match args.get("nationality").and_then(Value::as_str) {
            Some(n) if !n.trim().is_empty() => n.to_string(),
            _ => {
                return Ok(ToolOutput::error(
                    "get_visa_requirements: 'nationality' is required",
                ))
            }
        };
        let destination = match args.get("destination").and_then(Value::as_str) {
            Some(d) if !d.trim().is_empty() => d.to_string(),
            _ => {
                return Ok(ToolOutput::error(
                    "get_visa_requirements: 'destination' is required",
                ))
            }
        };
        // Departure defaults to the passport country.
        let departure = args
            .get("departure_country")
            .and_then(Value::as_str)
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(&nationality)
            .to_string();

        let mut query: Vec<(&str, String)> = vec![
            ("nationality", nationality.clone()),
            ("leaving_from", departure),
            ("going_to", destination.clone()),
        ];
        if let Some(k) = &self.api_key {
            query.push(("api_key", k.clone()));
        }

        let response = match self.http.get(&self.base_url).query(&query).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "visa API request failed");
                return Ok(ToolOutput::error(format!("visa lookup failed: {e}")));
            }
        };
        if !response.status().is_success() {
            return Ok(ToolOutput::error(format!(
                "visa API returned status {}",
                response.status()
            )));
        }
        let body: Value = match response.json().await {
            Ok(b) => b,
            Err(e) => return Ok(ToolOutput::error(format!("visa API sent invalid JSON: {e}"))),
        };

        Ok(ToolOutput::text(format!(
            "Visa requirements for {nationality} travelling to {destination}"
        ))
        .with_data(body))
    }
}
