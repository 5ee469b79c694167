//! Flight search backed by a SerpApi-style google_flights endpoint.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use tracing::{debug, warn};

use tripflow_core::config::ToolsConfig;
use tripflow_core::traits::Tool;
use tripflow_core::types::ToolOutput;
use tripflow_core::Result;

pub struct FlightSearchTool {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl FlightSearchTool {
    pub fn new(http: reqwest::Client, config: &ToolsConfig) -> Self {
        Self {
            http,
            base_url: config.flight_api_url.clone(),
            api_key: config
                .travel_api_key
                .as_ref()
                .map(|k| k.expose_secret().clone()),
        }
    }
}

#[async_trait]
impl Tool for FlightSearchTool {
    fn name(&self) -> &str {
        "search_flights"
    }

    fn description(&self) -> &str {
        "Search flights between an origin and a destination on a given date"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "origin": {"type": "string", "description": "Departure airport code or city"},
                "destination": {"type": "string", "description": "Arrival airport code or city"},
                "departure_date": {"type": "string", "description": "Outbound date, YYYY-MM-DD"},
                "return_date": {"type": "string", "description": "Return date for round trips"},
                "passengers": {"type": "integer", "description": "Number of adult passengers"},
                "cabin_class": {"type": "string", "description": "economy, business, or first"}
            },
            "required": ["origin", "destination", "departure_date"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput> {
        let origin = match args.get("origin").and_then(Value::as_str) {
            Some(o) if !o.trim().is_empty() => o.to_string(),
            _ => return Ok(ToolOutput::error("search_flights: 'origin' is required")),
        };
        let destination = match args.get("destination").and_then(Value::as_str) {
            Some(d) if !d.trim().is_empty() => d.to_string(),
            _ => return Ok(ToolOutput::error("search_flights: 'destination' is required")),
        };
        let departure_date = match args.get("departure_date").and_then(Value::as_str) {
            Some(d) if !d.trim().is_empty() => d.to_string(),
            _ => return Ok(ToolOutput::error("search_flights: 'departure_date' is required")),
        };

        let mut query: Vec<(&str, String)> = vec![
            ("engine", "google_flights".into()),
            ("departure_id", origin.clone()),
            ("arrival_id", destination.clone()),
            ("outbound_date", departure_date),
            ("currency", "USD".into()),
        ];
        match args.get("return_date").and_then(Value::as_str) {
            Some(r) if !r.trim().is_empty() => {
                query.push(("return_date", r.to_string()));
                query.push(("type", "1".into()));
            }
            // One-way when no return date is given.
            _ => query.push(("type", "2".into())),
        }
        if let Some(p) = args.get("passengers").and_then(Value::as_u64) {
            query.push(("adults", p.to_string()));
        }
        if let Some(k) = &self.api_key {
            query.push(("api_key", k.clone()));
        }

        debug!(%origin, %destination, "searching flights");

        let response = match self.http.get(&self.base_url).query(&query).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "flight search request failed");
                return Ok(ToolOutput::error(format!("flight search failed: {e}")));
            }
        };
        if !response.status().is_success() {
            return Ok(ToolOutput::error(format!(
                "flight API returned status {}",
                response.status()
            )));
        }

        let body: Value = match response.json().await {
            Ok(b) => b,
            Err(e) => return Ok(ToolOutput::error(format!("flight API sent invalid JSON: {e}"))),
        };

        // SerpApi puts the ranked results under best_flights with an
        // other_flights spillover.
        let mut options: Vec<Value> = Vec::new();
        for key in ["best_flights", "other_flights"] {
            if let Some(items) = body.get(key).and_then(Value::as_array) {
                options.extend(items.iter().take(5).cloned());
            }
        }

        if options.is_empty() {
            return Ok(ToolOutput::text(format!(
                "No flights found from {origin} to {destination}"
            ))
            .with_data(json!({"options": []})));
        }

        let summary = format!(
            "Found {} flight options from {origin} to {destination}",
            options.len()
        );
        Ok(ToolOutput::text(summary).with_data(json!({ "options": options })))
    }
}
