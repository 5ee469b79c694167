//! Hotel tools: browsing, rates, and per-property details.
//!
//! Browsing a city's hotels needs no dates. Rates do, so the two are kept
//! as separate tools rather than one mega-endpoint with optional fields.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use tracing::warn;

use tripflow_core::config::ToolsConfig;
use tripflow_core::traits::Tool;
use tripflow_core::types::ToolOutput;
use tripflow_core::Result;

fn api_key(config: &ToolsConfig) -> Option<String> {
    config
        .travel_api_key
        .as_ref()
        .map(|k| k.expose_secret().clone())
}

async fn get_json(
    http: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
    label: &str,
) -> std::result::Result<Value, ToolOutput> {
    let response = match http.get(url).query(query).send().await {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, %label, "hotel API request failed");
            return Err(ToolOutput::error(format!("{label} failed: {e}")));
        }
    };
    if !response.status().is_success() {
        return Err(ToolOutput::error(format!(
            "{label}: hotel API returned status {}",
            response.status()
        )));
    }
    response
        .json()
        .await
        .map_err(|e| ToolOutput::error(format!("{label}: hotel API sent invalid JSON: {e}")))
}

pub struct HotelListTool {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HotelListTool {
    pub fn new(http: reqwest::Client, config: &ToolsConfig) -> Self {
        Self {
            http,
            base_url: config.hotel_api_url.clone(),
            api_key: api_key(config),
        }
    }
}

#[async_trait]
impl Tool for HotelListTool {
    fn name(&self) -> &str {
        "get_list_of_hotels"
    }

    fn description(&self) -> &str {
        "List hotels in a city with names, addresses, and ratings (no prices)"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "city": {"type": "string", "description": "City to browse hotels in"},
                "min_rating": {"type": "number", "description": "Minimum star rating"},
                "max_results": {"type": "integer", "description": "Cap on returned hotels"}
            },
            "required": ["city"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput> {
        let city = match args.get("city").and_then(Value::as_str) {
            Some(c) if !c.trim().is_empty() => c.to_string(),
            _ => return Ok(ToolOutput::error("get_list_of_hotels: 'city' is required")),
        };

        let mut query: Vec<(&str, String)> = vec![("city", city.clone())];
        if let Some(r) = args.get("min_rating").and_then(Value::as_f64) {
            query.push(("min_rating", r.to_string()));
        }
        if let Some(n) = args.get("max_results").and_then(Value::as_u64) {
            query.push(("limit", n.to_string()));
        }
        if let Some(k) = &self.api_key {
            query.push(("api_key", k.clone()));
        }

        let url = format!("{}/list", self.base_url);
        let body = match get_json(&self.http, &url, &query, "get_list_of_hotels").await {
            Ok(b) => b,
            Err(out) => return Ok(out),
        };

        let hotels = body
            .get("hotels")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        if hotels.is_empty() {
            return Ok(ToolOutput::text(format!("No hotels found in {city}"))
                .with_data(json!({"hotels": []})));
        }
        Ok(
            ToolOutput::text(format!("Found {} hotels in {city}", hotels.len()))
                .with_data(json!({ "hotels": hotels })),
        )
    }
}

pub struct HotelRatesTool {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HotelRatesTool {
    pub fn new(http: reqwest::Client, config: &ToolsConfig) -> Self {
        Self {
            http,
            base_url: config.hotel_api_url.clone(),
            api_key: api_key(config),
        }
    }
}

#[async_trait]
impl Tool for HotelRatesTool {
    fn name(&self) -> &str {
        "get_hotel_rates"
    }

    fn description(&self) -> &str {
        "Nightly rates for hotels in a city over a check-in/check-out window"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "city": {"type": "string", "description": "City to price hotels in"},
                "check_in": {"type": "string", "description": "Check-in date, YYYY-MM-DD"},
                "check_out": {"type": "string", "description": "Check-out date, YYYY-MM-DD"},
                "guests": {"type": "integer", "description": "Number of guests"},
                "max_price": {"type": "number", "description": "Max nightly price"}
            },
            "required": ["city", "check_in", "check_out"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput> {
        let mut query: Vec<(&str, String)> = Vec::new();
        for param in ["city", "check_in", "check_out"] {
            match args.get(param).and_then(Value::as_str) {
                Some(v) if !v.trim().is_empty() => query.push((param, v.to_string())),
                _ => {
                    return Ok(ToolOutput::error(format!(
                        "get_hotel_rates: '{param}' is required"
                    )))
                }
            }
        }
        if let Some(g) = args.get("guests").and_then(Value::as_u64) {
            query.push(("guests", g.to_string()));
        }
        if let Some(p) = args.get("max_price").and_then(Value::as_f64) {
            query.push(("max_price", p.to_string()));
        }
        if let Some(k) = &self.api_key {
            query.push(("api_key", k.clone()));
        }

        let url = format!("{}/rates", self.base_url);
        let body = match get_json(&self.http, &url, &query, "get_hotel_rates").await {
            Ok(b) => b,
            Err(out) => return Ok(out),
        };

        let rates = body
            .get("rates")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        if rates.is_empty() {
            return Ok(ToolOutput::text("No rates available for that stay")
                .with_data(json!({"rates": []})));
        }
        Ok(
            ToolOutput::text(format!("Found rates for {} hotels", rates.len()))
                .with_data(json!({ "rates": rates })),
        )
    }
}

pub struct HotelDetailsTool {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HotelDetailsTool {
    pub fn new(http: reqwest::Client, config: &ToolsConfig) -> Self {
        Self {
            http,
            base_url: config.hotel_api_url.clone(),
            api_key: api_key(config),
        }
    }
}

#[async_trait]
impl Tool for HotelDetailsTool {
    fn name(&self) -> &str {
        "get_hotel_details"
    }

    fn description(&self) -> &str {
        "Full details for one hotel by its listing id"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "hotel_id": {"type": "string", "description": "Hotel listing id"},
                "check_in": {"type": "string", "description": "Optional check-in date"},
                "check_out": {"type": "string", "description": "Optional check-out date"}
            },
            "required": ["hotel_id"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput> {
        let hotel_id = match args.get("hotel_id").and_then(Value::as_str) {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => return Ok(ToolOutput::error("get_hotel_details: 'hotel_id' is required")),
        };

        let mut query: Vec<(&str, String)> = Vec::new();
        for param in ["check_in", "check_out"] {
            if let Some(v) = args.get(param).and_then(Value::as_str) {
                if !v.trim().is_empty() {
                    query.push((param, v.to_string()));
                }
            }
        }
        if let Some(k) = &self.api_key {
            query.push(("api_key", k.clone()));
        }

        let url = format!("{}/details/{hotel_id}", self.base_url);
        let body = match get_json(&self.http, &url, &query, "get_hotel_details").await {
            Ok(b) => b,
            Err(out) => return Ok(out),
        };

        let name = body
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(&hotel_id)
            .to_string();
        Ok(ToolOutput::text(format!("Details for {name}")).with_data(body))
    }
}
