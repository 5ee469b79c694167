//! Small practical lookups: weather, currency conversion, public holidays.
//!
//! All three back onto keyless public APIs, so unlike the travel tools they
//! carry no api_key plumbing.

use async_trait::async_trait;
use chrono::Datelike;
use serde_json::{json, Value};
use tracing::warn;

use tripflow_core::config::ToolsConfig;
use tripflow_core::traits::Tool;
use tripflow_core::types::ToolOutput;
use tripflow_core::Result;

async fn get_json(
    http: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
    label: &str,
) -> std::result::Result<Value, ToolOutput> {
    let response = match http.get(url).query(query).send().await {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, %label, "utility API request failed");
            return Err(ToolOutput::error(format!("{label} failed: {e}")));
        }
    };
    if !response.status().is_success() {
        return Err(ToolOutput::error(format!(
            "{label}: API returned status {}",
            response.status()
        )));
    }
    response
        .json()
        .await
        .map_err(|e| ToolOutput::error(format!("{label}: API sent invalid JSON: {e}")))
}

pub struct WeatherTool {
    http: reqwest::Client,
    base_url: String,
}

impl WeatherTool {
    pub fn new(http: reqwest::Client, config: &ToolsConfig) -> Self {
        Self {
            http,
            base_url: config.weather_api_url.clone(),
        }
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Current weather and short-range forecast for a location"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {"type": "string", "description": "City name, or 'lat,lon'"},
                "date": {"type": "string", "description": "Forecast date, YYYY-MM-DD"}
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput> {
        let location = match args.get("location").and_then(Value::as_str) {
            Some(l) if !l.trim().is_empty() => l.to_string(),
            _ => return Ok(ToolOutput::error("get_weather: 'location' is required")),
        };

        // Open-Meteo wants coordinates; accept "lat,lon" directly and fall
        // back to passing the name through for geocoding-capable gateways.
        let mut query: Vec<(&str, String)> = Vec::new();
        let coords: Vec<&str> = location.split(',').map(str::trim).collect();
        if coords.len() == 2
            && coords[0].parse::<f64>().is_ok()
            && coords[1].parse::<f64>().is_ok()
        {
            query.push(("latitude", coords[0].to_string()));
            query.push(("longitude", coords[1].to_string()));
        } else {
            query.push(("location", location.clone()));
        }
        query.push(("current_weather", "true".into()));
        if let Some(d) = args.get("date").and_then(Value::as_str) {
            if !d.trim().is_empty() {
                query.push(("start_date", d.to_string()));
                query.push(("end_date", d.to_string()));
                query.push(("daily", "temperature_2m_max,temperature_2m_min".into()));
            }
        }

        let body = match get_json(&self.http, &self.base_url, &query, "get_weather").await {
            Ok(b) => b,
            Err(out) => return Ok(out),
        };

        let summary = body
            .get("current_weather")
            .and_then(|w| w.get("temperature"))
            .and_then(Value::as_f64)
            .map(|t| format!("Current temperature in {location}: {t}°C"))
            .unwrap_or_else(|| format!("Weather data for {location}"));
        Ok(ToolOutput::text(summary).with_data(body))
    }
}

pub struct CurrencyTool {
    http: reqwest::Client,
    base_url: String,
}

impl CurrencyTool {
    pub fn new(http: reqwest::Client, config: &ToolsConfig) -> Self {
        Self {
            http,
            base_url: config.currency_api_url.clone(),
        }
    }
}

#[async_trait]
impl Tool for CurrencyTool {
    fn name(&self) -> &str {
        "convert_currency"
    }

    fn description(&self) -> &str {
        "Convert an amount between two currencies at the latest rate"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "from": {"type": "string", "description": "Source currency code, e.g. USD"},
                "to": {"type": "string", "description": "Target currency code, e.g. EUR"},
                "amount": {"type": "number", "description": "Amount to convert; defaults to 1"}
            },
            "required": ["from", "to"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput> {
        let from = match args.get("from").and_then(Value::as_str) {
            Some(f) if !f.trim().is_empty() => f.to_uppercase(),
            _ => return Ok(ToolOutput::error("convert_currency: 'from' is required")),
        };
        let to = match args.get("to").and_then(Value::as_str) {
            Some(t) if !t.trim().is_empty() => t.to_uppercase(),
            _ => return Ok(ToolOutput::error("convert_currency: 'to' is required")),
        };
        let amount = args.get("amount").and_then(Value::as_f64).unwrap_or(1.0);

        let query: Vec<(&str, String)> = vec![
            ("amount", amount.to_string()),
            ("from", from.clone()),
            ("to", to.clone()),
        ];
        let body = match get_json(&self.http, &self.base_url, &query, "convert_currency").await {
            Ok(b) => b,
            Err(out) => return Ok(out),
        };

        let converted = body
            .get("rates")
            .and_then(|r| r.get(&to))
            .and_then(Value::as_f64);
        match converted {
            Some(v) => Ok(ToolOutput::text(format!("{amount} {from} = {v} {to}"))
                .with_data(json!({"from": from, "to": to, "amount": amount, "converted": v}))),
            None => Ok(ToolOutput::error(format!(
                "convert_currency: no rate available for {from} -> {to}"
            ))),
        }
    }
}

pub struct HolidaysTool {
    http: reqwest::Client,
    base_url: String,
}

impl HolidaysTool {
    pub fn new(http: reqwest::Client, config: &ToolsConfig) -> Self {
        Self {
            http,
            base_url: config.holidays_api_url.clone(),
        }
    }
}

#[async_trait]
impl Tool for HolidaysTool {
    fn name(&self) -> &str {
        "get_holidays"
    }

    fn description(&self) -> &str {
        "Public holidays for a country, by ISO country code"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "country_code": {"type": "string", "description": "ISO 3166-1 alpha-2 code, e.g. JP"},
                "year": {"type": "integer", "description": "Year; defaults to the current year"}
            },
            "required": ["country_code"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput> {
        let country = match args.get("country_code").and_then(Value::as_str) {
            Some(c) if !c.trim().is_empty() => c.to_uppercase(),
            _ => return Ok(ToolOutput::error("get_holidays: 'country_code' is required")),
        };
        let year = args
            .get("year")
            .and_then(Value::as_i64)
            .unwrap_or_else(|| chrono::Utc::now().year() as i64);

        let url = format!("{}/{year}/{country}", self.base_url);
        let body = match get_json(&self.http, &url, &[], "get_holidays").await {
            Ok(b) => b,
            Err(out) => return Ok(out),
        };

        let holidays = body.as_array().cloned().unwrap_or_default();
        if holidays.is_empty() {
            return Ok(
                ToolOutput::text(format!("No public holidays listed for {country} in {year}"))
                    .with_data(json!({"holidays": []})),
            );
        }
        Ok(ToolOutput::text(format!(
            "{} public holidays in {country} during {year}",
            holidays.len()
        ))
        .with_data(json!({ "holidays": holidays })))
    }
}
