use config::{Config, ConfigError, Environment, File};
use secrecy::Secret;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub orchestrator: OrchestratorConfig,
    pub model_gateway: ModelGatewayConfig,
    pub tools: ToolsConfig,
}

/// Retry caps and loop bounds for the plan executor.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Max replans after a plan-level rejection (structural or logical).
    pub max_plan_retries: usize,
    /// Max re-dispatches per agent after a feedback rejection.
    pub max_agent_retries: usize,
    /// Max regenerations of the final response.
    pub max_response_retries: usize,
    /// Max tool-directive iterations inside one agent dispatch.
    pub max_tool_iterations: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ModelGatewayConfig {
    /// Provider for agent and planner calls ("openai" or "anthropic").
    pub provider: String,
    /// Model for planner/agent/conversational calls.
    pub model: String,
    /// Model for judge calls; judges run fine on a smaller model.
    pub judge_model: String,
    pub openai_api_key: Option<Secret<String>>,
    pub anthropic_api_key: Option<Secret<String>>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ToolsConfig {
    pub flight_api_url: String,
    pub hotel_api_url: String,
    pub visa_api_url: String,
    pub attractions_api_url: String,
    pub weather_api_url: String,
    pub currency_api_url: String,
    pub holidays_api_url: String,
    pub travel_api_key: Option<Secret<String>>,
}

impl AppConfig {
    /// Layered load: config files, then `TRIPFLOW__`-prefixed env overrides.
    ///
    /// Every field carries a serde default, so partial sources (a lone env
    /// var, a config file that only sets one section) merge over the
    /// defaults instead of failing to deserialize.
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("TRIPFLOW_ENV").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Map TRIPFLOW__TOOLS__FLIGHT_API_URL=... to tools.flight_api_url
            .add_source(Environment::with_prefix("TRIPFLOW").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_plan_retries: 2,
            max_agent_retries: 2,
            max_response_retries: 2,
            max_tool_iterations: 3,
        }
    }
}

impl Default for ModelGatewayConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            model: "gpt-4o".into(),
            judge_model: "gpt-4o-mini".into(),
            openai_api_key: None,
            anthropic_api_key: None,
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            flight_api_url: "https://serpapi.com/search".into(),
            hotel_api_url: "https://api.tripflow.dev/hotels".into(),
            visa_api_url: "https://api.tripflow.dev/visa".into(),
            attractions_api_url: "https://api.content.tripadvisor.com/api/v2".into(),
            weather_api_url: "https://api.open-meteo.com/v1/forecast".into(),
            currency_api_url: "https://api.frankfurter.app/latest".into(),
            holidays_api_url: "https://date.nager.at/api/v3/PublicHolidays".into(),
            travel_api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_source_merges_over_defaults() {
        let cfg: AppConfig = serde_json::from_str(
            r#"{"model_gateway": {"provider": "anthropic"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.model_gateway.provider, "anthropic");
        assert_eq!(cfg.model_gateway.model, "gpt-4o");
        assert_eq!(cfg.orchestrator.max_plan_retries, 2);
    }

    #[test]
    fn env_override_survives_load() {
        std::env::set_var("TRIPFLOW__MODEL_GATEWAY__PROVIDER", "anthropic");
        let cfg = AppConfig::load().unwrap();
        std::env::remove_var("TRIPFLOW__MODEL_GATEWAY__PROVIDER");
        assert_eq!(cfg.model_gateway.provider, "anthropic");
        assert_eq!(cfg.tools.currency_api_url, "https://api.frankfurter.app/latest");
    }
}
