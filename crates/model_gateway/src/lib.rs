//! Model gateway for Tripflow.
//!
//! Adapts Rig provider clients to the `LlmClient` trait so the orchestrator,
//! agents, and judges never see a concrete provider.

pub mod rig_client;

pub use rig_client::{create_default_client, RigConfig, RigLlmClient, RigProvider};

use secrecy::{ExposeSecret, Secret};
use tripflow_core::config::ModelGatewayConfig;
use tripflow_core::{Error, Result};

/// Build the planner/agent client and the judge client from configuration.
///
/// Judges run on their own (typically smaller) model; both clients share the
/// provider and API key from the config.
pub fn create_clients_from_config(
    config: &ModelGatewayConfig,
) -> Result<(RigLlmClient, RigLlmClient)> {
    let provider = match config.provider.to_lowercase().as_str() {
        "openai" => RigProvider::OpenAI,
        "anthropic" => RigProvider::Anthropic,
        other => {
            return Err(Error::model_provider(format!(
                "unsupported provider: {other}"
            )))
        }
    };

    let key = match provider {
        RigProvider::OpenAI => config.openai_api_key.as_ref(),
        RigProvider::Anthropic => config.anthropic_api_key.as_ref(),
    };
    export_key(provider, key);

    let main = RigLlmClient::new(RigConfig {
        provider,
        model: config.model.clone(),
        temperature: Some(0.7),
    });
    let judge = RigLlmClient::new(RigConfig {
        provider,
        model: config.judge_model.clone(),
        temperature: Some(0.3),
    });
    Ok((main, judge))
}

// Rig provider clients read keys from the environment.
fn export_key(provider: RigProvider, key: Option<&Secret<String>>) {
    if let Some(key) = key {
        let var = match provider {
            RigProvider::OpenAI => "OPENAI_API_KEY",
            RigProvider::Anthropic => "ANTHROPIC_API_KEY",
        };
        std::env::set_var(var, key.expose_secret());
    }
}
