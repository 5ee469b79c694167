//! Rig LLM client adapter.
//!
//! Wraps Rig's Agent for integration with our LlmClient trait.

use async_trait::async_trait;

use tripflow_core::{
    traits::{ChatMessage, LlmClient, LlmResponse, LlmUsage},
    Error, Result,
};

use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;

/// Provider type for Rig clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigProvider {
    OpenAI,
    Anthropic,
}

/// Configuration for a Rig client.
#[derive(Debug, Clone)]
pub struct RigConfig {
    /// Provider to use.
    pub provider: RigProvider,
    /// Model name.
    pub model: String,
    /// Temperature (0.0 - 1.0).
    pub temperature: Option<f32>,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            provider: RigProvider::OpenAI,
            model: "gpt-4o-mini".to_string(),
            temperature: Some(0.7),
        }
    }
}

impl RigConfig {
    /// Create config for OpenAI.
    pub fn openai(model: impl Into<String>) -> Self {
        Self {
            provider: RigProvider::OpenAI,
            model: model.into(),
            ..Default::default()
        }
    }

    /// Create config for Anthropic.
    pub fn anthropic(model: impl Into<String>) -> Self {
        Self {
            provider: RigProvider::Anthropic,
            model: model.into(),
            ..Default::default()
        }
    }
}

/// Rig-based LLM client.
pub struct RigLlmClient {
    config: RigConfig,
}

impl RigLlmClient {
    /// Create a new Rig client with the given configuration.
    pub fn new(config: RigConfig) -> Self {
        Self { config }
    }

    /// Client for OpenAI GPT-4o.
    pub fn gpt4o() -> Self {
        Self::new(RigConfig::openai("gpt-4o"))
    }

    /// Client for OpenAI GPT-4o-mini.
    pub fn gpt4o_mini() -> Self {
        Self::new(RigConfig::openai("gpt-4o-mini"))
    }

    /// Client for Claude Sonnet.
    pub fn claude_sonnet() -> Self {
        Self::new(RigConfig::anthropic("claude-3-5-sonnet-20241022"))
    }

    /// Build messages into a prompt string.
    fn build_prompt(&self, messages: &[ChatMessage]) -> String {
        let mut prompt = String::new();
        for msg in messages {
            match msg.role.as_str() {
                "system" => prompt.push_str(&format!("System: {}\n\n", msg.content)),
                "user" => prompt.push_str(&format!("User: {}\n\n", msg.content)),
                "assistant" => prompt.push_str(&format!("Assistant: {}\n\n", msg.content)),
                "tool" => prompt.push_str(&format!("Tool Result: {}\n\n", msg.content)),
                _ => prompt.push_str(&format!("{}: {}\n\n", msg.role, msg.content)),
            }
        }
        prompt
    }

    /// Call OpenAI via Rig.
    async fn call_openai(&self, prompt: &str) -> Result<LlmResponse> {
        use rig::providers::openai;

        // Check env var first to avoid panic
        if std::env::var("OPENAI_API_KEY").is_err() {
            return Err(Error::model_provider("OPENAI_API_KEY not set"));
        }

        let client = openai::Client::from_env();
        let mut builder = client.agent(&self.config.model);
        if let Some(t) = self.config.temperature {
            builder = builder.temperature(t as f64);
        }
        let agent = builder.build();

        let response: String = agent
            .prompt(prompt)
            .await
            .map_err(|e| Error::model_provider(format!("OpenAI error: {}", e)))?;

        Ok(Self::response_with_estimated_usage(prompt, response))
    }

    /// Call Anthropic via Rig.
    async fn call_anthropic(&self, prompt: &str) -> Result<LlmResponse> {
        use rig::providers::anthropic;

        if std::env::var("ANTHROPIC_API_KEY").is_err() {
            return Err(Error::model_provider("ANTHROPIC_API_KEY not set"));
        }

        let client = anthropic::Client::from_env();
        let mut builder = client.agent(&self.config.model);
        if let Some(t) = self.config.temperature {
            builder = builder.temperature(t as f64);
        }
        let agent = builder.build();

        let response: String = agent
            .prompt(prompt)
            .await
            .map_err(|e| Error::model_provider(format!("Anthropic error: {}", e)))?;

        Ok(Self::response_with_estimated_usage(prompt, response))
    }

    // Rig's Prompt interface does not expose token counts; estimate.
    fn response_with_estimated_usage(prompt: &str, response: String) -> LlmResponse {
        let usage = LlmUsage {
            prompt_tokens: (prompt.len() / 4) as u64,
            completion_tokens: (response.len() / 4) as u64,
            total_tokens: ((prompt.len() + response.len()) / 4) as u64,
        };
        LlmResponse {
            content: response,
            finish_reason: "stop".to_string(),
            usage,
        }
    }
}

#[async_trait]
impl LlmClient for RigLlmClient {
    async fn complete(&self, prompt: &str) -> Result<LlmResponse> {
        tracing::debug!(
            provider = ?self.config.provider,
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Calling LLM"
        );

        match self.config.provider {
            RigProvider::OpenAI => self.call_openai(prompt).await,
            RigProvider::Anthropic => self.call_anthropic(prompt).await,
        }
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<LlmResponse> {
        let prompt = self.build_prompt(messages);
        self.complete(&prompt).await
    }
}

/// Create a default LLM client based on available API keys.
pub fn create_default_client() -> Result<RigLlmClient> {
    if std::env::var("OPENAI_API_KEY").is_ok() {
        Ok(RigLlmClient::gpt4o_mini())
    } else if std::env::var("ANTHROPIC_API_KEY").is_ok() {
        Ok(RigLlmClient::new(RigConfig::anthropic(
            "claude-3-5-haiku-20241022",
        )))
    } else {
        Err(Error::model_provider(
            "No API key found. Set OPENAI_API_KEY or ANTHROPIC_API_KEY",
        ))
    }
}
