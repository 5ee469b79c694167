//! Error types for Tripflow.

use thiserror::Error;

/// Result type alias using Tripflow's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for Tripflow.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Planning Errors
    // =========================================================================
    /// The planning call itself was lost (provider down, nothing parseable
    /// after all attempts). This is the only error that fails a whole turn.
    #[error("Planning failed: {0}")]
    Planning(String),

    /// The produced plan fails shape validation (empty steps, unknown agent,
    /// non-contiguous step numbers). Always retryable via replanning.
    #[error("Invalid plan structure: {0}")]
    PlanStructure(String),

    // =========================================================================
    // Execution Errors
    // =========================================================================
    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Judge error: {0}")]
    Judge(String),

    #[error("Response generation failed: {0}")]
    Response(String),

    // =========================================================================
    // Tool Errors
    // =========================================================================
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Tool execution failed: {0}")]
    ToolExecution(String),

    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    #[error("Model provider error: {0}")]
    ModelProvider(String),

    #[error("Memory error: {0}")]
    Memory(String),

    #[error("Completeness check failed: {0}")]
    Completeness(String),

    // =========================================================================
    // Generic Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a planning error.
    pub fn planning(msg: impl Into<String>) -> Self {
        Self::Planning(msg.into())
    }

    /// Create a plan structure error.
    pub fn plan_structure(msg: impl Into<String>) -> Self {
        Self::PlanStructure(msg.into())
    }

    /// Create an agent error.
    pub fn agent(msg: impl Into<String>) -> Self {
        Self::Agent(msg.into())
    }

    /// Create a judge error.
    pub fn judge(msg: impl Into<String>) -> Self {
        Self::Judge(msg.into())
    }

    /// Create a tool-not-found error.
    pub fn tool_not_found(name: impl Into<String>) -> Self {
        Self::ToolNotFound(name.into())
    }

    /// Create a tool execution error.
    pub fn tool_execution(msg: impl Into<String>) -> Self {
        Self::ToolExecution(msg.into())
    }

    /// Create a model provider error.
    pub fn model_provider(msg: impl Into<String>) -> Self {
        Self::ModelProvider(msg.into())
    }

    /// Create a memory error.
    pub fn memory(msg: impl Into<String>) -> Self {
        Self::Memory(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error may be recovered by replanning.
    pub fn is_replannable(&self) -> bool {
        matches!(self, Self::PlanStructure(_))
    }
}
