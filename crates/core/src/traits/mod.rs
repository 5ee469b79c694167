//! Trait seams between the control-flow core and its collaborators.
//!
//! Every LLM judgment call sits behind one of these narrow interfaces so the
//! executor's mechanics are testable with scripted oracles.

pub mod collaborators;
pub mod llm;
pub mod orchestration;
pub mod tools;

pub use collaborators::{CompletenessChecker, MemoryStore, NoOpStatusSink, StatusSink};
pub use llm::{ChatMessage, LlmClient, LlmResponse, LlmUsage};
pub use orchestration::{AgentNode, PlanJudge, Planner, ResponseJudge, ResultJudge};
pub use tools::{Tool, ToolRegistry};
