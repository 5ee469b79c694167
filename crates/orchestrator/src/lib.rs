//! Turn orchestration for Tripflow.
//!
//! A user turn flows through: memory recall, the request-for-information
//! gate, the planning loop (planner plus plan judge), stepwise concurrent
//! agent execution with per-agent feedback loops, the join, and finally the
//! conversational agent with its own response judge. `TurnExecutor` drives
//! the whole machine; `OrchestratorBuilder` wires it.

pub mod builder;
pub mod conversational;
pub mod executor;
pub mod join;
pub mod memory;
pub mod plan_feedback;
pub mod planner;
pub mod rfi;

pub use builder::OrchestratorBuilder;
pub use conversational::{ConversationalAgent, LlmResponseJudge};
pub use executor::TurnExecutor;
pub use memory::InMemoryMemoryStore;
pub use plan_feedback::LlmPlanJudge;
pub use planner::LlmPlanner;
pub use rfi::LlmCompletenessChecker;
