//! Shared data model for the orchestration core.

pub mod agent;
pub mod plan;
pub mod result;
pub mod state;
pub mod tool;
pub mod verdict;

pub use agent::AgentName;
pub use plan::{ExecutionPlan, PlanStep};
pub use result::{
    AgentResult, AttractionData, FlightData, HotelData, ResultPayload, UtilityData, VisaData,
};
pub use state::{
    AttemptContext, CollectedInfo, Completeness, PlanRequest, PlannerDecision, StepContext,
    TurnOutcome, TurnState,
};
pub use tool::{CapabilityTable, ToolDefinition, ToolOutput, ToolSpec};
pub use verdict::{FeedbackVerdict, VerdictStatus};
