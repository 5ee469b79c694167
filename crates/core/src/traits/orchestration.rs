//! Oracle interfaces for planning, execution, and feedback.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    AgentName, AgentResult, CollectedInfo, ExecutionPlan, FeedbackVerdict, PlanRequest,
    PlannerDecision, StepContext,
};

/// The main/planning agent: turns a request into an execution plan.
#[async_trait]
pub trait Planner: Send + Sync {
    /// Produce a plan (or decide none is needed).
    ///
    /// Structurally invalid output must surface as `Error::PlanStructure`,
    /// which the executor treats as retryable, never fatal.
    async fn plan(&self, request: &PlanRequest) -> Result<PlannerDecision>;
}

/// Plan-level judge: evaluates only logical soundness of a plan.
///
/// Must never flag missing user-supplied parameters; that is each agent's
/// concern. Verdicts are restricted to Pass and NeedPlanFix.
#[async_trait]
pub trait PlanJudge: Send + Sync {
    async fn judge(&self, plan: &ExecutionPlan, user_message: &str) -> Result<FeedbackVerdict>;
}

/// A domain agent node.
#[async_trait]
pub trait AgentNode: Send + Sync {
    fn name(&self) -> AgentName;

    /// Execute one dispatch. Tool failures belong inside the returned
    /// result (`error: true`); an `Err` from this method means the dispatch
    /// itself was lost.
    async fn execute(&self, ctx: &StepContext) -> Result<AgentResult>;
}

/// Per-domain result judge. Verdicts are restricted to Pass and NeedRetry.
///
/// Validation is contextual: an empty result is acceptable when the user did
/// not supply the parameters the capability table requires for a non-empty
/// one. The judge must never invent data absent from the result.
#[async_trait]
pub trait ResultJudge: Send + Sync {
    fn agent(&self) -> AgentName;

    async fn judge(&self, result: &AgentResult, ctx: &StepContext) -> Result<FeedbackVerdict>;
}

/// Judge for the final user-facing response: coverage of collected data, no
/// raw structured data leaking into prose, no contradictions.
#[async_trait]
pub trait ResponseJudge: Send + Sync {
    async fn judge(
        &self,
        response: &str,
        info: &CollectedInfo,
        user_message: &str,
    ) -> Result<FeedbackVerdict>;
}
