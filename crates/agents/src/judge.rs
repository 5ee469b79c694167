//! LLM-backed result judges, one per agent domain.
//!
//! A judge sees the agent's result next to the task and the capability
//! table, and decides pass or retry. Judges are advisory: if the judge call
//! itself fails, the result passes rather than blocking the turn.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use tripflow_core::json::extract_json_object;
use tripflow_core::traits::{LlmClient, ResultJudge};
use tripflow_core::types::{
    AgentName, AgentResult, CapabilityTable, FeedbackVerdict, StepContext, VerdictStatus,
};
use tripflow_core::Result;
use tripflow_tools::{
    attractions_capabilities, flight_capabilities, hotel_capabilities, utilities_capabilities,
    visa_capabilities,
};

pub struct LlmResultJudge {
    agent: AgentName,
    capabilities: CapabilityTable,
    /// Domain-specific acceptance rules appended to the judge prompt.
    rules: &'static str,
    llm: Arc<dyn LlmClient>,
}

const FLIGHT_RULES: &str = "An empty flight list is acceptable only when the \
traveller did not supply origin, destination, or dates. If the route and \
dates were all given and the result is empty or errored, require a retry.";

const HOTEL_RULES: &str = "Browsing results without prices are acceptable \
when the traveller gave no dates; rates require check-in and check-out. An \
empty hotel list for a clearly named city requires a retry. Any price or \
rating not present in the result data was invented and requires a retry.";

const VISA_RULES: &str = "The result must state requirements only for the \
nationality and destination in the task. Requirements with no backing \
lookup data were invented and require a retry.";

const ATTRACTIONS_RULES: &str = "An empty list for a clearly named location \
requires a retry. Places must match the location in the task.";

const UTILITIES_RULES: &str = "The result should cover only the utility \
questions the task asks. Figures absent from the collected data were \
invented and require a retry.";

impl LlmResultJudge {
    pub fn new(
        agent: AgentName,
        capabilities: CapabilityTable,
        rules: &'static str,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            agent,
            capabilities,
            rules,
            llm,
        }
    }

    /// Judge for an agent, wired with that agent's capability table.
    pub fn for_agent(agent: AgentName, llm: Arc<dyn LlmClient>) -> Self {
        let (capabilities, rules) = match agent {
            AgentName::Flight => (flight_capabilities(), FLIGHT_RULES),
            AgentName::Hotel => (hotel_capabilities(), HOTEL_RULES),
            AgentName::Visa => (visa_capabilities(), VISA_RULES),
            AgentName::Attractions => (attractions_capabilities(), ATTRACTIONS_RULES),
            AgentName::Utilities => (utilities_capabilities(), UTILITIES_RULES),
        };
        Self::new(agent, capabilities, rules, llm)
    }

    fn build_prompt(&self, result: &AgentResult, ctx: &StepContext) -> String {
        let result_json =
            serde_json::to_string_pretty(result).unwrap_or_else(|_| "<unserializable>".into());
        format!(
            "You are validating the output of {agent} for this task:\n\
             {task}\n\n\
             The agent's tools and their parameter contracts:\n\
             {table}\n\
             Domain rules:\n{rules}\n\n\
             The result to validate:\n{result_json}\n\n\
             Validation is contextual: an empty result is acceptable when \
             the traveller did not supply the required parameters for a \
             non-empty one. Do not demand data no listed tool can produce.\n\
             Reply with JSON only:\n\
             {{\"validation_status\": \"pass\" | \"need_retry\", \
             \"feedback_message\": \"<what to fix, if retrying>\"}}",
            agent = self.agent,
            task = ctx.instruction(),
            table = self.capabilities.render(),
            rules = self.rules,
        )
    }
}

#[async_trait]
impl ResultJudge for LlmResultJudge {
    fn agent(&self) -> AgentName {
        self.agent
    }

    async fn judge(&self, result: &AgentResult, ctx: &StepContext) -> Result<FeedbackVerdict> {
        let prompt = self.build_prompt(result, ctx);
        let reply = match self.llm.complete(&prompt).await {
            Ok(r) => r,
            Err(e) => {
                // Judge unavailability must not block the turn.
                warn!(agent = %self.agent, error = %e, "result judge call failed, passing");
                return Ok(FeedbackVerdict::pass());
            }
        };

        let Some(json) = extract_json_object(&reply.content) else {
            warn!(agent = %self.agent, "unparseable judge reply, passing");
            return Ok(FeedbackVerdict::pass());
        };
        let mut verdict = match FeedbackVerdict::from_judge_json(&json) {
            Ok(v) => v,
            Err(e) => {
                warn!(agent = %self.agent, error = %e, "bad judge verdict, passing");
                return Ok(FeedbackVerdict::pass());
            }
        };

        // Result judges only speak pass/retry; a stray plan-fix verdict is
        // downgraded rather than routed to the planner.
        if verdict.status == VerdictStatus::NeedPlanFix {
            verdict.status = VerdictStatus::NeedRetry;
        }
        Ok(verdict)
    }
}
