//! Plan-level judge.
//!
//! Validates only the logical soundness of a plan: agent relevance to the
//! request, no unnecessary agents, correct ordering of dependencies.
//! Structural shape is already enforced in code before this judge runs, and
//! missing user parameters are each agent's concern, never the plan's.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use tripflow_core::json::extract_json_object;
use tripflow_core::traits::{LlmClient, PlanJudge};
use tripflow_core::types::{ExecutionPlan, FeedbackVerdict, VerdictStatus};
use tripflow_core::Result;

pub struct LlmPlanJudge {
    llm: Arc<dyn LlmClient>,
}

impl LlmPlanJudge {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    fn build_prompt(plan: &ExecutionPlan, user_message: &str) -> String {
        format!(
            "You are reviewing an execution plan for a travel request.\n\n\
             Request: {user_message}\n\nPlan:\n{plan}\n\
             Approve the plan unless it is logically unsound. Reject only \
             when:\n\
             - an agent is irrelevant to the request,\n\
             - a clearly needed agent is missing,\n\
             - agents in the same step depend on each other's output, or\n\
             - a step depends on a later step.\n\
             Do NOT reject for missing traveller details such as dates or \
             cities; each agent handles its own missing parameters.\n\n\
             Reply with JSON only:\n\
             {{\"validation_status\": \"pass\" | \"need_plan_fix\", \
             \"feedback_message\": \"<what to change, if rejecting>\"}}",
            plan = plan.render(),
        )
    }
}

#[async_trait]
impl PlanJudge for LlmPlanJudge {
    async fn judge(&self, plan: &ExecutionPlan, user_message: &str) -> Result<FeedbackVerdict> {
        let prompt = Self::build_prompt(plan, user_message);
        let reply = match self.llm.complete(&prompt).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "plan judge call failed, passing");
                return Ok(FeedbackVerdict::pass());
            }
        };

        let Some(json) = extract_json_object(&reply.content) else {
            warn!("unparseable plan judge reply, passing");
            return Ok(FeedbackVerdict::pass());
        };
        let mut verdict = match FeedbackVerdict::from_judge_json(&json) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "bad plan judge verdict, passing");
                return Ok(FeedbackVerdict::pass());
            }
        };
        // The only rejection a plan judge can issue is a plan fix.
        if verdict.status == VerdictStatus::NeedRetry {
            verdict.status = VerdictStatus::NeedPlanFix;
        }
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripflow_core::mocks::MockLlm;
    use tripflow_core::types::{AgentName, PlanStep};

    fn plan() -> ExecutionPlan {
        ExecutionPlan::new(vec![PlanStep {
            step_number: 1,
            agents: vec![AgentName::Hotel],
            description: "Find hotels in Lisbon".into(),
        }])
        .unwrap()
    }

    #[tokio::test]
    async fn rejection_becomes_plan_fix() {
        let llm = Arc::new(MockLlm::constant(
            r#"{"validation_status": "need_plan_fix", "feedback_message": "flight agent is missing"}"#,
        ));
        let judge = LlmPlanJudge::new(llm);
        let verdict = judge.judge(&plan(), "flights and hotels in Lisbon").await.unwrap();
        assert_eq!(verdict.status, VerdictStatus::NeedPlanFix);
    }

    #[tokio::test]
    async fn judge_failure_passes_the_plan() {
        let llm = Arc::new(MockLlm::constant("I think it looks fine?"));
        let judge = LlmPlanJudge::new(llm);
        assert!(judge.judge(&plan(), "hotels in Lisbon").await.unwrap().is_pass());
    }
}
