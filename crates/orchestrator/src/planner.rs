//! LLM-backed planner.
//!
//! The planner turns one user message into an execution plan: numbered
//! steps, each naming the agents that run concurrently in that step. It can
//! also decide the message needs no plan at all (greetings, small talk) and
//! route straight to the conversational agent.

use async_trait::async_trait;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use tripflow_core::json::extract_json_object;
use tripflow_core::traits::{LlmClient, Planner};
use tripflow_core::types::{AgentName, ExecutionPlan, PlanRequest, PlanStep, PlannerDecision};
use tripflow_core::{Error, Result};

pub struct LlmPlanner {
    llm: Arc<dyn LlmClient>,
}

impl LlmPlanner {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    fn build_prompt(&self, request: &PlanRequest) -> String {
        let mut prompt = String::from(
            "You are the coordinator of a team of travel agents. Break the \
             traveller's request into an execution plan.\n\n\
             Available agents:\n",
        );
        for agent in AgentName::ALL {
            prompt.push_str(&format!("- {agent}\n"));
        }
        prompt.push_str(
            "\nRules:\n\
             - Steps are numbered from 1 and run in order.\n\
             - Agents within one step run concurrently and must not depend \
               on each other.\n\
             - An agent that needs another agent's output goes in a later \
               step.\n\
             - Use only the agents the request actually needs.\n\n\
             Reply with JSON only:\n\
             {\"plan\": [{\"step\": 1, \"agents\": [\"flight_agent\"], \
             \"description\": \"...\"}]}\n\
             If the message is a greeting or small talk that needs no \
             agents, reply instead with:\n\
             {\"plan\": \"chat\"}\n",
        );

        if !request.memory.is_empty() {
            prompt.push_str("\nKnown traveller context:\n");
            for fact in &request.memory {
                prompt.push_str(&format!("- {fact}\n"));
            }
        }

        if let (Some(prior), Some(feedback)) = (&request.prior_plan, &request.feedback) {
            prompt.push_str(&format!(
                "\nYour previous plan was rejected. Previous plan:\n{}\n\
                 Rejection feedback:\n{feedback}\n\
                 Produce a corrected plan.\n",
                prior.render()
            ));
        } else if let Some(feedback) = &request.feedback {
            prompt.push_str(&format!(
                "\nYour previous reply could not be used:\n{feedback}\n\
                 Produce a corrected plan.\n"
            ));
        }

        prompt.push_str(&format!("\nRequest: {}\n", request.user_message));
        prompt
    }

    fn parse_reply(reply: &str) -> Result<PlannerDecision> {
        let json = extract_json_object(reply)
            .ok_or_else(|| Error::plan_structure("planner reply carries no JSON object"))?;

        let plan_field = json
            .get("plan")
            .ok_or_else(|| Error::plan_structure("planner reply has no 'plan' field"))?;

        if let Some(text) = plan_field.as_str() {
            return match text.trim().to_ascii_lowercase().as_str() {
                "chat" | "none" => Ok(PlannerDecision::Chat),
                other => Err(Error::plan_structure(format!(
                    "unexpected plan value: {other}"
                ))),
            };
        }

        let raw_steps = plan_field
            .as_array()
            .ok_or_else(|| Error::plan_structure("'plan' is neither steps nor \"chat\""))?;

        let mut steps = Vec::with_capacity(raw_steps.len());
        for raw in raw_steps {
            let step_number = raw
                .get("step")
                .or_else(|| raw.get("step_number"))
                .and_then(Value::as_u64)
                .ok_or_else(|| Error::plan_structure("step without a number"))? as usize;
            let agents = raw
                .get("agents")
                .and_then(Value::as_array)
                .ok_or_else(|| Error::plan_structure("step without an agents array"))?
                .iter()
                .map(|a| {
                    a.as_str()
                        .ok_or_else(|| Error::plan_structure("non-string agent name"))
                        .and_then(AgentName::from_str)
                })
                .collect::<Result<Vec<_>>>()?;
            let description = raw
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            steps.push(PlanStep {
                step_number,
                agents,
                description,
            });
        }

        // Shape validation happens here; logical soundness is the plan
        // judge's job.
        Ok(PlannerDecision::Plan(ExecutionPlan::new(steps)?))
    }
}

#[async_trait]
impl Planner for LlmPlanner {
    async fn plan(&self, request: &PlanRequest) -> Result<PlannerDecision> {
        let prompt = self.build_prompt(request);
        let reply = self.llm.complete(&prompt).await?;
        debug!(reply = %reply.content, "planner reply");
        Self::parse_reply(&reply.content)
    }
}
