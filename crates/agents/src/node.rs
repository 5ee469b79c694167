//! The generic domain agent node.
//!
//! Every travel agent is the same machine with a different profile: a system
//! prompt, a capability table, and a payload builder that shapes collected
//! tool data into the agent's domain payload. The node runs a bounded
//! reason/act loop against the tool registry and ends with a summary answer.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use tripflow_core::traits::{AgentNode, LlmClient, ToolRegistry};
use tripflow_core::types::{AgentName, AgentResult, CapabilityTable, ResultPayload, StepContext};
use tripflow_core::Result;

use crate::directive::{parse_directive, Directive};

/// Shapes the data collected from tools into the agent's domain payload.
///
/// Keys are tool names; values are the structured `data` each successful
/// call returned.
pub type PayloadBuilder = fn(&BTreeMap<String, Value>, String) -> ResultPayload;

pub struct DomainAgent {
    name: AgentName,
    system_prompt: String,
    capabilities: CapabilityTable,
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolRegistry>,
    max_tool_iterations: usize,
    build_payload: PayloadBuilder,
}

impl DomainAgent {
    pub fn new(
        name: AgentName,
        system_prompt: impl Into<String>,
        capabilities: CapabilityTable,
        llm: Arc<dyn LlmClient>,
        tools: Arc<dyn ToolRegistry>,
        max_tool_iterations: usize,
        build_payload: PayloadBuilder,
    ) -> Self {
        Self {
            name,
            system_prompt: system_prompt.into(),
            capabilities,
            llm,
            tools,
            max_tool_iterations,
            build_payload,
        }
    }

    /// The capability table this agent publishes; its judge consults the
    /// same table.
    pub fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    fn build_prompt(&self, ctx: &StepContext, transcript: &[String]) -> String {
        let mut prompt = String::new();
        prompt.push_str(&self.system_prompt);
        prompt.push_str("\n\nAvailable tools:\n");
        prompt.push_str(&self.capabilities.render());
        prompt.push_str(
            "\nTo call a tool, reply with exactly two lines:\n\
             TOOL: <tool_name>\n\
             ARGS: {\"param\": \"value\"}\n\
             Only call a tool when you have values for all of its required \
             parameters. Never invent parameter values the traveller did not \
             give you.\n\
             When you are done, reply with one line:\n\
             ANSWER: <summary of your findings>\n",
        );

        if !ctx.memory.is_empty() {
            prompt.push_str("\nKnown traveller context:\n");
            for fact in &ctx.memory {
                prompt.push_str(&format!("- {fact}\n"));
            }
        }

        if !ctx.prior_results.is_empty() {
            prompt.push_str("\nResults from earlier steps:\n");
            for (agent, result) in &ctx.prior_results {
                prompt.push_str(&format!("- {agent}: {}\n", result.payload.summary()));
            }
        }

        prompt.push_str(&format!("\nTask: {}\n", ctx.instruction()));

        if let Some(feedback) = &ctx.attempt.feedback {
            prompt.push_str(&format!(
                "\nYour previous attempt was rejected with this feedback; \
                 address it this time:\n{feedback}\n"
            ));
        }

        if !transcript.is_empty() {
            prompt.push_str("\nObservations so far:\n");
            for entry in transcript {
                prompt.push_str(&format!("{entry}\n"));
            }
        }

        prompt
    }
}

#[async_trait]
impl AgentNode for DomainAgent {
    fn name(&self) -> AgentName {
        self.name
    }

    async fn execute(&self, ctx: &StepContext) -> Result<AgentResult> {
        let mut transcript: Vec<String> = Vec::new();
        let mut collected: BTreeMap<String, Value> = BTreeMap::new();
        let mut failures: Vec<String> = Vec::new();
        let mut summary: Option<String> = None;

        for iteration in 0..self.max_tool_iterations {
            let prompt = self.build_prompt(ctx, &transcript);
            let reply = self.llm.complete(&prompt).await?;

            match parse_directive(&reply.content) {
                Directive::Answer(text) => {
                    summary = Some(text);
                    break;
                }
                Directive::Invoke { tool, args } => {
                    let Some(spec) = self.capabilities.get(&tool) else {
                        transcript.push(format!(
                            "[{tool}] not available to this agent; choose from the listed tools"
                        ));
                        continue;
                    };
                    let missing = spec.missing_required(&args);
                    if !missing.is_empty() {
                        transcript.push(format!(
                            "[{tool}] not called: missing required parameters {}; \
                             answer with what you have instead of guessing",
                            missing.join(", ")
                        ));
                        continue;
                    }

                    debug!(agent = %self.name, %tool, iteration, "invoking tool");
                    match self.tools.execute(&tool, args).await {
                        Ok(output) if output.success => {
                            if let Some(data) = &output.data {
                                collected.insert(tool.clone(), data.clone());
                            }
                            transcript.push(format!("[{tool}] {}", output.content));
                        }
                        Ok(output) => {
                            warn!(agent = %self.name, %tool, "tool reported failure");
                            failures.push(output.content.clone());
                            transcript.push(format!("[{tool}] failed: {}", output.content));
                        }
                        Err(e) => {
                            warn!(agent = %self.name, %tool, error = %e, "tool call errored");
                            failures.push(e.to_string());
                            transcript.push(format!("[{tool}] errored: {e}"));
                        }
                    }
                }
            }
        }

        let summary = summary.unwrap_or_else(|| {
            transcript
                .last()
                .cloned()
                .unwrap_or_else(|| "No findings.".to_string())
        });

        let payload = (self.build_payload)(&collected, summary);
        let mut result = AgentResult::ok(self.name, payload);
        if collected.is_empty() && !failures.is_empty() {
            result.error = true;
            result.error_message = Some(failures.join("; "));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tripflow_core::mocks::{MockLlm, MockToolRegistry};
    use tripflow_core::types::{AttemptContext, FlightData, ToolOutput, ToolSpec};

    fn flight_payload(data: &BTreeMap<String, Value>, summary: String) -> ResultPayload {
        let options = data
            .get("search_flights")
            .and_then(|d| d.get("options"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        ResultPayload::Flights(FlightData { options, summary })
    }

    fn test_capabilities() -> CapabilityTable {
        CapabilityTable::new(vec![ToolSpec::new("search_flights", "search")
            .required(&["origin", "destination", "departure_date"])])
    }

    fn ctx(description: &str) -> StepContext {
        StepContext {
            user_message: "Plan my trip".into(),
            description: description.into(),
            memory: Vec::new(),
            prior_results: std::collections::HashMap::new(),
            attempt: AttemptContext::default(),
        }
    }

    #[tokio::test]
    async fn invokes_tool_then_answers_with_collected_data() {
        let llm = Arc::new(MockLlm::new(vec![
            "TOOL: search_flights\nARGS: {\"origin\": \"DXB\", \"destination\": \"NRT\", \"departure_date\": \"2026-09-01\"}".into(),
            "ANSWER: Found one good option.".into(),
        ]));
        let tools = Arc::new(MockToolRegistry::new().script(
            "search_flights",
            ToolOutput::text("found 1 flight")
                .with_data(json!({"options": [{"airline": "EK", "price": 480}]})),
        ));
        let agent = DomainAgent::new(
            AgentName::Flight,
            "You are a flight agent.",
            test_capabilities(),
            llm,
            tools.clone(),
            3,
            flight_payload,
        );

        let result = agent.execute(&ctx("Find flights DXB to NRT")).await.unwrap();
        assert!(!result.error);
        assert!(!result.is_empty());
        assert_eq!(result.payload.summary(), "Found one good option.");
        assert_eq!(tools.calls().len(), 1);
    }

    #[tokio::test]
    async fn missing_required_params_block_the_call() {
        let llm = Arc::new(MockLlm::new(vec![
            "TOOL: search_flights\nARGS: {\"origin\": \"DXB\"}".into(),
            "ANSWER: I need a destination and date to search.".into(),
        ]));
        let tools = Arc::new(MockToolRegistry::new());
        let agent = DomainAgent::new(
            AgentName::Flight,
            "You are a flight agent.",
            test_capabilities(),
            llm,
            tools.clone(),
            3,
            flight_payload,
        );

        let result = agent.execute(&ctx("Find me flights")).await.unwrap();
        // The registry was never hit; the agent answered with what it had.
        assert!(tools.calls().is_empty());
        assert!(result.is_empty());
        assert!(!result.error);
    }

    #[tokio::test]
    async fn tool_failure_surfaces_inside_the_result() {
        let llm = Arc::new(MockLlm::new(vec![
            "TOOL: search_flights\nARGS: {\"origin\": \"DXB\", \"destination\": \"NRT\", \"departure_date\": \"2026-09-01\"}".into(),
            "ANSWER: The flight search is unavailable right now.".into(),
        ]));
        let tools = Arc::new(
            MockToolRegistry::new()
                .script("search_flights", ToolOutput::error("upstream timed out")),
        );
        let agent = DomainAgent::new(
            AgentName::Flight,
            "You are a flight agent.",
            test_capabilities(),
            llm,
            tools,
            3,
            flight_payload,
        );

        let result = agent.execute(&ctx("Find flights DXB to NRT")).await.unwrap();
        assert!(result.error);
        assert_eq!(result.error_message.as_deref(), Some("upstream timed out"));
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn retry_feedback_lands_in_the_prompt() {
        let llm = Arc::new(MockLlm::constant("ANSWER: done"));
        let tools = Arc::new(MockToolRegistry::new());
        let agent = DomainAgent::new(
            AgentName::Flight,
            "You are a flight agent.",
            test_capabilities(),
            llm.clone(),
            tools,
            3,
            flight_payload,
        );

        let mut context = ctx("Find flights");
        context.attempt = AttemptContext::default().next("include prices next time");
        agent.execute(&context).await.unwrap();

        let prompts = llm.prompts();
        assert!(prompts[0].contains("include prices next time"));
    }
}
