//! The conversational agent and the final-response judge.
//!
//! The conversational agent is the only component that talks to the user.
//! It renders the joined results into prose, or chats directly when the
//! turn needed no agents.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use tripflow_core::json::extract_json_object;
use tripflow_core::traits::{LlmClient, ResponseJudge};
use tripflow_core::types::{CollectedInfo, FeedbackVerdict, VerdictStatus};
use tripflow_core::Result;

pub struct ConversationalAgent {
    llm: Arc<dyn LlmClient>,
}

impl ConversationalAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Render a response for the turn.
    ///
    /// `info` is `None` on the chat-only path. `feedback` carries the
    /// response judge's rejection when regenerating.
    pub async fn respond(
        &self,
        user_message: &str,
        memory: &[String],
        info: Option<&CollectedInfo>,
        feedback: Option<&str>,
    ) -> Result<String> {
        let mut prompt = String::from(
            "You are a friendly travel assistant replying to a traveller.\n\
             Write natural prose. Never dump raw JSON or internal field \
             names into the reply. Mention only information you were given \
             below; invent nothing.\n",
        );

        if !memory.is_empty() {
            prompt.push_str("\nKnown traveller context:\n");
            for fact in memory {
                prompt.push_str(&format!("- {fact}\n"));
            }
        }

        if let Some(info) = info {
            prompt.push_str("\nWhat the team found:\n");
            for (agent, result) in &info.results {
                let status = if result.error {
                    result
                        .error_message
                        .clone()
                        .unwrap_or_else(|| "lookup failed".into())
                } else {
                    result.payload.summary().to_string()
                };
                let data = serde_json::to_string(&result.payload).unwrap_or_default();
                prompt.push_str(&format!("- {agent}: {status}\n  data: {data}\n"));
            }
        } else {
            prompt.push_str("\nNo lookups were needed; just reply conversationally.\n");
        }

        if let Some(feedback) = feedback {
            prompt.push_str(&format!(
                "\nYour previous reply was rejected with this feedback; fix \
                 it:\n{feedback}\n"
            ));
        }

        prompt.push_str(&format!("\nTraveller's message: {user_message}\n"));

        let reply = self.llm.complete(&prompt).await?;
        Ok(reply.content.trim().to_string())
    }
}

/// Judge for the final response: coverage, no raw data leakage, no
/// contradictions with the collected results.
pub struct LlmResponseJudge {
    llm: Arc<dyn LlmClient>,
}

impl LlmResponseJudge {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResponseJudge for LlmResponseJudge {
    async fn judge(
        &self,
        response: &str,
        info: &CollectedInfo,
        user_message: &str,
    ) -> Result<FeedbackVerdict> {
        let collected = serde_json::to_string_pretty(info).unwrap_or_default();
        let prompt = format!(
            "You are reviewing a travel assistant's reply before it is sent.\n\n\
             Traveller's message: {user_message}\n\n\
             Data the team collected:\n{collected}\n\n\
             Reply under review:\n{response}\n\n\
             Reject when the reply ignores collected data the traveller \
             asked for, contradicts it, leaks raw JSON or field names, or \
             states facts not present in the data. Otherwise pass.\n\
             Reply with JSON only:\n\
             {{\"validation_status\": \"pass\" | \"need_regenerate\", \
             \"feedback_message\": \"<what to fix, if rejecting>\"}}"
        );

        let reply = match self.llm.complete(&prompt).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "response judge call failed, passing");
                return Ok(FeedbackVerdict::pass());
            }
        };
        let Some(json) = extract_json_object(&reply.content) else {
            warn!("unparseable response judge reply, passing");
            return Ok(FeedbackVerdict::pass());
        };
        let mut verdict = match FeedbackVerdict::from_judge_json(&json) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "bad response judge verdict, passing");
                return Ok(FeedbackVerdict::pass());
            }
        };
        // A response judge can only request regeneration.
        if verdict.status == VerdictStatus::NeedPlanFix {
            verdict.status = VerdictStatus::NeedRetry;
        }
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tripflow_core::mocks::MockLlm;
    use tripflow_core::types::{AgentName, AgentResult, ResultPayload};

    fn info_with_hotel() -> CollectedInfo {
        let mut results = BTreeMap::new();
        results.insert(
            AgentName::Hotel,
            AgentResult::ok(AgentName::Hotel, ResultPayload::empty_for(AgentName::Hotel)),
        );
        CollectedInfo {
            results,
            degraded: Vec::new(),
        }
    }

    #[tokio::test]
    async fn regeneration_feedback_reaches_the_prompt() {
        let llm = Arc::new(MockLlm::constant("Here are your hotels!"));
        let agent = ConversationalAgent::new(llm.clone());
        agent
            .respond(
                "hotels in Rome",
                &[],
                Some(&info_with_hotel()),
                Some("you leaked raw JSON"),
            )
            .await
            .unwrap();
        assert!(llm.prompts()[0].contains("you leaked raw JSON"));
    }

    #[tokio::test]
    async fn need_regenerate_maps_to_retry() {
        let llm = Arc::new(MockLlm::constant(
            r#"{"validation_status": "need_regenerate", "feedback_message": "ignored the visa data"}"#,
        ));
        let judge = LlmResponseJudge::new(llm);
        let verdict = judge
            .judge("Enjoy Rome!", &info_with_hotel(), "hotels in Rome")
            .await
            .unwrap();
        assert_eq!(verdict.status, VerdictStatus::NeedRetry);
    }
}
