//! Request-for-information gate.
//!
//! Runs before any planning: if the message lacks the logical minimum to
//! act on (no destination at all, for instance), the turn short-circuits to
//! a clarifying question instead of burning a full plan/execute cycle.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use tripflow_core::json::extract_json_object;
use tripflow_core::traits::{CompletenessChecker, LlmClient};
use tripflow_core::types::Completeness;
use tripflow_core::Result;

pub struct LlmCompletenessChecker {
    llm: Arc<dyn LlmClient>,
}

impl LlmCompletenessChecker {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl CompletenessChecker for LlmCompletenessChecker {
    async fn check(&self, user_message: &str) -> Result<Completeness> {
        let prompt = format!(
            "A traveller sent this message to a travel planning assistant:\n\
             {user_message}\n\n\
             Decide whether it contains the logical minimum to act on. Be \
             permissive: missing dates or budgets are fine (agents handle \
             those); only flag a message that cannot be acted on at all, \
             such as a trip request with no destination. Greetings and \
             general questions count as complete.\n\
             Reply with JSON only:\n\
             {{\"complete\": true | false, \"missing_fields\": [\"...\"], \
             \"question\": \"<one clarifying question when incomplete>\"}}"
        );

        let reply = match self.llm.complete(&prompt).await {
            Ok(r) => r,
            Err(e) => {
                // The gate must not block the turn when its model is down.
                warn!(error = %e, "completeness check failed, treating as complete");
                return Ok(Completeness::complete());
            }
        };

        let Some(json) = extract_json_object(&reply.content) else {
            warn!("unparseable completeness reply, treating as complete");
            return Ok(Completeness::complete());
        };
        match serde_json::from_value::<Completeness>(json) {
            Ok(c) => Ok(c),
            Err(e) => {
                warn!(error = %e, "bad completeness reply, treating as complete");
                Ok(Completeness::complete())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripflow_core::mocks::MockLlm;

    #[tokio::test]
    async fn incomplete_message_yields_a_question() {
        let llm = Arc::new(MockLlm::constant(
            r#"{"complete": false, "missing_fields": ["destination"], "question": "Where would you like to go?"}"#,
        ));
        let checker = LlmCompletenessChecker::new(llm);
        let c = checker.check("book me a trip").await.unwrap();
        assert!(!c.complete);
        assert_eq!(c.question.as_deref(), Some("Where would you like to go?"));
    }

    #[tokio::test]
    async fn garbage_reply_defaults_to_complete() {
        let llm = Arc::new(MockLlm::constant("hmm, hard to say"));
        let checker = LlmCompletenessChecker::new(llm);
        assert!(checker.check("trip to Japan in May").await.unwrap().complete);
    }
}
