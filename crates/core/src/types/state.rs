//! Per-turn context threaded through planning and execution.
//!
//! The turn state is owned exclusively by the executor for the duration of a
//! user turn. Concurrent agent tasks never touch it: each task receives a
//! read-only snapshot of prior-step results and hands its own result back
//! over a channel, so the one-writer-per-key invariant holds by construction.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::agent::AgentName;
use super::plan::ExecutionPlan;
use super::result::AgentResult;

/// Input to the planner.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub user_message: String,
    /// Facts retrieved from the memory collaborator at turn start.
    pub memory: Vec<String>,
    /// Previous plan, present only on a replan.
    pub prior_plan: Option<ExecutionPlan>,
    /// Feedback message from the plan judge or structural validator,
    /// present only on a replan.
    pub feedback: Option<String>,
}

impl PlanRequest {
    pub fn new(user_message: impl Into<String>, memory: Vec<String>) -> Self {
        Self {
            user_message: user_message.into(),
            memory,
            prior_plan: None,
            feedback: None,
        }
    }

    /// Derive the request for the next planning attempt.
    pub fn with_feedback(mut self, prior: ExecutionPlan, feedback: impl Into<String>) -> Self {
        self.prior_plan = Some(prior);
        self.feedback = Some(feedback.into());
        self
    }
}

/// What the planner decided to do with the request.
#[derive(Debug, Clone)]
pub enum PlannerDecision {
    /// Execute this plan.
    Plan(ExecutionPlan),
    /// Greeting or small talk; skip straight to the conversational agent.
    Chat,
}

/// Explicit retry record threaded into a re-dispatch.
///
/// Feedback from a rejected attempt travels here rather than being spliced
/// into the prompt by the caller; the agent decides how to apply it.
#[derive(Debug, Clone, Default)]
pub struct AttemptContext {
    /// 0 for the first dispatch, 1 for the first retry, and so on.
    pub attempt: usize,
    /// Judge feedback from the rejected previous attempt.
    pub feedback: Option<String>,
}

impl AttemptContext {
    /// Context for the retry following a rejection.
    pub fn next(&self, feedback: impl Into<String>) -> Self {
        Self {
            attempt: self.attempt + 1,
            feedback: Some(feedback.into()),
        }
    }
}

/// Everything an agent task gets for one dispatch.
#[derive(Debug, Clone)]
pub struct StepContext {
    pub user_message: String,
    /// The current step's description. Primary instruction for the agent.
    pub description: String,
    /// Memory facts retrieved at turn start.
    pub memory: Vec<String>,
    /// Read-only snapshot of results committed by earlier steps.
    pub prior_results: HashMap<AgentName, AgentResult>,
    pub attempt: AttemptContext,
}

impl StepContext {
    /// The instruction the agent should act on: the step description when the
    /// plan carries one, the raw user message only as a fallback.
    pub fn instruction(&self) -> &str {
        if self.description.trim().is_empty() {
            &self.user_message
        } else {
            &self.description
        }
    }
}

/// Mutable per-turn state owned by the executor.
#[derive(Debug, Clone)]
pub struct TurnState {
    pub turn_id: String,
    pub session_id: String,
    pub user_message: String,
    pub memory: Vec<String>,
    pub plan: Option<ExecutionPlan>,
    /// Latest committed result per agent. Within a step each agent writes a
    /// disjoint key; across steps a later result overwrites an earlier one.
    pub results: HashMap<AgentName, AgentResult>,
    /// Per-node retry counters, keyed by node name, reset each turn.
    pub retries: HashMap<String, usize>,
    /// Agents whose result was committed only because retries ran out.
    pub degraded: BTreeSet<AgentName>,
    pub response: Option<String>,
}

impl TurnState {
    pub fn new(
        session_id: impl Into<String>,
        user_message: impl Into<String>,
        memory: Vec<String>,
    ) -> Self {
        Self {
            turn_id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            user_message: user_message.into(),
            memory,
            plan: None,
            results: HashMap::new(),
            retries: HashMap::new(),
            degraded: BTreeSet::new(),
            response: None,
        }
    }

    /// Bump and return the retry counter for a node.
    pub fn bump_retry(&mut self, node: &str) -> usize {
        let counter = self.retries.entry(node.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }
}

/// Merged view of all committed results, produced by the join node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectedInfo {
    /// Union of committed results across all steps, keyed by agent.
    pub results: BTreeMap<AgentName, AgentResult>,
    /// Agents whose committed result exhausted its retry budget.
    pub degraded: Vec<AgentName>,
}

impl CollectedInfo {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// What a completed turn hands back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub response_text: String,
    /// Agents actually dispatched during the turn, in stable order.
    pub agents_called: Vec<AgentName>,
    /// Agents whose results may be incomplete (retry budget exhausted).
    pub degraded: Vec<AgentName>,
}

/// Result of the request-for-information completeness gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completeness {
    pub complete: bool,
    #[serde(default)]
    pub missing_fields: Vec<String>,
    /// Clarification to send back to the user when incomplete.
    #[serde(default)]
    pub question: Option<String>,
}

impl Completeness {
    pub fn complete() -> Self {
        Self {
            complete: true,
            missing_fields: Vec::new(),
            question: None,
        }
    }
}
