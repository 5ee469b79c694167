//! Scripted mock implementations of the core traits.
//!
//! These drive the executor's state machine in tests without a real model:
//! every oracle returns queued, deterministic answers and records what it was
//! asked, so dispatch counts, retry threading, and isolation properties can
//! be asserted exactly.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::events::TurnEvent;
use crate::traits::{
    AgentNode, CompletenessChecker, LlmClient, LlmResponse, MemoryStore, PlanJudge, Planner,
    ResponseJudge, ResultJudge, StatusSink, Tool, ToolRegistry,
};
use crate::traits::llm::ChatMessage;
use crate::types::{
    AgentName, AgentResult, CollectedInfo, Completeness, ExecutionPlan, FeedbackVerdict,
    PlanRequest, PlannerDecision, ResultPayload, StepContext, ToolDefinition, ToolOutput,
};

// =============================================================================
// Mock LLM client
// =============================================================================

/// Scripted LLM that returns queued responses in order.
pub struct MockLlm {
    responses: Mutex<Vec<String>>,
    calls: Mutex<Vec<String>>,
}

impl MockLlm {
    /// Create a mock with a queue of responses, consumed front to back.
    /// The last response repeats once the queue is exhausted.
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A mock that always returns the same response.
    pub fn constant(response: &str) -> Self {
        Self::new(vec![response.to_string()])
    }

    /// Number of calls made to this mock.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Prompts this mock has received, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn next_response(&self, prompt: &str) -> String {
        self.calls.lock().unwrap().push(prompt.to_string());
        let mut queue = self.responses.lock().unwrap();
        if queue.len() > 1 {
            queue.remove(0)
        } else {
            queue.first().cloned().unwrap_or_default()
        }
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn complete(&self, prompt: &str) -> Result<LlmResponse> {
        Ok(LlmResponse::text(self.next_response(prompt)))
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<LlmResponse> {
        let prompt = messages
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n");
        self.complete(&prompt).await
    }
}

// =============================================================================
// Scripted planner and judges
// =============================================================================

/// Planner that replays queued decisions and records the requests it saw.
pub struct ScriptedPlanner {
    decisions: Mutex<Vec<Result<PlannerDecision>>>,
    requests: Mutex<Vec<PlanRequest>>,
}

impl ScriptedPlanner {
    pub fn new(decisions: Vec<Result<PlannerDecision>>) -> Self {
        Self {
            decisions: Mutex::new(decisions),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Planner that always returns the given plan.
    pub fn always(plan: ExecutionPlan) -> Self {
        Self::new(vec![Ok(PlannerDecision::Plan(plan))])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests received so far (for asserting feedback threading).
    pub fn requests(&self) -> Vec<PlanRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Planner for ScriptedPlanner {
    async fn plan(&self, request: &PlanRequest) -> Result<PlannerDecision> {
        self.requests.lock().unwrap().push(request.clone());
        let mut queue = self.decisions.lock().unwrap();
        if queue.is_empty() {
            return Err(Error::planning("scripted planner exhausted"));
        }
        if queue.len() > 1 {
            queue.remove(0)
        } else {
            // Repeat the last decision; clone by re-scripting.
            match queue.first().unwrap() {
                Ok(decision) => Ok(decision.clone()),
                Err(e) => Err(Error::planning(e.to_string())),
            }
        }
    }
}

/// Plan judge replaying queued verdicts (defaults to Pass once exhausted).
pub struct ScriptedPlanJudge {
    verdicts: Mutex<Vec<FeedbackVerdict>>,
    calls: Mutex<usize>,
}

impl ScriptedPlanJudge {
    pub fn new(verdicts: Vec<FeedbackVerdict>) -> Self {
        Self {
            verdicts: Mutex::new(verdicts),
            calls: Mutex::new(0),
        }
    }

    pub fn passing() -> Self {
        Self::new(Vec::new())
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl PlanJudge for ScriptedPlanJudge {
    async fn judge(&self, _plan: &ExecutionPlan, _user_message: &str) -> Result<FeedbackVerdict> {
        *self.calls.lock().unwrap() += 1;
        let mut queue = self.verdicts.lock().unwrap();
        if queue.is_empty() {
            Ok(FeedbackVerdict::pass())
        } else {
            Ok(queue.remove(0))
        }
    }
}

/// Result judge replaying queued verdicts for one agent.
pub struct ScriptedResultJudge {
    agent: AgentName,
    verdicts: Mutex<Vec<FeedbackVerdict>>,
    calls: Mutex<usize>,
}

impl ScriptedResultJudge {
    pub fn new(agent: AgentName, verdicts: Vec<FeedbackVerdict>) -> Self {
        Self {
            agent,
            verdicts: Mutex::new(verdicts),
            calls: Mutex::new(0),
        }
    }

    pub fn passing(agent: AgentName) -> Self {
        Self::new(agent, Vec::new())
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ResultJudge for ScriptedResultJudge {
    fn agent(&self) -> AgentName {
        self.agent
    }

    async fn judge(&self, _result: &AgentResult, _ctx: &StepContext) -> Result<FeedbackVerdict> {
        *self.calls.lock().unwrap() += 1;
        let mut queue = self.verdicts.lock().unwrap();
        if queue.is_empty() {
            Ok(FeedbackVerdict::pass())
        } else {
            Ok(queue.remove(0))
        }
    }
}

/// Response judge replaying queued verdicts.
pub struct ScriptedResponseJudge {
    verdicts: Mutex<Vec<FeedbackVerdict>>,
}

impl ScriptedResponseJudge {
    pub fn new(verdicts: Vec<FeedbackVerdict>) -> Self {
        Self {
            verdicts: Mutex::new(verdicts),
        }
    }

    pub fn passing() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl ResponseJudge for ScriptedResponseJudge {
    async fn judge(
        &self,
        _response: &str,
        _info: &CollectedInfo,
        _user_message: &str,
    ) -> Result<FeedbackVerdict> {
        let mut queue = self.verdicts.lock().unwrap();
        if queue.is_empty() {
            Ok(FeedbackVerdict::pass())
        } else {
            Ok(queue.remove(0))
        }
    }
}

// =============================================================================
// Scripted agent node
// =============================================================================

/// Agent node that records every dispatch context it receives.
pub struct ScriptedAgent {
    name: AgentName,
    results: Mutex<Vec<AgentResult>>,
    dispatches: Mutex<Vec<StepContext>>,
}

impl ScriptedAgent {
    pub fn new(name: AgentName, results: Vec<AgentResult>) -> Self {
        Self {
            name,
            results: Mutex::new(results),
            dispatches: Mutex::new(Vec::new()),
        }
    }

    /// Agent that always succeeds with an empty payload.
    pub fn succeeding(name: AgentName) -> Self {
        Self::new(name, Vec::new())
    }

    /// Number of times this agent was dispatched.
    pub fn dispatch_count(&self) -> usize {
        self.dispatches.lock().unwrap().len()
    }

    /// The contexts this agent was dispatched with, in order.
    pub fn dispatches(&self) -> Vec<StepContext> {
        self.dispatches.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentNode for ScriptedAgent {
    fn name(&self) -> AgentName {
        self.name
    }

    async fn execute(&self, ctx: &StepContext) -> Result<AgentResult> {
        self.dispatches.lock().unwrap().push(ctx.clone());
        let mut queue = self.results.lock().unwrap();
        if queue.is_empty() {
            Ok(AgentResult::ok(self.name, ResultPayload::empty_for(self.name)))
        } else {
            Ok(queue.remove(0))
        }
    }
}

// =============================================================================
// Collaborator mocks
// =============================================================================

/// In-memory mock for MemoryStore.
#[derive(Default)]
pub struct MockMemoryStore {
    facts: Mutex<HashMap<String, Vec<String>>>,
}

impl MockMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with facts for a user.
    pub fn with_facts(user_id: &str, facts: Vec<String>) -> Self {
        let store = Self::new();
        store
            .facts
            .lock()
            .unwrap()
            .insert(user_id.to_string(), facts);
        store
    }

    pub fn facts_for(&self, user_id: &str) -> Vec<String> {
        self.facts
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl MemoryStore for MockMemoryStore {
    async fn retrieve_relevant(&self, user_id: &str, _query: &str) -> Result<Vec<String>> {
        Ok(self.facts_for(user_id))
    }

    async fn remember(&self, user_id: &str, fact: &str) -> Result<()> {
        self.facts
            .lock()
            .unwrap()
            .entry(user_id.to_string())
            .or_default()
            .push(fact.to_string());
        Ok(())
    }
}

/// Completeness checker with a fixed answer.
pub struct MockCompletenessChecker {
    answer: Completeness,
}

impl MockCompletenessChecker {
    pub fn complete() -> Self {
        Self {
            answer: Completeness::complete(),
        }
    }

    pub fn missing(question: &str, fields: Vec<String>) -> Self {
        Self {
            answer: Completeness {
                complete: false,
                missing_fields: fields,
                question: Some(question.to_string()),
            },
        }
    }
}

#[async_trait]
impl CompletenessChecker for MockCompletenessChecker {
    async fn check(&self, _user_message: &str) -> Result<Completeness> {
        Ok(self.answer.clone())
    }
}

/// Status sink that records event labels for assertions.
#[derive(Default)]
pub struct RecordingStatusSink {
    events: Mutex<Vec<TurnEvent>>,
}

impl RecordingStatusSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TurnEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Event labels (see `TurnEventKind::label`) in emission order.
    pub fn labels(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.kind.label())
            .collect()
    }
}

#[async_trait]
impl StatusSink for RecordingStatusSink {
    async fn emit(&self, event: TurnEvent) {
        self.events.lock().unwrap().push(event);
    }
}

// =============================================================================
// Mock tool registry
// =============================================================================

/// Tool registry returning scripted outputs, recording every invocation.
#[derive(Default)]
pub struct MockToolRegistry {
    outputs: Mutex<HashMap<String, ToolOutput>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the output for a tool name.
    pub fn script(self, tool: &str, output: ToolOutput) -> Self {
        self.outputs
            .lock()
            .unwrap()
            .insert(tool.to_string(), output);
        self
    }

    /// Tool invocations observed so far.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolRegistry for MockToolRegistry {
    async fn register(&self, _tool: Box<dyn Tool>) -> Result<()> {
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ToolDefinition>> {
        Ok(self
            .outputs
            .lock()
            .unwrap()
            .keys()
            .map(|name| ToolDefinition {
                name: name.clone(),
                description: String::new(),
                parameters: Value::Null,
            })
            .collect())
    }

    async fn execute(&self, name: &str, args: Value) -> Result<ToolOutput> {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), args.clone()));
        self.outputs
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::tool_not_found(name))
    }
}
