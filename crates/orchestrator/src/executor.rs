//! The turn executor: the state machine driving one user turn.
//!
//! One turn moves through AwaitingPlan, RunningStep(n), StepFeedback(n),
//! Join, and Done. The executor is the only writer of turn state: agents in
//! a step run concurrently in a `JoinSet`, each receiving a read-only
//! snapshot of prior-step results and handing its outcome back through the
//! set. Step n+1 never starts before every agent of step n has completed
//! its own judge/retry loop.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use tripflow_core::config::OrchestratorConfig;
use tripflow_core::events::{TurnEvent, TurnEventKind};
use tripflow_core::traits::{
    AgentNode, CompletenessChecker, MemoryStore, PlanJudge, Planner, ResponseJudge, ResultJudge,
    StatusSink,
};
use tripflow_core::types::{
    AgentName, AgentResult, AttemptContext, CollectedInfo, ExecutionPlan, FeedbackVerdict,
    PlanRequest, PlanStep, PlannerDecision, StepContext, TurnOutcome, TurnState,
};
use tripflow_core::{Error, Result};

use crate::conversational::ConversationalAgent;
use crate::join;

/// Executor phase, reported through the status sink.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    AwaitingPlan,
    RunningStep(usize),
    StepFeedback(usize),
    Join,
    Done,
}

impl Phase {
    fn label(&self) -> String {
        match self {
            Phase::AwaitingPlan => "awaiting_plan".into(),
            Phase::RunningStep(n) => format!("running_step:{n}"),
            Phase::StepFeedback(n) => format!("step_feedback:{n}"),
            Phase::Join => "join".into(),
            Phase::Done => "done".into(),
        }
    }
}

/// Cloneable event emitter handed into agent tasks.
#[derive(Clone)]
struct Emitter {
    sink: Arc<dyn StatusSink>,
    turn_id: String,
    session_id: String,
}

impl Emitter {
    async fn emit(&self, kind: TurnEventKind) {
        let event = TurnEvent::new(&self.turn_id, &self.session_id, kind, serde_json::Value::Null);
        self.sink.emit(event).await;
    }

    async fn phase(&self, phase: Phase) {
        self.emit(TurnEventKind::PhaseChanged {
            phase: phase.label(),
        })
        .await;
    }
}

/// What one agent task hands back through the join set.
struct AgentOutcome {
    agent: AgentName,
    result: AgentResult,
    /// Retries consumed (0 when the first dispatch passed).
    retries: usize,
    degraded: bool,
}

enum PlanResolution {
    Chat,
    Plan(ExecutionPlan),
}

pub struct TurnExecutor {
    pub(crate) config: OrchestratorConfig,
    pub(crate) planner: Arc<dyn Planner>,
    pub(crate) plan_judge: Option<Arc<dyn PlanJudge>>,
    pub(crate) agents: HashMap<AgentName, Arc<dyn AgentNode>>,
    pub(crate) result_judges: HashMap<AgentName, Arc<dyn ResultJudge>>,
    pub(crate) conversational: ConversationalAgent,
    pub(crate) response_judge: Option<Arc<dyn ResponseJudge>>,
    pub(crate) completeness: Option<Arc<dyn CompletenessChecker>>,
    pub(crate) memory: Option<Arc<dyn MemoryStore>>,
    pub(crate) status: Arc<dyn StatusSink>,
}

impl TurnExecutor {
    /// Run one full user turn.
    pub async fn run_turn(&self, session_id: &str, user_message: &str) -> Result<TurnOutcome> {
        let memory = self.recall(session_id, user_message).await;
        let mut state = TurnState::new(session_id, user_message, memory);
        let emitter = Emitter {
            sink: Arc::clone(&self.status),
            turn_id: state.turn_id.clone(),
            session_id: state.session_id.clone(),
        };

        info!(turn_id = %state.turn_id, "turn started");

        // Request-for-information gate: bail out with a clarifying question
        // before any planning happens.
        if let Some(question) = self.rfi_question(user_message).await {
            emitter.emit(TurnEventKind::TurnCompleted).await;
            return Ok(TurnOutcome {
                response_text: question,
                agents_called: Vec::new(),
                degraded: Vec::new(),
            });
        }

        emitter.phase(Phase::AwaitingPlan).await;
        let plan = match self.resolve_plan(&emitter, &mut state).await? {
            PlanResolution::Plan(plan) => plan,
            PlanResolution::Chat => {
                // Greeting fast path: no agents, straight to conversation.
                let response = self
                    .render_response(&emitter, &mut state, &CollectedInfo::default())
                    .await?;
                emitter.phase(Phase::Done).await;
                emitter.emit(TurnEventKind::TurnCompleted).await;
                self.record(session_id, user_message).await;
                return Ok(TurnOutcome {
                    response_text: response,
                    agents_called: Vec::new(),
                    degraded: Vec::new(),
                });
            }
        };

        let agents_called: Vec<AgentName> = plan
            .steps
            .iter()
            .flat_map(|s| s.agents.iter().copied())
            .collect();
        state.plan = Some(plan.clone());

        for step in &plan.steps {
            self.run_step(&emitter, &mut state, step).await?;
        }

        emitter.phase(Phase::Join).await;
        let info = join::collect(&state);

        let mut response = self.render_response(&emitter, &mut state, &info).await?;
        if !info.degraded.is_empty() {
            response.push_str(&degraded_note(&info.degraded));
        }
        state.response = Some(response.clone());

        self.record(session_id, user_message).await;
        emitter.phase(Phase::Done).await;
        emitter.emit(TurnEventKind::TurnCompleted).await;
        info!(turn_id = %state.turn_id, "turn completed");

        Ok(TurnOutcome {
            response_text: response,
            agents_called,
            degraded: info.degraded,
        })
    }

    async fn recall(&self, session_id: &str, query: &str) -> Vec<String> {
        let Some(memory) = &self.memory else {
            return Vec::new();
        };
        match memory.retrieve_relevant(session_id, query).await {
            Ok(facts) => facts,
            Err(e) => {
                warn!(error = %e, "memory retrieval failed, continuing without");
                Vec::new()
            }
        }
    }

    async fn record(&self, session_id: &str, user_message: &str) {
        if let Some(memory) = &self.memory {
            let fact = format!("Previous request: {user_message}");
            if let Err(e) = memory.remember(session_id, &fact).await {
                warn!(error = %e, "memory write-back failed");
            }
        }
    }

    async fn rfi_question(&self, user_message: &str) -> Option<String> {
        let checker = self.completeness.as_ref()?;
        match checker.check(user_message).await {
            Ok(c) if !c.complete => Some(c.question.unwrap_or_else(|| {
                "Could you tell me a bit more about the trip you have in mind?".to_string()
            })),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "completeness check errored, proceeding");
                None
            }
        }
    }

    /// The planning loop: plan, judge, replan on rejection, up to the cap.
    ///
    /// A judge rejection at the cap is not fatal: the last produced plan is
    /// executed anyway. Only a turn where no plan could be produced at all
    /// fails with `Error::Planning`.
    async fn resolve_plan(
        &self,
        emitter: &Emitter,
        state: &mut TurnState,
    ) -> Result<PlanResolution> {
        let user_message = state.user_message.clone();
        let memory = state.memory.clone();
        let mut request = PlanRequest::new(&user_message, memory.clone());
        let mut last_plan: Option<ExecutionPlan> = None;

        for attempt in 0..=self.config.max_plan_retries {
            emitter
                .emit(TurnEventKind::NodeStarted {
                    node: "planner".into(),
                })
                .await;
            let decision = self.planner.plan(&request).await;
            emitter
                .emit(TurnEventKind::NodeFinished {
                    node: "planner".into(),
                })
                .await;

            match decision {
                Ok(PlannerDecision::Chat) => return Ok(PlanResolution::Chat),
                Ok(PlannerDecision::Plan(plan)) => {
                    let verdict = self.judge_plan(&plan, &user_message).await;
                    emitter
                        .emit(TurnEventKind::VerdictIssued {
                            node: "plan_feedback".into(),
                            status: verdict.status.as_str().into(),
                        })
                        .await;
                    if verdict.is_pass() {
                        return Ok(PlanResolution::Plan(plan));
                    }
                    let feedback = verdict
                        .message
                        .unwrap_or_else(|| "the plan was rejected".to_string());
                    debug!(attempt, %feedback, "plan rejected, replanning");
                    state.bump_retry("plan_feedback");
                    last_plan = Some(plan.clone());
                    request =
                        PlanRequest::new(&user_message, memory.clone()).with_feedback(plan, feedback);
                }
                Err(e) if e.is_replannable() => {
                    warn!(attempt, error = %e, "structurally invalid plan, replanning");
                    state.bump_retry("plan_feedback");
                    request = PlanRequest::new(&user_message, memory.clone());
                    request.feedback = Some(e.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        match last_plan {
            Some(plan) => {
                warn!("plan retries exhausted, executing the last plan as-is");
                Ok(PlanResolution::Plan(plan))
            }
            None => Err(Error::planning("no usable plan after all attempts")),
        }
    }

    async fn judge_plan(&self, plan: &ExecutionPlan, user_message: &str) -> FeedbackVerdict {
        let Some(judge) = &self.plan_judge else {
            return FeedbackVerdict::pass();
        };
        match judge.judge(plan, user_message).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "plan judge errored, passing");
                FeedbackVerdict::pass()
            }
        }
    }

    /// Run one plan step: fan out every agent of the step, wait for the
    /// whole barrier, then commit results in one place.
    async fn run_step(
        &self,
        emitter: &Emitter,
        state: &mut TurnState,
        step: &PlanStep,
    ) -> Result<()> {
        emitter.phase(Phase::RunningStep(step.step_number)).await;

        // Every task gets the same immutable snapshot of earlier results;
        // same-step siblings are invisible to each other.
        let snapshot = state.results.clone();
        let mut tasks: JoinSet<AgentOutcome> = JoinSet::new();

        for &agent in &step.agents {
            let node = self
                .agents
                .get(&agent)
                .ok_or_else(|| Error::agent(format!("no node registered for {agent}")))?
                .clone();
            let judge = self.result_judges.get(&agent).cloned();
            let ctx = StepContext {
                user_message: state.user_message.clone(),
                description: step.description.clone(),
                memory: state.memory.clone(),
                prior_results: snapshot.clone(),
                attempt: AttemptContext::default(),
            };
            let emitter = emitter.clone();
            let max_retries = self.config.max_agent_retries;

            tasks.spawn(run_agent_with_feedback(
                agent, node, judge, ctx, emitter, max_retries,
            ));
        }

        let mut outcomes = Vec::with_capacity(step.agents.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => return Err(Error::internal(format!("agent task failed: {e}"))),
            }
        }

        emitter.phase(Phase::StepFeedback(step.step_number)).await;
        for outcome in outcomes {
            if outcome.retries > 0 {
                state
                    .retries
                    .insert(format!("{}_feedback", outcome.agent), outcome.retries);
            }
            if outcome.degraded {
                state.degraded.insert(outcome.agent);
            }
            state.results.insert(outcome.agent, outcome.result);
        }
        Ok(())
    }

    /// Generate the final response, regenerating on judge rejection up to
    /// the cap. The last rendering is used when retries run out.
    async fn render_response(
        &self,
        emitter: &Emitter,
        state: &mut TurnState,
        info: &CollectedInfo,
    ) -> Result<String> {
        let collected = if info.is_empty() { None } else { Some(info) };
        let mut feedback: Option<String> = None;
        let mut response = String::new();

        for attempt in 0..=self.config.max_response_retries {
            emitter
                .emit(TurnEventKind::NodeStarted {
                    node: "conversational_agent".into(),
                })
                .await;
            response = self
                .conversational
                .respond(
                    &state.user_message,
                    &state.memory,
                    collected,
                    feedback.as_deref(),
                )
                .await?;
            emitter
                .emit(TurnEventKind::NodeFinished {
                    node: "conversational_agent".into(),
                })
                .await;

            let verdict = match &self.response_judge {
                Some(judge) => match judge.judge(&response, info, &state.user_message).await {
                    Ok(v) => v,
                    Err(e) => {
                        warn!(error = %e, "response judge errored, passing");
                        FeedbackVerdict::pass()
                    }
                },
                None => FeedbackVerdict::pass(),
            };
            emitter
                .emit(TurnEventKind::VerdictIssued {
                    node: "response_feedback".into(),
                    status: verdict.status.as_str().into(),
                })
                .await;

            if verdict.is_pass() {
                break;
            }
            state.bump_retry("response_feedback");
            if attempt == self.config.max_response_retries {
                warn!("response retries exhausted, sending the last rendering");
                break;
            }
            feedback = Some(
                verdict
                    .message
                    .unwrap_or_else(|| "the response was rejected".to_string()),
            );
        }
        Ok(response)
    }
}

/// One agent's dispatch plus its private judge/retry loop.
///
/// Runs entirely inside the step's join set; the executor only sees the
/// final outcome. A dispatch-level `Err` becomes a failed result so the
/// judge can decide whether to retry it.
async fn run_agent_with_feedback(
    agent: AgentName,
    node: Arc<dyn AgentNode>,
    judge: Option<Arc<dyn ResultJudge>>,
    mut ctx: StepContext,
    emitter: Emitter,
    max_retries: usize,
) -> AgentOutcome {
    loop {
        emitter
            .emit(TurnEventKind::NodeStarted {
                node: agent.to_string(),
            })
            .await;
        let result = match node.execute(&ctx).await {
            Ok(r) => r,
            Err(e) => {
                warn!(%agent, error = %e, "agent dispatch errored");
                AgentResult::failed(agent, e.to_string())
            }
        };
        emitter
            .emit(TurnEventKind::NodeFinished {
                node: agent.to_string(),
            })
            .await;

        let verdict = match &judge {
            Some(judge) => match judge.judge(&result, &ctx).await {
                Ok(v) => v,
                Err(e) => {
                    warn!(%agent, error = %e, "result judge errored, passing");
                    FeedbackVerdict::pass()
                }
            },
            None => FeedbackVerdict::pass(),
        };
        emitter
            .emit(TurnEventKind::VerdictIssued {
                node: format!("{agent}_feedback"),
                status: verdict.status.as_str().into(),
            })
            .await;

        if verdict.is_pass() {
            return AgentOutcome {
                agent,
                result,
                retries: ctx.attempt.attempt,
                degraded: false,
            };
        }
        if ctx.attempt.attempt >= max_retries {
            // Retry budget spent: commit what we have and flag it.
            warn!(%agent, "retry budget exhausted, committing last result");
            return AgentOutcome {
                agent,
                result,
                retries: ctx.attempt.attempt,
                degraded: true,
            };
        }

        let feedback = verdict
            .message
            .unwrap_or_else(|| "the previous attempt was rejected".to_string());
        emitter
            .emit(TurnEventKind::RetryScheduled {
                agent,
                attempt: ctx.attempt.attempt + 1,
            })
            .await;
        ctx.attempt = ctx.attempt.next(feedback);
    }
}

fn degraded_note(degraded: &[AgentName]) -> String {
    let domains: Vec<&str> = degraded
        .iter()
        .map(|a| match a {
            AgentName::Flight => "flight",
            AgentName::Hotel => "hotel",
            AgentName::Visa => "visa",
            AgentName::Attractions => "attraction",
            AgentName::Utilities => "practical",
        })
        .collect();
    format!(
        "\n\nPlease note: the {} information above may be incomplete; I \
         could not fully verify it this time.",
        domains.join(" and ")
    )
}
