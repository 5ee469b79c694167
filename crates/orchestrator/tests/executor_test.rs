//! End-to-end turns through the executor, driven entirely by scripted
//! collaborators.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use tripflow_core::mocks::{
    MockCompletenessChecker, MockLlm, MockMemoryStore, RecordingStatusSink, ScriptedAgent,
    ScriptedPlanJudge, ScriptedPlanner, ScriptedResponseJudge, ScriptedResultJudge,
};
use tripflow_core::traits::AgentNode;
use tripflow_core::types::{
    AgentName, AgentResult, ExecutionPlan, FeedbackVerdict, FlightData, HotelData, PlanStep,
    PlannerDecision, ResultPayload, StepContext, UtilityData,
};
use tripflow_core::{Error, Result};
use tripflow_orchestrator::{ConversationalAgent, OrchestratorBuilder};

fn plan(steps: Vec<(usize, Vec<AgentName>, &str)>) -> ExecutionPlan {
    ExecutionPlan::new(
        steps
            .into_iter()
            .map(|(step_number, agents, description)| PlanStep {
                step_number,
                agents,
                description: description.to_string(),
            })
            .collect(),
    )
    .unwrap()
}

fn hotel_result(summary: &str) -> AgentResult {
    AgentResult::ok(
        AgentName::Hotel,
        ResultPayload::Hotels(HotelData {
            hotels: vec![json!({"name": "Hotel Aurora", "rating": 4.5})],
            summary: summary.to_string(),
        }),
    )
}

fn flight_result(summary: &str) -> AgentResult {
    AgentResult::ok(
        AgentName::Flight,
        ResultPayload::Flights(FlightData {
            options: vec![json!({"airline": "EK", "price": 480})],
            summary: summary.to_string(),
        }),
    )
}

fn utilities_result(summary: &str) -> AgentResult {
    let mut facts = serde_json::Map::new();
    facts.insert("convert_currency".into(), json!({"converted": 150000.0}));
    AgentResult::ok(
        AgentName::Utilities,
        ResultPayload::Utility(UtilityData {
            facts,
            summary: summary.to_string(),
        }),
    )
}

/// Agent that sleeps before answering, for barrier-ordering assertions.
struct DelayedAgent {
    inner: ScriptedAgent,
    delay: Duration,
}

#[async_trait]
impl AgentNode for DelayedAgent {
    fn name(&self) -> AgentName {
        self.inner.name()
    }

    async fn execute(&self, ctx: &StepContext) -> Result<AgentResult> {
        tokio::time::sleep(self.delay).await;
        self.inner.execute(ctx).await
    }
}

#[tokio::test]
async fn single_step_turn_runs_each_agent_once() {
    let planner = Arc::new(ScriptedPlanner::always(plan(vec![(
        1,
        vec![AgentName::Flight, AgentName::Hotel],
        "Find flights and hotels for Tokyo",
    )])));
    let flight = Arc::new(ScriptedAgent::new(
        AgentName::Flight,
        vec![flight_result("one flight option")],
    ));
    let hotel = Arc::new(ScriptedAgent::new(
        AgentName::Hotel,
        vec![hotel_result("one hotel")],
    ));
    let sink = Arc::new(RecordingStatusSink::new());

    let executor = OrchestratorBuilder::new()
        .with_planner(planner)
        .with_plan_judge(Arc::new(ScriptedPlanJudge::passing()))
        .with_agent(flight.clone())
        .with_agent(hotel.clone())
        .with_result_judge(Arc::new(ScriptedResultJudge::passing(AgentName::Flight)))
        .with_result_judge(Arc::new(ScriptedResultJudge::passing(AgentName::Hotel)))
        .with_conversational(ConversationalAgent::new(Arc::new(MockLlm::constant(
            "Here is your Tokyo trip.",
        ))))
        .with_response_judge(Arc::new(ScriptedResponseJudge::passing()))
        .with_status_sink(sink.clone())
        .build()
        .unwrap();

    let outcome = executor
        .run_turn("s1", "Flights and hotels in Tokyo, 1st to 8th of September")
        .await
        .unwrap();

    assert_eq!(outcome.response_text, "Here is your Tokyo trip.");
    assert_eq!(
        outcome.agents_called,
        vec![AgentName::Flight, AgentName::Hotel]
    );
    assert!(outcome.degraded.is_empty());
    assert_eq!(flight.dispatch_count(), 1);
    assert_eq!(hotel.dispatch_count(), 1);

    // Phase progression, in order.
    let labels = sink.labels();
    let phases: Vec<&String> = labels.iter().filter(|l| l.starts_with("phase:")).collect();
    assert_eq!(
        phases,
        vec![
            "phase:awaiting_plan",
            "phase:running_step:1",
            "phase:step_feedback:1",
            "phase:join",
            "phase:done",
        ]
    );
    assert_eq!(labels.last().unwrap(), "turn_completed");
}

#[tokio::test]
async fn rejected_result_is_retried_with_feedback_until_it_passes() {
    let planner = Arc::new(ScriptedPlanner::always(plan(vec![(
        1,
        vec![AgentName::Hotel],
        "Find hotels in Rome",
    )])));
    let hotel = Arc::new(ScriptedAgent::new(
        AgentName::Hotel,
        vec![
            hotel_result("first try"),
            hotel_result("second try"),
            hotel_result("third try"),
        ],
    ));
    let judge = Arc::new(ScriptedResultJudge::new(
        AgentName::Hotel,
        vec![
            FeedbackVerdict::retry("no prices"),
            FeedbackVerdict::retry("still no prices"),
            FeedbackVerdict::pass(),
        ],
    ));
    let responder = Arc::new(MockLlm::constant("Rome hotels ready."));

    let executor = OrchestratorBuilder::new()
        .with_planner(planner)
        .with_agent(hotel.clone())
        .with_result_judge(judge)
        .with_conversational(ConversationalAgent::new(responder.clone()))
        .build()
        .unwrap();

    let outcome = executor.run_turn("s1", "hotels in Rome").await.unwrap();

    // Two rejections, then a pass: exactly three dispatches, none degraded.
    assert_eq!(hotel.dispatch_count(), 3);
    assert!(outcome.degraded.is_empty());

    // Feedback threads into the retry contexts.
    let dispatches = hotel.dispatches();
    assert_eq!(dispatches[0].attempt.attempt, 0);
    assert_eq!(dispatches[0].attempt.feedback, None);
    assert_eq!(dispatches[1].attempt.attempt, 1);
    assert_eq!(dispatches[1].attempt.feedback.as_deref(), Some("no prices"));
    assert_eq!(
        dispatches[2].attempt.feedback.as_deref(),
        Some("still no prices")
    );

    // The third (accepted) result is what reaches the conversational agent.
    assert!(responder.prompts()[0].contains("third try"));
}

#[tokio::test]
async fn exhausted_retries_commit_the_last_result_as_degraded() {
    let planner = Arc::new(ScriptedPlanner::always(plan(vec![(
        1,
        vec![AgentName::Hotel],
        "Find hotels in Rome",
    )])));
    let hotel = Arc::new(ScriptedAgent::new(
        AgentName::Hotel,
        vec![
            hotel_result("attempt one"),
            hotel_result("attempt two"),
            hotel_result("attempt three"),
        ],
    ));
    let judge = Arc::new(ScriptedResultJudge::new(
        AgentName::Hotel,
        vec![
            FeedbackVerdict::retry("bad"),
            FeedbackVerdict::retry("bad"),
            FeedbackVerdict::retry("bad"),
        ],
    ));
    let responder = Arc::new(MockLlm::constant("Best effort for Rome."));
    let sink = Arc::new(RecordingStatusSink::new());

    let executor = OrchestratorBuilder::new()
        .with_planner(planner)
        .with_agent(hotel.clone())
        .with_result_judge(judge)
        .with_conversational(ConversationalAgent::new(responder.clone()))
        .with_status_sink(sink.clone())
        .build()
        .unwrap();

    let outcome = executor.run_turn("s1", "hotels in Rome").await.unwrap();

    // Initial dispatch plus exactly max_agent_retries, never a fourth.
    assert_eq!(hotel.dispatch_count(), 3);
    assert_eq!(outcome.degraded, vec![AgentName::Hotel]);

    // The last result is still committed and the turn reaches the join and
    // a response; the traveller is told results may be incomplete.
    assert!(sink.labels().contains(&"phase:join".to_string()));
    assert!(responder.prompts()[0].contains("attempt three"));
    assert!(outcome.response_text.contains("may be incomplete"));
}

#[tokio::test]
async fn later_step_sees_earlier_results_but_siblings_do_not() {
    let planner = Arc::new(ScriptedPlanner::always(plan(vec![
        (1, vec![AgentName::Utilities], "Convert the budget to JPY"),
        (2, vec![AgentName::Hotel], "Find hotels within the budget"),
    ])));
    // The utilities agent is slow; the barrier must still hold step 2 back.
    let utilities = Arc::new(DelayedAgent {
        inner: ScriptedAgent::new(AgentName::Utilities, vec![utilities_result("150000 JPY")]),
        delay: Duration::from_millis(50),
    });
    let hotel = Arc::new(ScriptedAgent::new(
        AgentName::Hotel,
        vec![hotel_result("budget hotels")],
    ));

    let executor = OrchestratorBuilder::new()
        .with_planner(planner)
        .with_agent(utilities)
        .with_agent(hotel.clone())
        .with_conversational(ConversationalAgent::new(Arc::new(MockLlm::constant("ok"))))
        .build()
        .unwrap();

    executor
        .run_turn("s1", "Hotels in Tokyo within a 1000 USD budget")
        .await
        .unwrap();

    let dispatches = hotel.dispatches();
    assert_eq!(dispatches.len(), 1);
    // Step 2 sees the committed step-1 result.
    let prior = &dispatches[0].prior_results;
    assert!(prior.contains_key(&AgentName::Utilities));
    assert_eq!(
        prior[&AgentName::Utilities].payload.summary(),
        "150000 JPY"
    );
}

#[tokio::test]
async fn repeated_agent_keeps_only_the_later_steps_result() {
    let planner = Arc::new(ScriptedPlanner::always(plan(vec![
        (1, vec![AgentName::Hotel], "Broad hotel sweep"),
        (2, vec![AgentName::Hotel], "Narrow down to the old town"),
    ])));
    let hotel = Arc::new(ScriptedAgent::new(
        AgentName::Hotel,
        vec![hotel_result("broad sweep"), hotel_result("old town shortlist")],
    ));
    let responder = Arc::new(MockLlm::constant("ok"));

    let executor = OrchestratorBuilder::new()
        .with_planner(planner)
        .with_agent(hotel.clone())
        .with_conversational(ConversationalAgent::new(responder.clone()))
        .build()
        .unwrap();

    executor.run_turn("s1", "hotels in Prague").await.unwrap();

    assert_eq!(hotel.dispatch_count(), 2);
    // The second dispatch sees its own step-1 result.
    assert_eq!(
        hotel.dispatches()[1].prior_results[&AgentName::Hotel]
            .payload
            .summary(),
        "broad sweep"
    );
    // The join keeps the step-2 result; step 1's never reaches the reply.
    assert!(responder.prompts()[0].contains("old town shortlist"));
    assert!(!responder.prompts()[0].contains("broad sweep"));
}

#[tokio::test]
async fn same_step_agents_are_isolated_from_each_other() {
    let planner = Arc::new(ScriptedPlanner::always(plan(vec![(
        1,
        vec![AgentName::Flight, AgentName::Hotel],
        "Search in parallel",
    )])));
    let flight = Arc::new(ScriptedAgent::new(
        AgentName::Flight,
        vec![flight_result("flights")],
    ));
    let hotel = Arc::new(DelayedAgent {
        inner: ScriptedAgent::new(AgentName::Hotel, vec![hotel_result("hotels")]),
        delay: Duration::from_millis(30),
    });
    let hotel_inner: Arc<dyn AgentNode> = hotel.clone();

    let executor = OrchestratorBuilder::new()
        .with_planner(planner)
        .with_agent(flight.clone())
        .with_agent(hotel_inner)
        .with_conversational(ConversationalAgent::new(Arc::new(MockLlm::constant("ok"))))
        .build()
        .unwrap();

    executor.run_turn("s1", "flights and hotels").await.unwrap();

    // Even though the flight agent finished first, the hotel agent's
    // snapshot predates the step: neither sees the other.
    assert!(flight.dispatches()[0].prior_results.is_empty());
    assert!(hotel.inner.dispatches()[0].prior_results.is_empty());
}

#[tokio::test]
async fn plan_rejections_thread_feedback_into_replanning() {
    let planner = Arc::new(ScriptedPlanner::always(plan(vec![(
        1,
        vec![AgentName::Visa],
        "Check visa requirements",
    )])));
    let plan_judge = Arc::new(ScriptedPlanJudge::new(vec![
        FeedbackVerdict::plan_fix("nationality lookup must come first"),
        FeedbackVerdict::plan_fix("still wrong order"),
        FeedbackVerdict::pass(),
    ]));
    let visa = Arc::new(ScriptedAgent::succeeding(AgentName::Visa));

    let executor = OrchestratorBuilder::new()
        .with_planner(planner.clone())
        .with_plan_judge(plan_judge)
        .with_agent(visa)
        .with_conversational(ConversationalAgent::new(Arc::new(MockLlm::constant("ok"))))
        .build()
        .unwrap();

    executor.run_turn("s1", "Do I need a visa for Japan?").await.unwrap();

    // Rejected twice, accepted on the third planning attempt.
    assert_eq!(planner.call_count(), 3);
    let requests = planner.requests();
    assert_eq!(requests[0].feedback, None);
    assert_eq!(
        requests[1].feedback.as_deref(),
        Some("nationality lookup must come first")
    );
    assert!(requests[1].prior_plan.is_some());
    assert_eq!(requests[2].feedback.as_deref(), Some("still wrong order"));
}

#[tokio::test]
async fn plan_rejected_at_cap_is_executed_anyway() {
    let planner = Arc::new(ScriptedPlanner::always(plan(vec![(
        1,
        vec![AgentName::Flight],
        "Search flights",
    )])));
    let plan_judge = Arc::new(ScriptedPlanJudge::new(vec![
        FeedbackVerdict::plan_fix("a"),
        FeedbackVerdict::plan_fix("b"),
        FeedbackVerdict::plan_fix("c"),
    ]));
    let flight = Arc::new(ScriptedAgent::succeeding(AgentName::Flight));

    let executor = OrchestratorBuilder::new()
        .with_planner(planner.clone())
        .with_plan_judge(plan_judge)
        .with_agent(flight.clone())
        .with_conversational(ConversationalAgent::new(Arc::new(MockLlm::constant("ok"))))
        .build()
        .unwrap();

    let outcome = executor.run_turn("s1", "flights to Osaka").await.unwrap();

    assert_eq!(planner.call_count(), 3);
    // The never-approved plan still runs rather than failing the turn.
    assert_eq!(flight.dispatch_count(), 1);
    assert_eq!(outcome.agents_called, vec![AgentName::Flight]);
}

#[tokio::test]
async fn turn_with_no_usable_plan_fails_with_a_planning_error() {
    let planner = Arc::new(ScriptedPlanner::new(vec![
        Err(Error::plan_structure("not json")),
        Err(Error::plan_structure("still not json")),
        Err(Error::plan_structure("hopeless")),
    ]));

    let executor = OrchestratorBuilder::new()
        .with_planner(planner)
        .with_conversational(ConversationalAgent::new(Arc::new(MockLlm::constant("ok"))))
        .build()
        .unwrap();

    let err = executor.run_turn("s1", "plan a trip").await.unwrap_err();
    assert!(matches!(err, Error::Planning(_)));
}

#[tokio::test]
async fn greeting_skips_agents_entirely() {
    let planner = Arc::new(ScriptedPlanner::new(vec![Ok(PlannerDecision::Chat)]));
    let flight = Arc::new(ScriptedAgent::succeeding(AgentName::Flight));

    let executor = OrchestratorBuilder::new()
        .with_planner(planner)
        .with_agent(flight.clone())
        .with_conversational(ConversationalAgent::new(Arc::new(MockLlm::constant(
            "Hello! Where are we off to?",
        ))))
        .build()
        .unwrap();

    let outcome = executor.run_turn("s1", "good morning!").await.unwrap();

    assert_eq!(outcome.response_text, "Hello! Where are we off to?");
    assert!(outcome.agents_called.is_empty());
    assert_eq!(flight.dispatch_count(), 0);
}

#[tokio::test]
async fn incomplete_request_short_circuits_to_a_question() {
    let planner = Arc::new(ScriptedPlanner::new(vec![Ok(PlannerDecision::Chat)]));

    let executor = OrchestratorBuilder::new()
        .with_planner(planner.clone())
        .with_completeness_checker(Arc::new(MockCompletenessChecker::missing(
            "Where would you like to go?",
            vec!["destination".into()],
        )))
        .with_conversational(ConversationalAgent::new(Arc::new(MockLlm::constant("ok"))))
        .build()
        .unwrap();

    let outcome = executor.run_turn("s1", "book me a trip").await.unwrap();

    assert_eq!(outcome.response_text, "Where would you like to go?");
    assert!(outcome.agents_called.is_empty());
    // Planning never started.
    assert_eq!(planner.call_count(), 0);
}

#[tokio::test]
async fn rejected_response_is_regenerated_with_feedback() {
    let planner = Arc::new(ScriptedPlanner::always(plan(vec![(
        1,
        vec![AgentName::Hotel],
        "Find hotels",
    )])));
    let hotel = Arc::new(ScriptedAgent::new(AgentName::Hotel, vec![hotel_result("found")]));
    let responder = Arc::new(MockLlm::new(vec![
        "{\"hotels\": [...]}".into(),
        "I found a lovely hotel for you.".into(),
    ]));
    let response_judge = Arc::new(ScriptedResponseJudge::new(vec![FeedbackVerdict::retry(
        "raw JSON leaked into the reply",
    )]));

    let executor = OrchestratorBuilder::new()
        .with_planner(planner)
        .with_agent(hotel)
        .with_conversational(ConversationalAgent::new(responder.clone()))
        .with_response_judge(response_judge)
        .build()
        .unwrap();

    let outcome = executor.run_turn("s1", "hotels in Lisbon").await.unwrap();

    assert_eq!(outcome.response_text, "I found a lovely hotel for you.");
    assert_eq!(responder.call_count(), 2);
    assert!(responder.prompts()[1].contains("raw JSON leaked into the reply"));
}

#[tokio::test]
async fn memory_facts_flow_into_agents_and_get_written_back() {
    let memory = Arc::new(MockMemoryStore::with_facts(
        "s1",
        vec!["Traveller prefers window seats".into()],
    ));
    let planner = Arc::new(ScriptedPlanner::always(plan(vec![(
        1,
        vec![AgentName::Flight],
        "Search flights",
    )])));
    let flight = Arc::new(ScriptedAgent::succeeding(AgentName::Flight));

    let executor = OrchestratorBuilder::new()
        .with_planner(planner)
        .with_agent(flight.clone())
        .with_memory(memory.clone())
        .with_conversational(ConversationalAgent::new(Arc::new(MockLlm::constant("ok"))))
        .build()
        .unwrap();

    executor.run_turn("s1", "flights to Oslo").await.unwrap();

    assert_eq!(
        flight.dispatches()[0].memory,
        vec!["Traveller prefers window seats".to_string()]
    );
    // The turn's request was recorded for future recall.
    assert!(memory
        .facts_for("s1")
        .iter()
        .any(|f| f.contains("flights to Oslo")));
}
