//! Tripflow CLI: an interactive travel planning session on stdin.

use std::io::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tripflow_agents::{
    attractions_agent, flight_agent, hotel_agent, utilities_agent, visa_agent, LlmResultJudge,
};
use tripflow_core::config::AppConfig;
use tripflow_core::events::TurnEvent;
use tripflow_core::traits::{LlmClient, StatusSink};
use tripflow_core::types::AgentName;
use tripflow_model_gateway::create_clients_from_config;
use tripflow_orchestrator::{
    ConversationalAgent, InMemoryMemoryStore, LlmCompletenessChecker, LlmPlanJudge, LlmPlanner,
    LlmResponseJudge, OrchestratorBuilder, TurnExecutor,
};
use tripflow_tools::build_registry;

/// Sink that mirrors turn events into the tracing log.
struct LogStatusSink;

#[async_trait]
impl StatusSink for LogStatusSink {
    async fn emit(&self, event: TurnEvent) {
        info!(turn_id = %event.turn_id, event = %event.kind.label(), "turn event");
    }
}

fn configure_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tripflow=info,tripflow_orchestrator=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn build_executor(config: &AppConfig) -> anyhow::Result<TurnExecutor> {
    let (main_client, judge_client) = create_clients_from_config(&config.model_gateway)?;
    let main_client: Arc<dyn LlmClient> = Arc::new(main_client);
    let judge_client: Arc<dyn LlmClient> = Arc::new(judge_client);

    let tools = build_registry(&config.tools).await?;
    let iterations = config.orchestrator.max_tool_iterations;

    let mut builder = OrchestratorBuilder::new()
        .with_config(config.orchestrator.clone())
        .with_planner(Arc::new(LlmPlanner::new(main_client.clone())))
        .with_plan_judge(Arc::new(LlmPlanJudge::new(judge_client.clone())))
        .with_conversational(ConversationalAgent::new(main_client.clone()))
        .with_response_judge(Arc::new(LlmResponseJudge::new(judge_client.clone())))
        .with_completeness_checker(Arc::new(LlmCompletenessChecker::new(judge_client.clone())))
        .with_memory(Arc::new(InMemoryMemoryStore::new()))
        .with_status_sink(Arc::new(LogStatusSink));

    builder = builder
        .with_agent(Arc::new(flight_agent(
            main_client.clone(),
            tools.clone(),
            iterations,
        )))
        .with_agent(Arc::new(hotel_agent(
            main_client.clone(),
            tools.clone(),
            iterations,
        )))
        .with_agent(Arc::new(visa_agent(
            main_client.clone(),
            tools.clone(),
            iterations,
        )))
        .with_agent(Arc::new(attractions_agent(
            main_client.clone(),
            tools.clone(),
            iterations,
        )))
        .with_agent(Arc::new(utilities_agent(
            main_client.clone(),
            tools.clone(),
            iterations,
        )));

    for agent in AgentName::ALL {
        builder = builder.with_result_judge(Arc::new(LlmResultJudge::for_agent(
            agent,
            judge_client.clone(),
        )));
    }

    Ok(builder.build()?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    configure_tracing();

    let config = AppConfig::load()?;
    let executor = build_executor(&config).await?;
    let session_id = "cli";

    println!("Tripflow travel assistant. Describe your trip, or 'quit' to exit.");
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message.eq_ignore_ascii_case("quit") || message.eq_ignore_ascii_case("exit") {
            break;
        }

        match executor.run_turn(session_id, message).await {
            Ok(outcome) => {
                println!("\n{}\n", outcome.response_text);
            }
            Err(e) => {
                error!(error = %e, "turn failed");
                println!("\nSorry, I ran into a problem putting that together. Please try again.\n");
            }
        }
    }

    Ok(())
}
