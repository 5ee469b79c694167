//! Builder wiring for the turn executor.

use std::collections::HashMap;
use std::sync::Arc;

use tripflow_core::config::OrchestratorConfig;
use tripflow_core::traits::{
    AgentNode, CompletenessChecker, MemoryStore, NoOpStatusSink, PlanJudge, Planner,
    ResponseJudge, ResultJudge, StatusSink,
};
use tripflow_core::types::AgentName;
use tripflow_core::{Error, Result};

use crate::conversational::ConversationalAgent;
use crate::executor::TurnExecutor;

/// Assembles a `TurnExecutor` from its collaborators.
///
/// A planner and a conversational agent are mandatory; every judge, the
/// memory store, the completeness gate, and the status sink are optional.
/// A missing judge passes everything, which is exactly what small test
/// set-ups want.
pub struct OrchestratorBuilder {
    config: OrchestratorConfig,
    planner: Option<Arc<dyn Planner>>,
    plan_judge: Option<Arc<dyn PlanJudge>>,
    agents: HashMap<AgentName, Arc<dyn AgentNode>>,
    result_judges: HashMap<AgentName, Arc<dyn ResultJudge>>,
    conversational: Option<ConversationalAgent>,
    response_judge: Option<Arc<dyn ResponseJudge>>,
    completeness: Option<Arc<dyn CompletenessChecker>>,
    memory: Option<Arc<dyn MemoryStore>>,
    status: Arc<dyn StatusSink>,
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            config: OrchestratorConfig::default(),
            planner: None,
            plan_judge: None,
            agents: HashMap::new(),
            result_judges: HashMap::new(),
            conversational: None,
            response_judge: None,
            completeness: None,
            memory: None,
            status: Arc::new(NoOpStatusSink),
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_planner(mut self, planner: Arc<dyn Planner>) -> Self {
        self.planner = Some(planner);
        self
    }

    pub fn with_plan_judge(mut self, judge: Arc<dyn PlanJudge>) -> Self {
        self.plan_judge = Some(judge);
        self
    }

    /// Register an agent node under its own name.
    pub fn with_agent(mut self, node: Arc<dyn AgentNode>) -> Self {
        self.agents.insert(node.name(), node);
        self
    }

    /// Register a result judge for its agent.
    pub fn with_result_judge(mut self, judge: Arc<dyn ResultJudge>) -> Self {
        self.result_judges.insert(judge.agent(), judge);
        self
    }

    pub fn with_conversational(mut self, agent: ConversationalAgent) -> Self {
        self.conversational = Some(agent);
        self
    }

    pub fn with_response_judge(mut self, judge: Arc<dyn ResponseJudge>) -> Self {
        self.response_judge = Some(judge);
        self
    }

    pub fn with_completeness_checker(mut self, checker: Arc<dyn CompletenessChecker>) -> Self {
        self.completeness = Some(checker);
        self
    }

    pub fn with_memory(mut self, memory: Arc<dyn MemoryStore>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn with_status_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.status = sink;
        self
    }

    pub fn build(self) -> Result<TurnExecutor> {
        let planner = self
            .planner
            .ok_or_else(|| Error::Config("orchestrator needs a planner".into()))?;
        let conversational = self
            .conversational
            .ok_or_else(|| Error::Config("orchestrator needs a conversational agent".into()))?;

        Ok(TurnExecutor {
            config: self.config,
            planner,
            plan_judge: self.plan_judge,
            agents: self.agents,
            result_judges: self.result_judges,
            conversational,
            response_judge: self.response_judge,
            completeness: self.completeness,
            memory: self.memory,
            status: self.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripflow_core::mocks::{MockLlm, ScriptedPlanner};

    #[test]
    fn build_without_planner_is_a_config_error() {
        let err = OrchestratorBuilder::new()
            .with_conversational(ConversationalAgent::new(Arc::new(MockLlm::constant("hi"))))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn minimal_build_succeeds() {
        let executor = OrchestratorBuilder::new()
            .with_planner(Arc::new(ScriptedPlanner::new(Vec::new())))
            .with_conversational(ConversationalAgent::new(Arc::new(MockLlm::constant("hi"))))
            .build();
        assert!(executor.is_ok());
    }
}
