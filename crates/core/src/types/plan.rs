//! Execution plan data model.
//!
//! A plan is an ordered list of steps; each step names the agents that run
//! concurrently for it. Structural invariants are enforced in code so the
//! plan-level LLM judge only ever has to reason about logical soundness.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::agent::AgentName;
use crate::error::{Error, Result};

/// One step of an execution plan: a set of agents dispatched together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStep {
    /// 1-based position in the plan.
    pub step_number: usize,
    /// Agents dispatched concurrently in this step. Non-empty, no duplicates.
    pub agents: Vec<AgentName>,
    /// Natural-language instruction for the step; the primary input each
    /// agent in the step receives.
    pub description: String,
}

/// An ordered, validated multi-step plan for one user turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub steps: Vec<PlanStep>,
}

impl ExecutionPlan {
    /// Build a plan, enforcing structural invariants.
    pub fn new(steps: Vec<PlanStep>) -> Result<Self> {
        let plan = Self { steps };
        plan.validate()?;
        Ok(plan)
    }

    /// Check the structural invariants:
    /// - at least one step,
    /// - step numbers contiguous from 1,
    /// - every step has at least one agent,
    /// - no agent repeated within a step.
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(Error::plan_structure("plan has no steps"));
        }
        for (idx, step) in self.steps.iter().enumerate() {
            let expected = idx + 1;
            if step.step_number != expected {
                return Err(Error::plan_structure(format!(
                    "step numbers must be contiguous from 1: found {} at position {}",
                    step.step_number, expected
                )));
            }
            if step.agents.is_empty() {
                return Err(Error::plan_structure(format!(
                    "step {} has no agents assigned",
                    step.step_number
                )));
            }
            let mut seen = BTreeSet::new();
            for agent in &step.agents {
                if !seen.insert(*agent) {
                    return Err(Error::plan_structure(format!(
                        "agent {} appears twice in step {}",
                        agent, step.step_number
                    )));
                }
            }
        }
        Ok(())
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// All agents referenced anywhere in the plan.
    pub fn agents(&self) -> BTreeSet<AgentName> {
        self.steps
            .iter()
            .flat_map(|s| s.agents.iter().copied())
            .collect()
    }

    /// Render the plan for prompts and logs.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for step in &self.steps {
            let agents: Vec<&str> = step.agents.iter().map(|a| a.as_str()).collect();
            out.push_str(&format!(
                "Step {}: [{}] - {}\n",
                step.step_number,
                agents.join(", "),
                step.description
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(n: usize, agents: Vec<AgentName>) -> PlanStep {
        PlanStep {
            step_number: n,
            agents,
            description: format!("step {n}"),
        }
    }

    #[test]
    fn valid_plan_passes() {
        let plan = ExecutionPlan::new(vec![
            step(1, vec![AgentName::Utilities]),
            step(2, vec![AgentName::Flight, AgentName::Hotel]),
        ])
        .unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.agents().len(), 3);
    }

    #[test]
    fn empty_plan_is_rejected() {
        assert!(ExecutionPlan::new(vec![]).is_err());
    }

    #[test]
    fn gap_in_step_numbers_is_rejected() {
        let err = ExecutionPlan::new(vec![
            step(1, vec![AgentName::Hotel]),
            step(3, vec![AgentName::Flight]),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::PlanStructure(_)));
    }

    #[test]
    fn step_without_agents_is_rejected() {
        assert!(ExecutionPlan::new(vec![step(1, vec![])]).is_err());
    }

    #[test]
    fn duplicate_agent_in_step_is_rejected() {
        let err =
            ExecutionPlan::new(vec![step(1, vec![AgentName::Hotel, AgentName::Hotel])])
                .unwrap_err();
        assert!(err.to_string().contains("twice"));
    }
}
