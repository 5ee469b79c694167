//! The join node: a pure merge of everything the turn collected.
//!
//! No model call happens here. The executor owns the single results map, so
//! joining is reading it out in stable order; within a step agents wrote
//! disjoint keys, and across steps the later write already won.

use tripflow_core::types::{CollectedInfo, TurnState};

/// Collect all committed results and the degraded set into one view.
pub fn collect(state: &TurnState) -> CollectedInfo {
    CollectedInfo {
        results: state
            .results
            .iter()
            .map(|(agent, result)| (*agent, result.clone()))
            .collect(),
        degraded: state.degraded.iter().copied().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripflow_core::types::{AgentName, AgentResult, ResultPayload};

    #[test]
    fn collects_union_of_results_and_degraded_set() {
        let mut state = TurnState::new("s1", "plan a trip", Vec::new());
        for agent in [AgentName::Flight, AgentName::Hotel, AgentName::Visa] {
            state.results.insert(
                agent,
                AgentResult::ok(agent, ResultPayload::empty_for(agent)),
            );
        }
        state.degraded.insert(AgentName::Hotel);

        let info = collect(&state);
        assert_eq!(info.results.len(), 3);
        assert_eq!(info.degraded, vec![AgentName::Hotel]);
        // BTreeMap keys come out in stable agent order.
        let agents: Vec<_> = info.results.keys().copied().collect();
        assert_eq!(
            agents,
            vec![AgentName::Flight, AgentName::Hotel, AgentName::Visa]
        );
    }

    #[test]
    fn empty_state_joins_to_empty_info() {
        let state = TurnState::new("s1", "hello", Vec::new());
        let info = collect(&state);
        assert!(info.is_empty());
        assert!(info.degraded.is_empty());
    }
}
