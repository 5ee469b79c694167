//! Agent result model.
//!
//! Each domain agent produces exactly one `AgentResult` per dispatch. Results
//! are immutable once produced: a retry creates a new value, it never mutates
//! the committed one. Tool failures live inside the result (`error: true`),
//! they are not surfaced as control-flow errors — the result judge decides
//! whether a failure is acceptable.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::agent::AgentName;

/// Flight search payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlightData {
    /// Raw flight options as returned by the flight tool.
    pub options: Vec<Value>,
    /// Agent-written summary of the options.
    pub summary: String,
}

/// Hotel search payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HotelData {
    pub hotels: Vec<Value>,
    pub summary: String,
}

/// Visa requirement payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisaData {
    /// Requirement record for the nationality/destination pair, if resolved.
    pub requirements: Option<Value>,
    pub summary: String,
}

/// Attractions / restaurants payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttractionData {
    pub places: Vec<Value>,
    pub summary: String,
}

/// Utility payload: weather, currency, holidays, eSIM facts keyed by tool name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UtilityData {
    pub facts: serde_json::Map<String, Value>,
    pub summary: String,
}

/// Domain-specific result payload, one variant per agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultPayload {
    Flights(FlightData),
    Hotels(HotelData),
    Visa(VisaData),
    Attractions(AttractionData),
    Utility(UtilityData),
}

impl ResultPayload {
    /// The empty payload for an agent's domain.
    pub fn empty_for(agent: AgentName) -> Self {
        match agent {
            AgentName::Flight => ResultPayload::Flights(FlightData::default()),
            AgentName::Hotel => ResultPayload::Hotels(HotelData::default()),
            AgentName::Visa => ResultPayload::Visa(VisaData::default()),
            AgentName::Attractions => ResultPayload::Attractions(AttractionData::default()),
            AgentName::Utilities => ResultPayload::Utility(UtilityData::default()),
        }
    }

    /// Whether the payload carries no domain data.
    pub fn is_empty(&self) -> bool {
        match self {
            ResultPayload::Flights(d) => d.options.is_empty(),
            ResultPayload::Hotels(d) => d.hotels.is_empty(),
            ResultPayload::Visa(d) => d.requirements.is_none(),
            ResultPayload::Attractions(d) => d.places.is_empty(),
            ResultPayload::Utility(d) => d.facts.is_empty(),
        }
    }

    /// Agent-written summary text.
    pub fn summary(&self) -> &str {
        match self {
            ResultPayload::Flights(d) => &d.summary,
            ResultPayload::Hotels(d) => &d.summary,
            ResultPayload::Visa(d) => &d.summary,
            ResultPayload::Attractions(d) => &d.summary,
            ResultPayload::Utility(d) => &d.summary,
        }
    }
}

/// Output of one agent dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    /// Which agent produced this result.
    pub agent: AgentName,
    /// Whether the underlying tool layer reported a failure.
    pub error: bool,
    /// Failure detail when `error` is set.
    pub error_message: Option<String>,
    /// Domain data.
    pub payload: ResultPayload,
}

impl AgentResult {
    /// Successful result.
    pub fn ok(agent: AgentName, payload: ResultPayload) -> Self {
        Self {
            agent,
            error: false,
            error_message: None,
            payload,
        }
    }

    /// Failed result carrying an empty payload for the agent's domain.
    pub fn failed(agent: AgentName, message: impl Into<String>) -> Self {
        Self {
            agent,
            error: true,
            error_message: Some(message.into()),
            payload: ResultPayload::empty_for(agent),
        }
    }

    /// Whether the result carries no usable data.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failed_result_has_empty_matching_payload() {
        let result = AgentResult::failed(AgentName::Hotel, "city not found");
        assert!(result.error);
        assert!(result.is_empty());
        assert!(matches!(result.payload, ResultPayload::Hotels(_)));
    }

    #[test]
    fn payload_emptiness_tracks_domain_data() {
        let payload = ResultPayload::Flights(FlightData {
            options: vec![json!({"airline": "Emirates", "price": 450})],
            summary: "one option".into(),
        });
        assert!(!payload.is_empty());
        assert!(ResultPayload::empty_for(AgentName::Flight).is_empty());
    }
}
