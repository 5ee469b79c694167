//! The closed set of travel domain agents.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Name of a domain agent. Plans may only reference agents from this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentName {
    /// Flight searches (one-way, round-trip, flexible dates).
    #[serde(rename = "flight_agent")]
    Flight,
    /// Hotel browsing and rate lookups.
    #[serde(rename = "hotel_agent")]
    Hotel,
    /// Visa requirement checks.
    #[serde(rename = "visa_agent")]
    Visa,
    /// Attractions, restaurants, and location reviews.
    #[serde(rename = "attractions_agent")]
    Attractions,
    /// Weather, currency conversion, holidays, eSIM bundles.
    #[serde(rename = "utilities_agent")]
    Utilities,
}

impl AgentName {
    /// All known agents, in stable order.
    pub const ALL: [AgentName; 5] = [
        AgentName::Flight,
        AgentName::Hotel,
        AgentName::Visa,
        AgentName::Attractions,
        AgentName::Utilities,
    ];

    /// Wire name used in plans and judge prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentName::Flight => "flight_agent",
            AgentName::Hotel => "hotel_agent",
            AgentName::Visa => "visa_agent",
            AgentName::Attractions => "attractions_agent",
            AgentName::Utilities => "utilities_agent",
        }
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept a few aliases the planner LLM has been observed to emit.
        match s.trim() {
            "flight_agent" | "flight" | "flights" => Ok(AgentName::Flight),
            "hotel_agent" | "hotel" | "hotels" => Ok(AgentName::Hotel),
            "visa_agent" | "visa" => Ok(AgentName::Visa),
            "attractions_agent" | "tripadvisor_agent" | "attractions" => Ok(AgentName::Attractions),
            "utilities_agent" | "utilities" | "utility_agent" => Ok(AgentName::Utilities),
            other => Err(Error::plan_structure(format!("unknown agent name: {other}"))),
        }
    }
}
