//! The five travel agent profiles.
//!
//! A profile is a system prompt, a capability table, and a payload builder;
//! `DomainAgent` supplies the loop. Prompt text is deliberately terse: the
//! capability table carries the parameter contract, so the prompt only sets
//! the persona and the domain ground rules.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use tripflow_core::traits::{LlmClient, ToolRegistry};
use tripflow_core::types::{
    AgentName, AttractionData, FlightData, HotelData, ResultPayload, UtilityData, VisaData,
};
use tripflow_tools::{
    attractions_capabilities, flight_capabilities, hotel_capabilities, utilities_capabilities,
    visa_capabilities,
};

use crate::node::DomainAgent;

const FLIGHT_PROMPT: &str = "You are a flight search specialist. Find flight \
options matching the traveller's route and dates. Report airline, times, \
stops, and price for each option. If the route or dates are not given, say \
so instead of guessing.";

const HOTEL_PROMPT: &str = "You are a hotel specialist. Browsing hotels in a \
city needs no dates; quoting rates requires check-in and check-out dates. \
Report names, ratings, and locations, and prices only when you actually \
fetched rates.";

const VISA_PROMPT: &str = "You are a visa requirements specialist. Determine \
what a traveller of the given nationality needs to enter the destination \
country. Never state requirements you did not look up.";

const ATTRACTIONS_PROMPT: &str = "You are a local discovery specialist. Find \
attractions, restaurants, and points of interest for the destination, \
matched to any interests the traveller mentioned.";

const UTILITIES_PROMPT: &str = "You are a practical travel assistant \
covering weather, currency conversion, and public holidays. Answer only the \
utility questions the task asks for.";

fn take_array(data: &BTreeMap<String, Value>, tool: &str, field: &str) -> Vec<Value> {
    data.get(tool)
        .and_then(|d| d.get(field))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn flight_payload(data: &BTreeMap<String, Value>, summary: String) -> ResultPayload {
    ResultPayload::Flights(FlightData {
        options: take_array(data, "search_flights", "options"),
        summary,
    })
}

fn hotel_payload(data: &BTreeMap<String, Value>, summary: String) -> ResultPayload {
    // Browsing and rate lookups both contribute; rates carry the listing
    // they priced, so a plain merge is enough.
    let mut hotels = take_array(data, "get_list_of_hotels", "hotels");
    hotels.extend(take_array(data, "get_hotel_rates", "rates"));
    if let Some(details) = data.get("get_hotel_details") {
        hotels.push(details.clone());
    }
    ResultPayload::Hotels(HotelData { hotels, summary })
}

fn visa_payload(data: &BTreeMap<String, Value>, summary: String) -> ResultPayload {
    ResultPayload::Visa(VisaData {
        requirements: data.get("get_visa_requirements").cloned(),
        summary,
    })
}

fn attraction_payload(data: &BTreeMap<String, Value>, summary: String) -> ResultPayload {
    ResultPayload::Attractions(AttractionData {
        places: take_array(data, "search_attractions", "places"),
        summary,
    })
}

fn utility_payload(data: &BTreeMap<String, Value>, summary: String) -> ResultPayload {
    // Facts keyed by tool name, so the join output says where each came from.
    let mut facts = serde_json::Map::new();
    for (tool, value) in data {
        facts.insert(tool.clone(), value.clone());
    }
    ResultPayload::Utility(UtilityData { facts, summary })
}

pub fn flight_agent(
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolRegistry>,
    max_tool_iterations: usize,
) -> DomainAgent {
    DomainAgent::new(
        AgentName::Flight,
        FLIGHT_PROMPT,
        flight_capabilities(),
        llm,
        tools,
        max_tool_iterations,
        flight_payload,
    )
}

pub fn hotel_agent(
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolRegistry>,
    max_tool_iterations: usize,
) -> DomainAgent {
    DomainAgent::new(
        AgentName::Hotel,
        HOTEL_PROMPT,
        hotel_capabilities(),
        llm,
        tools,
        max_tool_iterations,
        hotel_payload,
    )
}

pub fn visa_agent(
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolRegistry>,
    max_tool_iterations: usize,
) -> DomainAgent {
    DomainAgent::new(
        AgentName::Visa,
        VISA_PROMPT,
        visa_capabilities(),
        llm,
        tools,
        max_tool_iterations,
        visa_payload,
    )
}

pub fn attractions_agent(
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolRegistry>,
    max_tool_iterations: usize,
) -> DomainAgent {
    DomainAgent::new(
        AgentName::Attractions,
        ATTRACTIONS_PROMPT,
        attractions_capabilities(),
        llm,
        tools,
        max_tool_iterations,
        attraction_payload,
    )
}

pub fn utilities_agent(
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolRegistry>,
    max_tool_iterations: usize,
) -> DomainAgent {
    DomainAgent::new(
        AgentName::Utilities,
        UTILITIES_PROMPT,
        utilities_capabilities(),
        llm,
        tools,
        max_tool_iterations,
        utility_payload,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hotel_payload_merges_browsing_and_rates() {
        let mut data = BTreeMap::new();
        data.insert(
            "get_list_of_hotels".to_string(),
            json!({"hotels": [{"name": "A"}, {"name": "B"}]}),
        );
        data.insert(
            "get_hotel_rates".to_string(),
            json!({"rates": [{"name": "A", "price": 120}]}),
        );
        let payload = hotel_payload(&data, "three entries".into());
        match payload {
            ResultPayload::Hotels(h) => assert_eq!(h.hotels.len(), 3),
            other => panic!("wrong payload: {other:?}"),
        }
    }

    #[test]
    fn utility_payload_keys_facts_by_tool() {
        let mut data = BTreeMap::new();
        data.insert("get_weather".to_string(), json!({"temp": 21.5}));
        data.insert("convert_currency".to_string(), json!({"converted": 93.1}));
        let payload = utility_payload(&data, "facts".into());
        match payload {
            ResultPayload::Utility(u) => {
                assert!(u.facts.contains_key("get_weather"));
                assert!(u.facts.contains_key("convert_currency"));
            }
            other => panic!("wrong payload: {other:?}"),
        }
    }
}
