//! Capability tables: the published parameter contract per domain.
//!
//! Hoisted out of prompt text into data so the same source of truth drives
//! both the agent's "did I gather enough" check and the judge's "is this
//! failure acceptable" decision.

use tripflow_core::types::{CapabilityTable, ToolSpec};

/// Tools the flight agent may invoke.
pub fn flight_capabilities() -> CapabilityTable {
    CapabilityTable::new(vec![ToolSpec::new(
        "search_flights",
        "Search flights between two airports or cities",
    )
    .required(&["origin", "destination", "departure_date"])
    .optional(&["return_date", "passengers", "cabin_class"])])
}

/// Tools the hotel agent may invoke.
///
/// Browsing needs no dates; rates and details do — the distinction the
/// hotel judge leans on when deciding whether missing prices are acceptable.
pub fn hotel_capabilities() -> CapabilityTable {
    CapabilityTable::new(vec![
        ToolSpec::new(
            "get_list_of_hotels",
            "List hotels in a city; returns names, addresses, ratings - no prices",
        )
        .required(&["city"])
        .optional(&["min_rating", "max_results"]),
        ToolSpec::new(
            "get_hotel_rates",
            "Nightly rates for hotels over a stay window",
        )
        .required(&["city", "check_in", "check_out"])
        .optional(&["guests", "max_price"]),
        ToolSpec::new("get_hotel_details", "Details for one specific hotel")
            .required(&["hotel_id"])
            .optional(&["check_in", "check_out"]),
    ])
}

/// Tools the visa agent may invoke.
pub fn visa_capabilities() -> CapabilityTable {
    CapabilityTable::new(vec![ToolSpec::new(
        "get_visa_requirements",
        "Visa requirements for a nationality travelling to a destination country",
    )
    .required(&["nationality", "destination"])
    .optional(&["departure_country"])])
}

/// Tools the attractions agent may invoke.
pub fn attractions_capabilities() -> CapabilityTable {
    CapabilityTable::new(vec![ToolSpec::new(
        "search_attractions",
        "Attractions, restaurants, and points of interest in a location",
    )
    .required(&["location"])
    .optional(&["category", "max_results"])])
}

/// Tools the utilities agent may invoke.
pub fn utilities_capabilities() -> CapabilityTable {
    CapabilityTable::new(vec![
        ToolSpec::new("get_weather", "Weather forecast for a location")
            .required(&["location"])
            .optional(&["date"]),
        ToolSpec::new("convert_currency", "Convert an amount between currencies")
            .required(&["from", "to"])
            .optional(&["amount"]),
        ToolSpec::new("get_holidays", "Public holidays for a country")
            .required(&["country_code"])
            .optional(&["year"]),
    ])
}
