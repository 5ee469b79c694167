//! Tool layer for Tripflow.
//!
//! This crate provides:
//! - The tool registry implementation
//! - Typed reqwest-backed wrappers around external travel APIs
//! - The per-domain capability tables consulted by agents and judges

pub mod attractions;
pub mod capabilities;
pub mod flights;
pub mod hotels;
pub mod registry;
pub mod utilities;
pub mod visa;

pub use attractions::AttractionSearchTool;
pub use capabilities::{
    attractions_capabilities, flight_capabilities, hotel_capabilities, utilities_capabilities,
    visa_capabilities,
};
pub use flights::FlightSearchTool;
pub use hotels::{HotelDetailsTool, HotelListTool, HotelRatesTool};
pub use registry::DefaultToolRegistry;
pub use utilities::{CurrencyTool, HolidaysTool, WeatherTool};
pub use visa::VisaRequirementTool;

use std::sync::Arc;
use tripflow_core::config::ToolsConfig;
use tripflow_core::traits::ToolRegistry;
use tripflow_core::Result;

/// Build a registry with every travel tool wired against the configured APIs.
pub async fn build_registry(config: &ToolsConfig) -> Result<Arc<DefaultToolRegistry>> {
    let http = reqwest::Client::new();
    let registry = Arc::new(DefaultToolRegistry::new());

    registry
        .register(Box::new(FlightSearchTool::new(http.clone(), config)))
        .await?;
    registry
        .register(Box::new(HotelListTool::new(http.clone(), config)))
        .await?;
    registry
        .register(Box::new(HotelRatesTool::new(http.clone(), config)))
        .await?;
    registry
        .register(Box::new(HotelDetailsTool::new(http.clone(), config)))
        .await?;
    registry
        .register(Box::new(VisaRequirementTool::new(http.clone(), config)))
        .await?;
    registry
        .register(Box::new(AttractionSearchTool::new(http.clone(), config)))
        .await?;
    registry
        .register(Box::new(WeatherTool::new(http.clone(), config)))
        .await?;
    registry
        .register(Box::new(CurrencyTool::new(http.clone(), config)))
        .await?;
    registry
        .register(Box::new(HolidaysTool::new(http, config)))
        .await?;

    Ok(registry)
}
