//! Core types, traits, and error definitions for Tripflow.
//!
//! This crate provides the foundational building blocks shared across all
//! layers of the travel-planning orchestration system: the plan/step data
//! model, the oracle traits that wrap LLM judgment calls, the tool contracts,
//! and scripted mocks for testing the control-flow mechanics without a model.

pub mod config;
pub mod error;
pub mod events;
pub mod json;
pub mod mocks;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use events::*;
pub use traits::*;
pub use types::*;
