//! The travel domain agents and their result judges.
//!
//! Each agent is a `DomainAgent` profile: a persona prompt, a capability
//! table shared with its judge, and a payload builder. The reason/act loop
//! and the directive protocol live here; the tools live in `tripflow_tools`.

pub mod directive;
pub mod judge;
pub mod node;
pub mod profiles;

pub use directive::{parse_directive, Directive};
pub use judge::LlmResultJudge;
pub use node::DomainAgent;
pub use profiles::{attractions_agent, flight_agent, hotel_agent, utilities_agent, visa_agent};
