//! External collaborator boundaries: memory, completeness gate, status sink.

use async_trait::async_trait;

use crate::error::Result;
use crate::events::TurnEvent;
use crate::types::Completeness;

/// Conversation memory collaborator, consulted once at turn start.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Retrieve facts relevant to the query for this user.
    async fn retrieve_relevant(&self, user_id: &str, query: &str) -> Result<Vec<String>>;

    /// Record a fact from the finished exchange.
    async fn remember(&self, user_id: &str, fact: &str) -> Result<()>;
}

/// Request-for-information gate: checks whether the user supplied the
/// logical minimum to act on, before any planning happens.
#[async_trait]
pub trait CompletenessChecker: Send + Sync {
    async fn check(&self, user_message: &str) -> Result<Completeness>;
}

/// Telemetry sink notified at node enter/exit, each verdict, and turn
/// completion. The executor awaits each emission inline, so implementations
/// must be cheap and must never block on I/O; buffer and flush elsewhere.
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn emit(&self, event: TurnEvent);
}

/// No-op sink for tests and default wiring.
pub struct NoOpStatusSink;

#[async_trait]
impl StatusSink for NoOpStatusSink {
    async fn emit(&self, _event: TurnEvent) {}
}
