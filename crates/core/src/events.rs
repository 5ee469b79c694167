//! Structured turn events for the status sink.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::types::AgentName;

/// Event emitted by the executor at well-defined points of a turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnEvent {
    /// Unique event ID.
    pub id: String,
    /// Turn this event belongs to.
    pub turn_id: String,
    /// Session the turn belongs to.
    pub session_id: String,
    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,
    /// Event kind.
    pub kind: TurnEventKind,
    /// Structured payload (kind-specific data).
    pub detail: Value,
}

impl TurnEvent {
    pub fn new(turn_id: &str, session_id: &str, kind: TurnEventKind, detail: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            turn_id: turn_id.to_string(),
            session_id: session_id.to_string(),
            timestamp: Utc::now(),
            kind,
            detail,
        }
    }
}

/// Event kind category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnEventKind {
    /// The executor moved to a new phase.
    PhaseChanged { phase: String },
    /// An agent or system node started work.
    NodeStarted { node: String },
    /// An agent or system node finished work.
    NodeFinished { node: String },
    /// A feedback node issued a verdict.
    VerdictIssued { node: String, status: String },
    /// An agent is being re-dispatched after a rejection.
    RetryScheduled { agent: AgentName, attempt: usize },
    /// The turn produced its final response.
    TurnCompleted,
}

impl TurnEventKind {
    /// Short label used in logs and tests.
    pub fn label(&self) -> String {
        match self {
            TurnEventKind::PhaseChanged { phase } => format!("phase:{phase}"),
            TurnEventKind::NodeStarted { node } => format!("start:{node}"),
            TurnEventKind::NodeFinished { node } => format!("finish:{node}"),
            TurnEventKind::VerdictIssued { node, status } => format!("verdict:{node}:{status}"),
            TurnEventKind::RetryScheduled { agent, attempt } => {
                format!("retry:{agent}:{attempt}")
            }
            TurnEventKind::TurnCompleted => "turn_completed".to_string(),
        }
    }
}
