//! Event types for the revloop workflow trace

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope wrapping all events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: Event,
}

impl EventEnvelope {
    /// Create a new event envelope with auto-generated ID and timestamp
    pub fn new(event: Event) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// All possible events in a workflow run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    // Workflow lifecycle
    /// A workflow run started
    #[serde(rename = "workflow.started")]
    WorkflowStarted {
        workflow_id: Uuid,
        domain: String,
        description: String,
    },

    /// A workflow run terminated
    #[serde(rename = "workflow.completed")]
    WorkflowCompleted {
        workflow_id: Uuid,
        cycles_run: u32,
        outcome: String,
    },

    // Cycle and phase events
    /// A new cycle began
    #[serde(rename = "cycle.started")]
    CycleStarted { workflow_id: Uuid, cycle: u32 },

    /// A phase was entered
    #[serde(rename = "phase.started")]
    PhaseStarted {
        workflow_id: Uuid,
        cycle: u32,
        phase: String,
    },

    /// A phase finished
    #[serde(rename = "phase.completed")]
    PhaseCompleted {
        workflow_id: Uuid,
        cycle: u32,
        phase: String,
    },

    // Collaborator events
    /// A collaborator returned a report (`degraded` marks a synthetic
    /// blocker report recorded for an error or timeout)
    #[serde(rename = "collaborator.completed")]
    CollaboratorCompleted {
        workflow_id: Uuid,
        cycle: u32,
        collaborator_id: String,
        blocker_count: usize,
        degraded: bool,
    },

    /// The gate collaborator's verdict was recorded
    #[serde(rename = "verdict.recorded")]
    VerdictRecorded {
        workflow_id: Uuid,
        cycle: u32,
        verdict: String,
    },

    // Decision events
    /// The controller asked the user whether to continue
    #[serde(rename = "confirmation.requested")]
    ConfirmationRequested { workflow_id: Uuid, cycle: u32 },

    /// The user answered a continuation request
    #[serde(rename = "confirmation.answered")]
    ConfirmationAnswered {
        workflow_id: Uuid,
        cycle: u32,
        accepted: bool,
    },

    // System events
    /// Generic error event
    #[serde(rename = "error")]
    Error {
        message: String,
        context: Option<String>,
    },
}

impl Event {
    /// Get the workflow ID associated with this event, if any
    pub fn workflow_id(&self) -> Option<Uuid> {
        match self {
            Event::WorkflowStarted { workflow_id, .. } => Some(*workflow_id),
            Event::WorkflowCompleted { workflow_id, .. } => Some(*workflow_id),
            Event::CycleStarted { workflow_id, .. } => Some(*workflow_id),
            Event::PhaseStarted { workflow_id, .. } => Some(*workflow_id),
            Event::PhaseCompleted { workflow_id, .. } => Some(*workflow_id),
            Event::CollaboratorCompleted { workflow_id, .. } => Some(*workflow_id),
            Event::VerdictRecorded { workflow_id, .. } => Some(*workflow_id),
            Event::ConfirmationRequested { workflow_id, .. } => Some(*workflow_id),
            Event::ConfirmationAnswered { workflow_id, .. } => Some(*workflow_id),
            Event::Error { .. } => None,
        }
    }

    /// True for the confirmation-request event; the auto-loop properties in
    /// the test suite assert on its absence.
    pub fn is_confirmation_request(&self) -> bool {
        matches!(self, Event::ConfirmationRequested { .. })
    }
}
