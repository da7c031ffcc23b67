use std::time::Duration;

use events::{Event, EventBus, EventEnvelope};
use revloop_core::{Domain, WorkflowState};
use tracing::debug;
use uuid::Uuid;

use crate::collaborator::CollaboratorRegistry;
use crate::error::Result;
use crate::iteration::DEFAULT_MAX_CYCLES;
use crate::state_machine::WorkflowStateMachine;

/// Default per-collaborator review timeout. The source workflow defines no
/// timeout for a stalled reviewer; expiry degrades to a Blocker rather
/// than hanging the barrier.
pub const DEFAULT_REVIEW_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub domain: Domain,
    pub max_cycles: u32,
    pub review_timeout: Duration,
}

impl WorkflowConfig {
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            max_cycles: DEFAULT_MAX_CYCLES,
            review_timeout: DEFAULT_REVIEW_TIMEOUT,
        }
    }

    pub fn with_max_cycles(mut self, max_cycles: u32) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    pub fn with_review_timeout(mut self, timeout: Duration) -> Self {
        self.review_timeout = timeout;
        self
    }
}

/// Shared dependencies of one workflow run: configuration, the injected
/// collaborator set, and an optional event bus for the trace.
pub struct WorkflowContext {
    pub config: WorkflowConfig,
    pub registry: CollaboratorRegistry,
    pub event_bus: Option<EventBus>,
}

impl WorkflowContext {
    pub fn new(config: WorkflowConfig, registry: CollaboratorRegistry) -> Self {
        Self {
            config,
            registry,
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn emit_event(&self, event: Event) {
        if let Some(ref bus) = self.event_bus {
            bus.publish(EventEnvelope::new(event));
        }
    }

    pub fn transition(&self, state: &mut WorkflowState, to: WorkflowState) -> Result<()> {
        WorkflowStateMachine::validate_transition(state, &to)?;
        debug!(
            from = %state.as_str(),
            to = %to.as_str(),
            "Workflow state transition"
        );
        *state = to;
        Ok(())
    }

    pub fn emit_phase_started(&self, workflow_id: Uuid, cycle: u32, phase: WorkflowState) {
        self.emit_event(Event::PhaseStarted {
            workflow_id,
            cycle,
            phase: phase.as_str().to_string(),
        });
    }

    pub fn emit_phase_completed(&self, workflow_id: Uuid, cycle: u32, phase: WorkflowState) {
        self.emit_event(Event::PhaseCompleted {
            workflow_id,
            cycle,
            phase: phase.as_str().to_string(),
        });
    }

    pub fn emit_collaborator_completed(
        &self,
        workflow_id: Uuid,
        cycle: u32,
        collaborator_id: &str,
        blocker_count: usize,
        degraded: bool,
    ) {
        self.emit_event(Event::CollaboratorCompleted {
            workflow_id,
            cycle,
            collaborator_id: collaborator_id.to_string(),
            blocker_count,
            degraded,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = WorkflowConfig::new(Domain::Backend)
            .with_max_cycles(5)
            .with_review_timeout(Duration::from_secs(30));

        assert_eq!(config.domain, Domain::Backend);
        assert_eq!(config.max_cycles, 5);
        assert_eq!(config.review_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_defaults() {
        let config = WorkflowConfig::new(Domain::Frontend);
        assert_eq!(config.max_cycles, DEFAULT_MAX_CYCLES);
        assert_eq!(config.review_timeout, DEFAULT_REVIEW_TIMEOUT);
    }
}
