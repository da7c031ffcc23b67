use revloop_core::WorkflowState;

use crate::error::{OrchestratorError, Result};

pub struct WorkflowStateMachine;

impl WorkflowStateMachine {
    pub fn validate_transition(from: &WorkflowState, to: &WorkflowState) -> Result<()> {
        let allowed = Self::allowed_transitions(from);

        if allowed.contains(to) {
            Ok(())
        } else {
            Err(OrchestratorError::InvalidTransition {
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
            })
        }
    }

    fn allowed_transitions(from: &WorkflowState) -> Vec<WorkflowState> {
        match from {
            WorkflowState::Init => vec![WorkflowState::Phase1],
            WorkflowState::Phase1 => vec![WorkflowState::Phase2],
            WorkflowState::Phase2 => vec![WorkflowState::Phase3],
            WorkflowState::Phase3 => vec![WorkflowState::Decision],
            // Decision either loops back into a new cycle or terminates.
            WorkflowState::Decision => vec![WorkflowState::Phase1, WorkflowState::Done],
            WorkflowState::Done => vec![],
        }
    }

    pub fn can_transition(from: &WorkflowState, to: &WorkflowState) -> bool {
        Self::validate_transition(from, to).is_ok()
    }

    pub fn next_state(current: &WorkflowState) -> Option<WorkflowState> {
        match current {
            WorkflowState::Init => Some(WorkflowState::Phase1),
            WorkflowState::Phase1 => Some(WorkflowState::Phase2),
            WorkflowState::Phase2 => Some(WorkflowState::Phase3),
            WorkflowState::Phase3 => Some(WorkflowState::Decision),
            // The decision branch is data-dependent; there is no single
            // successor.
            WorkflowState::Decision => None,
            WorkflowState::Done => None,
        }
    }
}
