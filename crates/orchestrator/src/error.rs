use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Core(#[from] revloop_core::CoreError),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Empty reviewer roster for {phase}")]
    EmptyRoster { phase: String },

    #[error("Implementation collaborator {collaborator_id} failed: {reason}")]
    ImplementationFailed {
        collaborator_id: String,
        reason: String,
    },

    #[error("Collaborator {collaborator_id} failed: {reason}")]
    CollaboratorFailed {
        collaborator_id: String,
        reason: String,
    },

    #[error("Malformed response from {collaborator_id}: {reason}")]
    MalformedResponse {
        collaborator_id: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OrchestratorError {
    /// Create a collaborator failure error.
    pub fn collaborator_failed(
        collaborator_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::CollaboratorFailed {
            collaborator_id: collaborator_id.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed response error.
    pub fn malformed_response(
        collaborator_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedResponse {
            collaborator_id: collaborator_id.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
