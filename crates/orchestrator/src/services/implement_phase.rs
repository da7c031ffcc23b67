use revloop_core::{Artifact, FocusProfile, PhaseMode, Report, WorkflowState};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{OrchestratorError, Result};
use crate::services::WorkflowContext;

pub struct ImplementPhase;

impl ImplementPhase {
    /// Run the single Phase 1 invocation of the cycle.
    ///
    /// The implementer is the only collaborator that receives the artifact
    /// mutably. A failure here is fatal for the run: with no new revision
    /// there is nothing for the review phases to look at.
    pub async fn run(
        ctx: &WorkflowContext,
        workflow_id: Uuid,
        cycle: u32,
        artifact: &mut Artifact,
        focus: &FocusProfile,
    ) -> Result<Report> {
        let implementer = ctx.registry.implementer();

        info!(
            workflow_id = %workflow_id,
            cycle = cycle,
            collaborator_id = %implementer.id(),
            mode = %PhaseMode::Sequential.as_str(),
            focus = %focus.kind.as_str(),
            carryover_count = focus.carryover.len(),
            "Starting implementation phase"
        );
        ctx.emit_phase_started(workflow_id, cycle, WorkflowState::Phase1);

        let revision_before = artifact.revision;

        let report = implementer
            .implement(artifact, focus)
            .await
            .map_err(|e| OrchestratorError::ImplementationFailed {
                collaborator_id: implementer.id().to_string(),
                reason: e.to_string(),
            })?;

        debug!(
            revision_before = revision_before,
            revision_after = artifact.revision,
            "Implementation returned"
        );

        ctx.emit_collaborator_completed(
            workflow_id,
            cycle,
            implementer.id(),
            report.blockers.len(),
            false,
        );
        ctx.emit_phase_completed(workflow_id, cycle, WorkflowState::Phase1);

        Ok(report)
    }
}
