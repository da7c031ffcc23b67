use revloop_core::{Artifact, FocusProfile, Report, WorkflowState};
use tracing::{info, warn};
use uuid::Uuid;

use crate::services::WorkflowContext;

pub struct GatePhase;

impl GatePhase {
    /// Run the sequential Phase 3 gate check.
    ///
    /// The gate always runs, even when Phase 2 already produced a blocker
    /// that guarantees a loop-back. A gate failure or timeout degrades to a
    /// blocker report with no verdict (which the evaluator treats as FAIL)
    /// rather than aborting the run.
    pub async fn run(
        ctx: &WorkflowContext,
        workflow_id: Uuid,
        cycle: u32,
        artifact: &Artifact,
        focus: &FocusProfile,
    ) -> Report {
        let gate = ctx.registry.gate();

        info!(
            workflow_id = %workflow_id,
            cycle = cycle,
            collaborator_id = %gate.id(),
            "Starting gate check"
        );
        ctx.emit_phase_started(workflow_id, cycle, WorkflowState::Phase3);

        let timeout = ctx.config.review_timeout;
        let (report, degraded) =
            match tokio::time::timeout(timeout, gate.review(artifact, focus)).await {
                Ok(Ok(report)) => (report, false),
                Ok(Err(e)) => {
                    warn!(
                        collaborator_id = %gate.id(),
                        error = %e,
                        "Gate collaborator failed, recording as blocker"
                    );
                    (
                        Report::from_failure(gate.id(), format!("gate check failed: {}", e)),
                        true,
                    )
                }
                Err(_) => {
                    warn!(
                        collaborator_id = %gate.id(),
                        timeout_secs = timeout.as_secs(),
                        "Gate collaborator timed out, recording as blocker"
                    );
                    (
                        Report::from_failure(
                            gate.id(),
                            format!("gate check timed out after {}s", timeout.as_secs()),
                        ),
                        true,
                    )
                }
            };

        ctx.emit_collaborator_completed(
            workflow_id,
            cycle,
            &report.collaborator_id,
            report.blockers.len(),
            degraded,
        );

        if let Some(verdict) = report.verdict {
            ctx.emit_event(events::Event::VerdictRecorded {
                workflow_id,
                cycle,
                verdict: verdict.as_str().to_string(),
            });
        }

        ctx.emit_phase_completed(workflow_id, cycle, WorkflowState::Phase3);

        report
    }
}
