use std::sync::Arc;

use futures::future::join_all;
use revloop_core::{Artifact, ConsolidatedFeedback, FocusProfile, PhaseMode, Report, WorkflowState};
use tracing::{info, warn};
use uuid::Uuid;

use crate::aggregator::ReviewAggregator;
use crate::collaborator::Reviewer;
use crate::error::{OrchestratorError, Result};
use crate::services::WorkflowContext;

pub struct ReviewPhase;

impl ReviewPhase {
    /// Run the Phase 2 fan-out: every reviewer in the roster is dispatched
    /// in a single concurrent batch, and the barrier releases only once all
    /// of them have produced a report.
    ///
    /// A reviewer error or timeout is degraded to a synthetic report whose
    /// blocker records the failure; siblings keep running, and the barrier
    /// still collects exactly N reports.
    pub async fn run(
        ctx: &WorkflowContext,
        workflow_id: Uuid,
        cycle: u32,
        artifact: &Artifact,
        focus: &FocusProfile,
    ) -> Result<ConsolidatedFeedback> {
        let reviewers = ctx.registry.reviewers();
        if reviewers.is_empty() {
            return Err(OrchestratorError::EmptyRoster {
                phase: WorkflowState::Phase2.as_str().to_string(),
            });
        }

        info!(
            workflow_id = %workflow_id,
            cycle = cycle,
            reviewer_count = reviewers.len(),
            mode = %PhaseMode::Parallel.as_str(),
            "Dispatching concurrent review batch"
        );
        ctx.emit_phase_started(workflow_id, cycle, WorkflowState::Phase2);

        let batch = reviewers.iter().map(|reviewer| {
            let reviewer = Arc::clone(reviewer);
            let timeout = ctx.config.review_timeout;
            async move { Self::review_with_degrade(reviewer, artifact, focus, timeout).await }
        });

        // Barrier join: no early action on partial results.
        let results = join_all(batch).await;

        let mut reports = Vec::with_capacity(results.len());
        for (report, degraded) in results {
            ctx.emit_collaborator_completed(
                workflow_id,
                cycle,
                &report.collaborator_id,
                report.blockers.len(),
                degraded,
            );
            reports.push(report);
        }

        let feedback = ReviewAggregator::consolidate(cycle, &reports);

        info!(
            approved_count = feedback.approved.len(),
            issue_count = feedback.issues.len(),
            blocker_count = feedback.blockers.len(),
            "Review barrier released"
        );
        ctx.emit_phase_completed(workflow_id, cycle, WorkflowState::Phase2);

        Ok(feedback)
    }

    async fn review_with_degrade(
        reviewer: Arc<dyn Reviewer>,
        artifact: &Artifact,
        focus: &FocusProfile,
        timeout: std::time::Duration,
    ) -> (Report, bool) {
        match tokio::time::timeout(timeout, reviewer.review(artifact, focus)).await {
            Ok(Ok(report)) => (report, false),
            Ok(Err(e)) => {
                warn!(
                    collaborator_id = %reviewer.id(),
                    error = %e,
                    "Reviewer failed, recording as blocker"
                );
                (
                    Report::from_failure(reviewer.id(), format!("review failed: {}", e)),
                    true,
                )
            }
            Err(_) => {
                warn!(
                    collaborator_id = %reviewer.id(),
                    timeout_secs = timeout.as_secs(),
                    "Reviewer timed out, recording as blocker"
                );
                (
                    Report::from_failure(
                        reviewer.id(),
                        format!("review timed out after {}s", timeout.as_secs()),
                    ),
                    true,
                )
            }
        }
    }
}
