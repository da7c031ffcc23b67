use chrono::{DateTime, Utc};
use revloop_core::{AttributedItem, CycleState, Domain, GateVerdict, Report};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::iteration::TerminationReason;

/// A finding still open at termination. Blocking items are blockers the
/// workflow ran out of cycles for; the rest are recommendations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnresolvedItem {
    pub item: AttributedItem,
    pub blocking: bool,
}

/// Emitted on every termination path. Remaining findings are reported
/// explicitly, never silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub workflow_id: Uuid,
    pub domain: Domain,
    pub cycles_run: u32,
    pub reason: TerminationReason,
    pub final_verdict: Option<GateVerdict>,
    pub approved: Vec<AttributedItem>,
    pub unresolved: Vec<UnresolvedItem>,
    pub completed_at: DateTime<Utc>,
}

impl WorkflowSummary {
    pub fn build(
        workflow_id: Uuid,
        domain: Domain,
        state: &CycleState,
        gate_report: &Report,
        final_verdict: Option<GateVerdict>,
        reason: TerminationReason,
    ) -> Self {
        let mut approved = Vec::new();
        let mut unresolved = Vec::new();

        if let Some(feedback) = state.latest_feedback() {
            approved.extend(feedback.approved.iter().cloned());
            for issue in &feedback.issues {
                unresolved.push(UnresolvedItem {
                    item: issue.clone(),
                    blocking: false,
                });
            }
            for blocker in &feedback.blockers {
                unresolved.push(UnresolvedItem {
                    item: blocker.clone(),
                    blocking: true,
                });
            }
        }

        for item in &gate_report.approved {
            approved.push(AttributedItem::new(
                &gate_report.collaborator_id,
                None,
                item,
            ));
        }
        for (category, details) in &gate_report.issues {
            for detail in details {
                unresolved.push(UnresolvedItem {
                    item: AttributedItem::new(
                        &gate_report.collaborator_id,
                        Some(*category),
                        detail,
                    ),
                    blocking: false,
                });
            }
        }
        for blocker in &gate_report.blockers {
            unresolved.push(UnresolvedItem {
                item: AttributedItem::new(&gate_report.collaborator_id, None, blocker),
                blocking: true,
            });
        }

        Self {
            workflow_id,
            domain,
            cycles_run: state.cycle,
            reason,
            final_verdict,
            approved,
            unresolved,
            completed_at: Utc::now(),
        }
    }

    pub fn has_unresolved_blockers(&self) -> bool {
        self.unresolved.iter().any(|u| u.blocking)
    }

    /// Text rendering for the conversational surface. The summary is the
    /// result channel; there is no exit-code protocol.
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "Workflow summary: {} domain, {} cycle{}\n",
            self.domain.as_str(),
            self.cycles_run,
            if self.cycles_run == 1 { "" } else { "s" }
        ));
        let reason = match self.reason {
            TerminationReason::MaxCyclesReached => "cycle budget reached",
            TerminationReason::ContinuationDeclined => "continuation declined",
        };
        out.push_str(&format!("Terminated: {}\n", reason));
        match self.final_verdict {
            Some(verdict) => out.push_str(&format!("Final verdict: {}\n", verdict.as_str())),
            None => out.push_str("Final verdict: none recorded\n"),
        }

        out.push_str("\nApproved:\n");
        if self.approved.is_empty() {
            out.push_str("  (none)\n");
        }
        for item in &self.approved {
            out.push_str(&format!("  - [{}] {}\n", item.collaborator_id, item.detail));
        }

        let recommendations: Vec<_> = self.unresolved.iter().filter(|u| !u.blocking).collect();
        out.push_str("\nUnresolved recommendations (non-blocking):\n");
        if recommendations.is_empty() {
            out.push_str("  (none)\n");
        }
        for unresolved in recommendations {
            match unresolved.item.category {
                Some(category) => out.push_str(&format!(
                    "  - [{}][{}] {}\n",
                    unresolved.item.collaborator_id,
                    category.as_str(),
                    unresolved.item.detail
                )),
                None => out.push_str(&format!(
                    "  - [{}] {}\n",
                    unresolved.item.collaborator_id, unresolved.item.detail
                )),
            }
        }

        let blockers: Vec<_> = self.unresolved.iter().filter(|u| u.blocking).collect();
        if !blockers.is_empty() {
            out.push_str("\nUnresolved blockers:\n");
            for unresolved in blockers {
                out.push_str(&format!(
                    "  - [{}] {}\n",
                    unresolved.item.collaborator_id, unresolved.item.detail
                ));
            }
        }

        out
    }
}
