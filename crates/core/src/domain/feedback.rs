use serde::{Deserialize, Serialize};

use crate::domain::report::{IssueCategory, Report};

/// One finding with the collaborator that raised it.
///
/// Attribution is preserved so a later implementation pass can see exactly
/// which specialist raised which concern. No cross-collaborator dedup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttributedItem {
    pub collaborator_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<IssueCategory>,
    pub detail: String,
}

impl AttributedItem {
    pub fn new(
        collaborator_id: impl Into<String>,
        category: Option<IssueCategory>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            collaborator_id: collaborator_id.into(),
            category,
            detail: detail.into(),
        }
    }
}

/// Ordered merge of one phase's reports: three buckets, per-item
/// attribution, stable roster order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ConsolidatedFeedback {
    pub cycle: u32,
    pub approved: Vec<AttributedItem>,
    pub issues: Vec<AttributedItem>,
    pub blockers: Vec<AttributedItem>,
}

impl ConsolidatedFeedback {
    pub fn new(cycle: u32) -> Self {
        Self {
            cycle,
            ..Default::default()
        }
    }

    pub fn absorb(&mut self, report: &Report) {
        for item in &report.approved {
            self.approved
                .push(AttributedItem::new(&report.collaborator_id, None, item));
        }
        for (category, details) in &report.issues {
            for detail in details {
                self.issues.push(AttributedItem::new(
                    &report.collaborator_id,
                    Some(*category),
                    detail,
                ));
            }
        }
        for blocker in &report.blockers {
            self.blockers
                .push(AttributedItem::new(&report.collaborator_id, None, blocker));
        }
    }

    pub fn has_blockers(&self) -> bool {
        !self.blockers.is_empty()
    }
}

/// Per-run iteration state. Created at workflow start, dropped at
/// termination; never shared outside the active workflow instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleState {
    pub cycle: u32,
    pub feedback_history: Vec<ConsolidatedFeedback>,
}

impl CycleState {
    pub fn new() -> Self {
        Self {
            cycle: 1,
            feedback_history: Vec::new(),
        }
    }

    pub fn record(&mut self, feedback: ConsolidatedFeedback) {
        self.feedback_history.push(feedback);
    }

    pub fn latest_feedback(&self) -> Option<&ConsolidatedFeedback> {
        self.feedback_history.last()
    }

    pub fn advance(&mut self) {
        self.cycle += 1;
    }
}

impl Default for CycleState {
    fn default() -> Self {
        Self::new()
    }
}
