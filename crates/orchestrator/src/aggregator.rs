use revloop_core::{ConsolidatedFeedback, Report};

pub struct ReviewAggregator;

impl ReviewAggregator {
    /// Merge the reports collected at the Phase 2 barrier.
    ///
    /// Reports are absorbed in roster order, item order within a report is
    /// preserved, and nothing is deduplicated or reprioritized across
    /// collaborators: two reviewers flagging the same issue produce two
    /// attributed items.
    pub fn consolidate(cycle: u32, reports: &[Report]) -> ConsolidatedFeedback {
        let mut feedback = ConsolidatedFeedback::new(cycle);
        for report in reports {
            feedback.absorb(report);
        }
        feedback
    }
}
