use async_trait::async_trait;
use revloop_core::{ConsolidatedFeedback, CycleState, GateVerdict};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::gate::GateDecision;

pub const DEFAULT_MAX_CYCLES: u32 = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The cycle budget was reached; the workflow terminates regardless of
    /// verdict or outstanding blockers.
    MaxCyclesReached,
    /// The user declined to continue.
    ContinuationDeclined,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaxCyclesReached => "max_cycles_reached",
            Self::ContinuationDeclined => "continuation_declined",
        }
    }
}

/// What the controller decided at the DECISION state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Re-enter Phase 1 automatically; no confirmation is requested.
    LoopBack,
    /// Ask the user whether to run another cycle after the given verdict.
    AwaitConfirmation(GateVerdict),
    Terminate(TerminationReason),
}

/// User-interaction port for the continuation question. The CLI reads
/// stdin; tests script the answers.
#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    async fn confirm_continue(&self, cycle: u32, verdict: GateVerdict) -> Result<bool>;
}

/// Owns the cycle counter and the feedback history for one workflow run.
pub struct IterationController {
    max_cycles: u32,
    state: CycleState,
}

impl IterationController {
    pub fn new(max_cycles: u32) -> Self {
        Self {
            max_cycles,
            state: CycleState::new(),
        }
    }

    pub fn cycle(&self) -> u32 {
        self.state.cycle
    }

    pub fn max_cycles(&self) -> u32 {
        self.max_cycles
    }

    pub fn state(&self) -> &CycleState {
        &self.state
    }

    pub fn record_feedback(&mut self, feedback: ConsolidatedFeedback) {
        self.state.record(feedback);
    }

    pub fn latest_feedback(&self) -> Option<&ConsolidatedFeedback> {
        self.state.latest_feedback()
    }

    /// The decision rule, evaluated once per cycle.
    ///
    /// Exhausting the cycle budget terminates unconditionally, before the
    /// loop-back and confirmation branches are considered; a blocker or
    /// FAIL inside the final cycle therefore terminates instead of looping.
    pub fn decide(&self, gate: &GateDecision) -> Decision {
        if self.state.cycle >= self.max_cycles {
            info!(
                cycle = self.state.cycle,
                max_cycles = self.max_cycles,
                "Cycle budget exhausted, terminating"
            );
            return Decision::Terminate(TerminationReason::MaxCyclesReached);
        }

        match gate {
            GateDecision::LoopBack { reasons } => {
                info!(
                    cycle = self.state.cycle,
                    blocker_count = reasons.len(),
                    "Loop-back forced, skipping user confirmation"
                );
                Decision::LoopBack
            }
            GateDecision::Proceed { verdict } => {
                info!(
                    cycle = self.state.cycle,
                    verdict = %verdict.as_str(),
                    "Gate passed, asking user about continuation"
                );
                Decision::AwaitConfirmation(*verdict)
            }
        }
    }

    /// Move to the next cycle. Callers only advance after a `LoopBack`
    /// decision or an affirmative confirmation, so the counter never
    /// exceeds `max_cycles`.
    pub fn advance(&mut self) {
        debug_assert!(self.state.cycle < self.max_cycles);
        self.state.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revloop_core::AttributedItem;

    fn loop_back() -> GateDecision {
        GateDecision::LoopBack {
            reasons: vec![AttributedItem::new("security-review", None, "auth bypass")],
        }
    }

    fn proceed(verdict: GateVerdict) -> GateDecision {
        GateDecision::Proceed { verdict }
    }

    #[test]
    fn test_loop_back_skips_confirmation() {
        let controller = IterationController::new(DEFAULT_MAX_CYCLES);
        assert_eq!(controller.decide(&loop_back()), Decision::LoopBack);
    }

    #[test]
    fn test_pass_awaits_confirmation() {
        let controller = IterationController::new(DEFAULT_MAX_CYCLES);
        assert_eq!(
            controller.decide(&proceed(GateVerdict::Pass)),
            Decision::AwaitConfirmation(GateVerdict::Pass)
        );
        assert_eq!(
            controller.decide(&proceed(GateVerdict::ConditionalPass)),
            Decision::AwaitConfirmation(GateVerdict::ConditionalPass)
        );
    }

    #[test]
    fn test_max_cycles_terminates_unconditionally() {
        let mut controller = IterationController::new(DEFAULT_MAX_CYCLES);
        controller.advance();
        controller.advance();
        assert_eq!(controller.cycle(), 3);

        // Terminates even on a passing verdict and even with a blocker.
        assert_eq!(
            controller.decide(&proceed(GateVerdict::Pass)),
            Decision::Terminate(TerminationReason::MaxCyclesReached)
        );
        assert_eq!(
            controller.decide(&loop_back()),
            Decision::Terminate(TerminationReason::MaxCyclesReached)
        );
    }

    #[test]
    fn test_cycle_stays_in_bounds() {
        let mut controller = IterationController::new(DEFAULT_MAX_CYCLES);
        for _ in 0..2 {
            assert!(controller.cycle() >= 1);
            assert!(controller.cycle() <= DEFAULT_MAX_CYCLES);
            assert_eq!(controller.decide(&loop_back()), Decision::LoopBack);
            controller.advance();
        }
        assert_eq!(controller.cycle(), DEFAULT_MAX_CYCLES);
    }

    #[test]
    fn test_feedback_history_accumulates() {
        let mut controller = IterationController::new(DEFAULT_MAX_CYCLES);
        controller.record_feedback(ConsolidatedFeedback::new(1));
        controller.advance();
        controller.record_feedback(ConsolidatedFeedback::new(2));

        assert_eq!(controller.state().feedback_history.len(), 2);
        assert_eq!(controller.latest_feedback().unwrap().cycle, 2);
    }
}
