use revloop_core::{AttributedItem, ConsolidatedFeedback, GateVerdict, Report};
use tracing::warn;

/// Outcome of the gate check for one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// The cycle must repeat. `reasons` holds every blocker that forced the
    /// loop-back, attributed to its collaborator.
    LoopBack { reasons: Vec<AttributedItem> },
    /// No blockers and a passing verdict; the continuation question goes to
    /// the user.
    Proceed { verdict: GateVerdict },
}

pub struct GateEvaluator;

impl GateEvaluator {
    /// Convert the Phase 3 report into a gate decision.
    ///
    /// A Phase 2 blocker is an independent, higher-priority signal: it
    /// forces a loop-back regardless of the gate verdict. Only zero Phase 2
    /// blockers together with a PASS or CONDITIONAL_PASS verdict proceed. A
    /// gate report without a verdict violates the gate contract and is
    /// evaluated as FAIL.
    pub fn evaluate(gate_report: &Report, phase2: &ConsolidatedFeedback) -> GateDecision {
        let verdict = match gate_report.verdict {
            Some(verdict) => verdict,
            None => {
                warn!(
                    collaborator_id = %gate_report.collaborator_id,
                    "Gate report carries no verdict, evaluating as FAIL"
                );
                GateVerdict::Fail
            }
        };

        let mut reasons = phase2.blockers.clone();
        for blocker in &gate_report.blockers {
            reasons.push(AttributedItem::new(
                &gate_report.collaborator_id,
                None,
                blocker,
            ));
        }

        if phase2.has_blockers() || verdict == GateVerdict::Fail {
            GateDecision::LoopBack { reasons }
        } else {
            GateDecision::Proceed { verdict }
        }
    }
}
