use revloop_core::{ConsolidatedFeedback, FocusKind, FocusProfile, TaskDescriptor, TaskPrefix};
use tracing::{debug, warn};

pub struct TaskDispatcher;

impl TaskDispatcher {
    /// Derive the focus profile for the next Phase 1 invocation.
    ///
    /// The prefix → focus mapping is a fixed lookup. On loop-back the
    /// previous cycle's blockers are carried over so the implementer and
    /// every reviewer see exactly which specialist raised which concern;
    /// feedback without blockers carries nothing.
    pub fn dispatch(
        descriptor: &TaskDescriptor,
        prior: Option<&ConsolidatedFeedback>,
    ) -> FocusProfile {
        if descriptor.prefix == TaskPrefix::None {
            warn!(
                description = %descriptor.description,
                "No recognized task prefix, using generic focus profile"
            );
        }

        let kind = FocusKind::from_prefix(descriptor.prefix);
        let emphasis = Self::emphasis_for(kind);

        let carryover = prior
            .map(|feedback| feedback.blockers.clone())
            .unwrap_or_default();

        if !carryover.is_empty() {
            debug!(
                blocker_count = carryover.len(),
                "Biasing focus profile toward recorded blockers"
            );
        }

        FocusProfile::new(kind, emphasis).with_carryover(carryover)
    }

    fn emphasis_for(kind: FocusKind) -> Vec<String> {
        let emphasis: &[&str] = match kind {
            FocusKind::Repair => &[
                "reproduce the defect before changing anything",
                "smallest viable change",
                "regression coverage for the failure mode",
            ],
            FocusKind::Feature => &[
                "requirements coverage",
                "interface design",
                "tests for every new behavior",
            ],
            FocusKind::Restructure => &[
                "behavior preservation",
                "seams and module boundaries",
                "test parity before and after",
            ],
            FocusKind::Generic => &["correctness", "clarity", "test coverage"],
        };
        emphasis.iter().map(|s| s.to_string()).collect()
    }
}
