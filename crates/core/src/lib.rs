pub mod domain;
pub mod error;

pub use domain::artifact::Artifact;
pub use domain::feedback::{AttributedItem, ConsolidatedFeedback, CycleState};
pub use domain::report::{GateVerdict, IssueCategory, Report};
pub use domain::task::{FocusKind, FocusProfile, TaskDescriptor, TaskPrefix};
pub use domain::workflow::{Domain, PhaseMode, WorkflowState};
pub use error::CoreError;
