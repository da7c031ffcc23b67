pub mod gate_phase;
pub mod http_collaborator;
pub mod implement_phase;
pub mod report_parser;
pub mod review_phase;
pub mod workflow_context;

pub use gate_phase::GatePhase;
pub use http_collaborator::HttpCollaborator;
pub use implement_phase::ImplementPhase;
pub use report_parser::ReportParser;
pub use review_phase::ReviewPhase;
pub use workflow_context::{WorkflowConfig, WorkflowContext};
