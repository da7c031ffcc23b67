use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use events::{Event, EventBus};
use orchestrator::{
    CollaboratorRegistry, ConfirmationPrompt, Implementer, OrchestratorError, Result, Reviewer,
    TerminationReason, WorkflowConfig, WorkflowContext, WorkflowRunner,
};
use revloop_core::{Artifact, Domain, FocusProfile, GateVerdict, IssueCategory, Report};

/// Implementer that applies a new revision each cycle and records the
/// focus profile it was handed, so tests can assert on blocker carryover.
struct ScriptedImplementer {
    id: String,
    focuses: Mutex<Vec<FocusProfile>>,
}

impl ScriptedImplementer {
    fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            focuses: Mutex::new(Vec::new()),
        })
    }

    fn focuses(&self) -> Vec<FocusProfile> {
        self.focuses.lock().unwrap().clone()
    }
}

#[async_trait]
impl Implementer for ScriptedImplementer {
    fn id(&self) -> &str {
        &self.id
    }

    async fn implement(&self, artifact: &mut Artifact, focus: &FocusProfile) -> Result<Report> {
        self.focuses.lock().unwrap().push(focus.clone());
        artifact.apply_revision(format!("revision {}", artifact.revision + 1));
        Ok(Report::new(&self.id).with_approved("change applied"))
    }
}

/// Reviewer that pops one scripted report per invocation; once the script
/// runs out it returns clean reports.
struct ScriptedReviewer {
    id: String,
    reports: Mutex<VecDeque<Report>>,
}

impl ScriptedReviewer {
    fn new(id: &str, reports: Vec<Report>) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            reports: Mutex::new(reports.into()),
        })
    }

    fn clean(id: &str) -> Arc<Self> {
        Self::new(id, Vec::new())
    }
}

#[async_trait]
impl Reviewer for ScriptedReviewer {
    fn id(&self) -> &str {
        &self.id
    }

    async fn review(&self, _artifact: &Artifact, _focus: &FocusProfile) -> Result<Report> {
        let next = self.reports.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| Report::new(&self.id).with_approved("no concerns")))
    }
}

struct FailingReviewer {
    id: String,
}

impl FailingReviewer {
    fn new(id: &str) -> Arc<Self> {
        Arc::new(Self { id: id.to_string() })
    }
}

#[async_trait]
impl Reviewer for FailingReviewer {
    fn id(&self) -> &str {
        &self.id
    }

    async fn review(&self, _artifact: &Artifact, _focus: &FocusProfile) -> Result<Report> {
        Err(OrchestratorError::collaborator_failed(
            &self.id,
            "connection refused",
        ))
    }
}

/// Reviewer that never answers within any reasonable timeout.
struct StalledReviewer {
    id: String,
}

impl StalledReviewer {
    fn new(id: &str) -> Arc<Self> {
        Arc::new(Self { id: id.to_string() })
    }
}

#[async_trait]
impl Reviewer for StalledReviewer {
    fn id(&self) -> &str {
        &self.id
    }

    async fn review(&self, _artifact: &Artifact, _focus: &FocusProfile) -> Result<Report> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Report::new(&self.id))
    }
}

/// Confirmation prompt with scripted answers; counts how often it was
/// actually asked. Runs out of script → decline.
struct ScriptedPrompt {
    answers: Mutex<VecDeque<bool>>,
    asked: AtomicUsize,
}

impl ScriptedPrompt {
    fn new(answers: Vec<bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            asked: AtomicUsize::new(0),
        }
    }

    fn times_asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfirmationPrompt for ScriptedPrompt {
    async fn confirm_continue(&self, _cycle: u32, _verdict: GateVerdict) -> Result<bool> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        Ok(self.answers.lock().unwrap().pop_front().unwrap_or(false))
    }
}

fn gate_always(verdict: GateVerdict) -> Arc<ScriptedReviewer> {
    // An empty script would fall back to a verdict-less clean report, so
    // scripted gates carry enough reports for every cycle.
    ScriptedReviewer::new(
        "test-enforcement",
        (0..5)
            .map(|_| Report::new("test-enforcement").with_verdict(verdict))
            .collect(),
    )
}

fn context(
    domain: Domain,
    implementer: Arc<ScriptedImplementer>,
    reviewers: Vec<Arc<dyn Reviewer>>,
    gate: Arc<dyn Reviewer>,
    max_cycles: u32,
) -> (WorkflowContext, EventBus) {
    let mut registry = CollaboratorRegistry::new(implementer, gate);
    for reviewer in reviewers {
        registry = registry.with_reviewer(reviewer);
    }

    let bus = EventBus::new();
    let ctx = WorkflowContext::new(
        WorkflowConfig::new(domain)
            .with_max_cycles(max_cycles)
            .with_review_timeout(Duration::from_secs(5)),
        registry,
    )
    .with_event_bus(bus.clone());

    (ctx, bus)
}

fn drain_events(rx: &mut tokio::sync::broadcast::Receiver<events::EventEnvelope>) -> Vec<Event> {
    let mut collected = Vec::new();
    while let Ok(envelope) = rx.try_recv() {
        collected.push(envelope.event);
    }
    collected
}

fn confirmation_request_cycles(trace: &[Event]) -> Vec<u32> {
    trace
        .iter()
        .filter_map(|event| match event {
            Event::ConfirmationRequested { cycle, .. } => Some(*cycle),
            _ => None,
        })
        .collect()
}

fn started_cycles(trace: &[Event]) -> Vec<u32> {
    trace
        .iter()
        .filter_map(|event| match event {
            Event::CycleStarted { cycle, .. } => Some(*cycle),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_scenario_backend_blocker_forces_auto_loop() {
    let implementer = ScriptedImplementer::new("backend-implementer");
    let security = ScriptedReviewer::new(
        "security-review",
        vec![Report::new("security-review").with_blocker("auth bypass on the admin route")],
    );
    let (ctx, bus) = context(
        Domain::Backend,
        Arc::clone(&implementer),
        vec![
            ScriptedReviewer::clean("design-review") as Arc<dyn Reviewer>,
            security,
            ScriptedReviewer::clean("database-review"),
        ],
        gate_always(GateVerdict::Pass),
        3,
    );
    let mut rx = bus.subscribe();

    // Cycle 1 hits the blocker and must loop automatically; cycle 2 is
    // clean and the user declines to continue.
    let prompt = ScriptedPrompt::new(vec![false]);
    let summary = WorkflowRunner::new(ctx)
        .run("fix: resolve N+1 query in user profile endpoint", &prompt)
        .await
        .unwrap();

    assert_eq!(summary.cycles_run, 2);
    assert_eq!(summary.reason, TerminationReason::ContinuationDeclined);

    // The blocker text was injected into the second cycle's focus profile.
    let focuses = implementer.focuses();
    assert_eq!(focuses.len(), 2);
    assert!(!focuses[0].has_carryover());
    assert!(focuses[1]
        .carryover
        .iter()
        .any(|item| item.detail.contains("auth bypass")));
    assert_eq!(focuses[1].carryover[0].collaborator_id, "security-review");

    // No confirmation was requested for the blocked cycle.
    let trace = drain_events(&mut rx);
    assert_eq!(confirmation_request_cycles(&trace), vec![2]);
}

#[tokio::test]
async fn test_scenario_frontend_decline_keeps_caveats_unresolved() {
    let implementer = ScriptedImplementer::new("frontend-implementer");
    let gate = ScriptedReviewer::new(
        "test-enforcement",
        vec![Report::new("test-enforcement")
            .with_verdict(GateVerdict::ConditionalPass)
            .with_issue(
                IssueCategory::Testing,
                "validation composable lacks tests for empty input",
            )],
    );
    let (ctx, _bus) = context(
        Domain::Frontend,
        implementer,
        vec![
            ScriptedReviewer::clean("design-review") as Arc<dyn Reviewer>,
            ScriptedReviewer::clean("accessibility-review"),
        ],
        gate,
        3,
    );

    let prompt = ScriptedPrompt::new(vec![false]);
    let summary = WorkflowRunner::new(ctx)
        .run("refactor: extract form validation to composable", &prompt)
        .await
        .unwrap();

    assert_eq!(summary.cycles_run, 1);
    assert_eq!(summary.reason, TerminationReason::ContinuationDeclined);
    assert_eq!(summary.final_verdict, Some(GateVerdict::ConditionalPass));
    assert_eq!(prompt.times_asked(), 1);

    // The CONDITIONAL_PASS caveat is reported, labeled non-blocking.
    assert!(!summary.has_unresolved_blockers());
    assert!(summary
        .unresolved
        .iter()
        .any(|u| !u.blocking && u.item.detail.contains("empty input")));
}

#[tokio::test]
async fn test_scenario_persistent_blocker_exhausts_cycles() {
    let implementer = ScriptedImplementer::new("backend-implementer");
    let security = ScriptedReviewer::new(
        "security-review",
        (0..5)
            .map(|_| Report::new("security-review").with_blocker("secrets committed to the repo"))
            .collect(),
    );
    let (ctx, bus) = context(
        Domain::Backend,
        implementer,
        vec![
            ScriptedReviewer::clean("design-review") as Arc<dyn Reviewer>,
            security,
            ScriptedReviewer::clean("database-review"),
        ],
        gate_always(GateVerdict::Pass),
        3,
    );
    let mut rx = bus.subscribe();

    let prompt = ScriptedPrompt::new(vec![true, true, true]);
    let summary = WorkflowRunner::new(ctx)
        .run("fix: rotate credentials", &prompt)
        .await
        .unwrap();

    // Terminates at cycle 3, not 4, with the blocker documented.
    assert_eq!(summary.cycles_run, 3);
    assert_eq!(summary.reason, TerminationReason::MaxCyclesReached);
    assert!(summary.has_unresolved_blockers());
    assert!(summary
        .unresolved
        .iter()
        .any(|u| u.blocking && u.item.detail.contains("secrets committed")));

    // The user was never consulted.
    assert_eq!(prompt.times_asked(), 0);
    let trace = drain_events(&mut rx);
    assert!(confirmation_request_cycles(&trace).is_empty());
    assert_eq!(started_cycles(&trace), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_barrier_collects_report_from_every_reviewer() {
    let implementer = ScriptedImplementer::new("backend-implementer");
    let (ctx, bus) = context(
        Domain::Backend,
        implementer,
        vec![
            ScriptedReviewer::clean("design-review") as Arc<dyn Reviewer>,
            FailingReviewer::new("security-review"),
            ScriptedReviewer::clean("database-review"),
        ],
        gate_always(GateVerdict::Pass),
        1,
    );
    let mut rx = bus.subscribe();

    let prompt = ScriptedPrompt::new(vec![]);
    let summary = WorkflowRunner::new(ctx)
        .run("feat: add audit log", &prompt)
        .await
        .unwrap();

    let trace = drain_events(&mut rx);
    let phase2_reports: Vec<_> = trace
        .iter()
        .filter_map(|event| match event {
            Event::CollaboratorCompleted {
                collaborator_id,
                degraded,
                ..
            } if collaborator_id != "backend-implementer"
                && collaborator_id != "test-enforcement" =>
            {
                Some((collaborator_id.clone(), *degraded))
            }
            _ => None,
        })
        .collect();

    // Exactly N = 3 reports, the failed sibling degraded, the others not.
    assert_eq!(phase2_reports.len(), 3);
    assert_eq!(
        phase2_reports.iter().filter(|(_, degraded)| *degraded).count(),
        1
    );

    // The failure surfaced as that collaborator's blocker.
    assert!(summary
        .unresolved
        .iter()
        .any(|u| u.blocking
            && u.item.collaborator_id == "security-review"
            && u.item.detail.contains("connection refused")));
}

#[tokio::test(start_paused = true)]
async fn test_stalled_reviewer_degrades_to_blocker() {
    let implementer = ScriptedImplementer::new("frontend-implementer");
    let (ctx, _bus) = context(
        Domain::Frontend,
        implementer,
        vec![
            ScriptedReviewer::clean("design-review") as Arc<dyn Reviewer>,
            StalledReviewer::new("accessibility-review"),
        ],
        gate_always(GateVerdict::Pass),
        1,
    );

    let prompt = ScriptedPrompt::new(vec![]);
    let summary = WorkflowRunner::new(ctx)
        .run("feat: add keyboard navigation", &prompt)
        .await
        .unwrap();

    assert!(summary
        .unresolved
        .iter()
        .any(|u| u.blocking
            && u.item.collaborator_id == "accessibility-review"
            && u.item.detail.contains("timed out")));
}

#[tokio::test]
async fn test_max_cycles_terminates_despite_affirmative_answers() {
    let implementer = ScriptedImplementer::new("backend-implementer");
    let (ctx, bus) = context(
        Domain::Backend,
        implementer,
        vec![
            ScriptedReviewer::clean("design-review") as Arc<dyn Reviewer>,
            ScriptedReviewer::clean("security-review"),
            ScriptedReviewer::clean("database-review"),
        ],
        gate_always(GateVerdict::Pass),
        3,
    );
    let mut rx = bus.subscribe();

    // The user would keep going forever; the cycle budget says otherwise.
    let prompt = ScriptedPrompt::new(vec![true, true, true, true]);
    let summary = WorkflowRunner::new(ctx)
        .run("feat: add pagination", &prompt)
        .await
        .unwrap();

    assert_eq!(summary.cycles_run, 3);
    assert_eq!(summary.reason, TerminationReason::MaxCyclesReached);

    // Confirmations happened after cycles 1 and 2 only; cycle 3 terminated
    // without asking.
    assert_eq!(prompt.times_asked(), 2);
    let trace = drain_events(&mut rx);
    assert_eq!(confirmation_request_cycles(&trace), vec![1, 2]);

    let cycles = started_cycles(&trace);
    assert!(cycles.iter().all(|&cycle| (1..=3).contains(&cycle)));
}

#[tokio::test]
async fn test_empty_task_is_rejected() {
    let implementer = ScriptedImplementer::new("backend-implementer");
    let (ctx, _bus) = context(
        Domain::Backend,
        implementer,
        vec![ScriptedReviewer::clean("design-review") as Arc<dyn Reviewer>],
        gate_always(GateVerdict::Pass),
        3,
    );

    let prompt = ScriptedPrompt::new(vec![]);
    let result = WorkflowRunner::new(ctx).run("fix:   ", &prompt).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_gate_fail_loops_without_confirmation() {
    let implementer = ScriptedImplementer::new("backend-implementer");
    let gate = ScriptedReviewer::new(
        "test-enforcement",
        vec![
            Report::new("test-enforcement")
                .with_verdict(GateVerdict::Fail)
                .with_blocker("test suite does not compile"),
            Report::new("test-enforcement").with_verdict(GateVerdict::Pass),
        ],
    );
    let (ctx, bus) = context(
        Domain::Backend,
        implementer,
        vec![
            ScriptedReviewer::clean("design-review") as Arc<dyn Reviewer>,
            ScriptedReviewer::clean("security-review"),
            ScriptedReviewer::clean("database-review"),
        ],
        gate,
        3,
    );
    let mut rx = bus.subscribe();

    let prompt = ScriptedPrompt::new(vec![false]);
    let summary = WorkflowRunner::new(ctx)
        .run("fix: flaky integration suite", &prompt)
        .await
        .unwrap();

    // FAIL at cycle 1 → automatic cycle 2, confirmation only after the
    // passing cycle.
    assert_eq!(summary.cycles_run, 2);
    let trace = drain_events(&mut rx);
    assert_eq!(confirmation_request_cycles(&trace), vec![2]);
    assert_eq!(started_cycles(&trace), vec![1, 2]);
}
