use events::Event;
use revloop_core::{Artifact, TaskDescriptor, WorkflowState};
use tracing::info;
use uuid::Uuid;

use crate::dispatcher::TaskDispatcher;
use crate::error::Result;
use crate::gate::GateEvaluator;
use crate::iteration::{ConfirmationPrompt, Decision, IterationController, TerminationReason};
use crate::services::{GatePhase, ImplementPhase, ReviewPhase, WorkflowContext};
use crate::summary::WorkflowSummary;

/// Drives one workflow run through the cycle loop:
/// implementation → concurrent review barrier → gate check → decision.
pub struct WorkflowRunner {
    ctx: WorkflowContext,
}

impl WorkflowRunner {
    pub fn new(ctx: WorkflowContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &WorkflowContext {
        &self.ctx
    }

    pub async fn run(
        &self,
        input: &str,
        prompt: &dyn ConfirmationPrompt,
    ) -> Result<WorkflowSummary> {
        let descriptor = TaskDescriptor::parse(input);
        self.run_task(&descriptor, prompt).await
    }

    pub async fn run_task(
        &self,
        descriptor: &TaskDescriptor,
        prompt: &dyn ConfirmationPrompt,
    ) -> Result<WorkflowSummary> {
        descriptor.validate()?;

        let workflow_id = Uuid::new_v4();
        let mut state = WorkflowState::Init;
        let mut artifact = Artifact::new(&descriptor.description);
        let mut controller = IterationController::new(self.ctx.config.max_cycles);

        info!(
            workflow_id = %workflow_id,
            domain = %self.ctx.config.domain.as_str(),
            prefix = %descriptor.prefix.as_str(),
            description = %descriptor.description,
            "Starting workflow run"
        );
        self.ctx.emit_event(Event::WorkflowStarted {
            workflow_id,
            domain: self.ctx.config.domain.as_str().to_string(),
            description: descriptor.description.clone(),
        });

        let (gate_report, final_verdict, reason) = loop {
            let cycle = controller.cycle();
            self.ctx.emit_event(Event::CycleStarted { workflow_id, cycle });

            self.ctx.transition(&mut state, WorkflowState::Phase1)?;
            let focus = TaskDispatcher::dispatch(descriptor, controller.latest_feedback());
            if let Err(e) =
                ImplementPhase::run(&self.ctx, workflow_id, cycle, &mut artifact, &focus).await
            {
                self.ctx.emit_event(Event::Error {
                    message: e.to_string(),
                    context: Some(WorkflowState::Phase1.as_str().to_string()),
                });
                return Err(e);
            }

            self.ctx.transition(&mut state, WorkflowState::Phase2)?;
            let feedback =
                ReviewPhase::run(&self.ctx, workflow_id, cycle, &artifact, &focus).await?;

            // The gate always runs, even when the feedback already carries
            // a blocker that guarantees the loop-back.
            self.ctx.transition(&mut state, WorkflowState::Phase3)?;
            let gate_report = GatePhase::run(&self.ctx, workflow_id, cycle, &artifact, &focus).await;

            self.ctx.transition(&mut state, WorkflowState::Decision)?;
            let gate_decision = GateEvaluator::evaluate(&gate_report, &feedback);
            controller.record_feedback(feedback);

            match controller.decide(&gate_decision) {
                Decision::LoopBack => {
                    controller.advance();
                }
                Decision::AwaitConfirmation(verdict) => {
                    self.ctx
                        .emit_event(Event::ConfirmationRequested { workflow_id, cycle });
                    let accepted = prompt.confirm_continue(cycle, verdict).await?;
                    self.ctx.emit_event(Event::ConfirmationAnswered {
                        workflow_id,
                        cycle,
                        accepted,
                    });

                    if !accepted {
                        break (
                            gate_report,
                            Some(verdict),
                            TerminationReason::ContinuationDeclined,
                        );
                    }
                    controller.advance();
                }
                Decision::Terminate(reason) => {
                    let verdict = gate_report.verdict;
                    break (gate_report, verdict, reason);
                }
            }
        };

        self.ctx.transition(&mut state, WorkflowState::Done)?;

        let summary = WorkflowSummary::build(
            workflow_id,
            self.ctx.config.domain,
            controller.state(),
            &gate_report,
            final_verdict,
            reason,
        );

        info!(
            workflow_id = %workflow_id,
            cycles_run = summary.cycles_run,
            reason = %reason.as_str(),
            unresolved_count = summary.unresolved.len(),
            "Workflow run terminated"
        );
        self.ctx.emit_event(Event::WorkflowCompleted {
            workflow_id,
            cycles_run: summary.cycles_run,
            outcome: reason.as_str().to_string(),
        });

        Ok(summary)
    }
}
