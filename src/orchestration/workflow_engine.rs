use crate::config::{WorkflowDefinition, WorkflowStep};
use crate::log_fields;
use crate::orchestration::context::{assemble_context, gather_tool_results};
use crate::orchestration::error::OrchestratorError;
use crate::orchestration::review_gate::{ReviewDecision, ReviewGate};
use crate::orchestration::state_store::{ProjectState, StateStore};
use crate::orchestration::step_id::StepId;
use crate::provider::AgentInvoker;
use crate::shared::logging::EventLog;
use crate::tool_client::ToolInvoker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    /// A reviewer rejected the step at `step` in phase `phase`; nothing after it ran.
    Aborted { phase: String, step: usize },
}

/// Sequential walk over phases and steps. Owns the state store for the duration
/// of the run; collaborators only ever see read-only views of the state.
pub struct Orchestrator {
    workflow: WorkflowDefinition,
    store: StateStore,
    agents: Box<dyn AgentInvoker>,
    tools: Option<Box<dyn ToolInvoker>>,
    review: Box<dyn ReviewGate>,
    log: EventLog,
}

impl Orchestrator {
    pub fn new(
        workflow: WorkflowDefinition,
        store: StateStore,
        agents: Box<dyn AgentInvoker>,
        review: Box<dyn ReviewGate>,
    ) -> Self {
        Self {
            workflow,
            store,
            agents,
            tools: None,
            review,
            log: EventLog::disabled(),
        }
    }

    pub fn with_tools(mut self, tools: Box<dyn ToolInvoker>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_log(mut self, log: EventLog) -> Self {
        self.log = log;
        self
    }

    pub fn state(&self) -> &ProjectState {
        self.store.state()
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn into_state(self) -> ProjectState {
        self.store.into_state()
    }

    /// Fresh and resumed runs share this path; completed steps are skipped.
    /// Agent and deliverable failures abort the run with the checkpoint holding
    /// only steps finished before the failure.
    pub fn run(&mut self) -> Result<RunOutcome, OrchestratorError> {
        let workflow = std::mem::take(&mut self.workflow);
        let outcome = self.walk(&workflow);
        self.workflow = workflow;
        outcome
    }

    fn walk(&mut self, workflow: &WorkflowDefinition) -> Result<RunOutcome, OrchestratorError> {
        let project = self.state().project_name().unwrap_or_default().to_string();
        self.log.info(
            "run.start",
            format!("Initiating project: {project}"),
            log_fields!(
                "project" => project.as_str(),
                "phases" => workflow.phases.len(),
                "steps" => workflow.step_count()
            ),
        );

        for (phase_index, phase) in workflow.phases.iter().enumerate() {
            self.log.info(
                "phase.start",
                format!("Starting Phase: {}", phase.name),
                log_fields!("phase" => phase.name.as_str(), "phase_index" => phase_index),
            );
            for (step_index, step) in phase.steps.iter().enumerate() {
                let step_id = StepId::for_step(phase_index, step_index, step);
                if self.state().is_completed(&step_id) {
                    self.log.info(
                        "step.skip",
                        format!("Skipping completed step {step_id}"),
                        log_fields!("step" => step_id.token()),
                    );
                    continue;
                }
                if step.is_human_review() {
                    if self.review_step(step, &step_id)? == ReviewDecision::Rejected {
                        return Ok(RunOutcome::Aborted {
                            phase: phase.name.clone(),
                            step: step_index,
                        });
                    }
                    continue;
                }
                self.delegate_step(step, &step_id)?;
            }
        }

        self.log.info(
            "run.completed",
            format!(
                "Project '{project}' completed successfully; deliverables are in {}",
                self.store.deliverables().dir().display()
            ),
            log_fields!("project" => project.as_str()),
        );
        Ok(RunOutcome::Completed)
    }

    /// Review outcomes are recorded in history but never checkpointed, so a
    /// resumed run asks again.
    fn review_step(
        &mut self,
        step: &WorkflowStep,
        step_id: &StepId,
    ) -> Result<ReviewDecision, OrchestratorError> {
        self.log.info(
            "review.pause",
            "PAUSING for Human Review",
            log_fields!("step" => step_id.token()),
        );
        let decision = self.review.request_approval(step.review_prompt())?;
        self.store.record_review(&step.agent, &step.task, decision);
        match decision {
            ReviewDecision::Approved => self.log.info(
                "review.approved",
                "Approval received. Resuming workflow.",
                log_fields!("step" => step_id.token()),
            ),
            ReviewDecision::Rejected => self.log.warn(
                "review.rejected",
                "Project aborted by reviewer.",
                log_fields!("step" => step_id.token()),
            ),
        }
        Ok(decision)
    }

    fn delegate_step(&mut self, step: &WorkflowStep, step_id: &StepId) -> Result<(), OrchestratorError> {
        self.log.info(
            "step.delegate",
            format!("Delegating task to '{}': {}", step.agent, step.task),
            log_fields!("step" => step_id.token(), "agent" => step.agent.as_str()),
        );
        let context = assemble_context(self.store.state(), step);
        let tool_results = gather_tool_results(self.tools.as_deref(), &step.mcp_tools, &self.log);
        let result = self
            .agents
            .invoke(&step.agent, &context, &tool_results)
            .map_err(|source| OrchestratorError::Agent {
                agent: step.agent.clone(),
                source,
            })?;
        self.store
            .record_step_result(&step.agent, &step.task, step.output_key(), &result)?;
        self.store.mark_completed(step_id);
        Ok(())
    }
}
