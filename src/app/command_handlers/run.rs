use crate::app::command_handlers::CommandError;
use crate::app::command_support::{flag_value, map_config_err, parse_flags};
use crate::config::{load_plan_bundle, PlanBundle, Settings, ToolMode, WorkflowDefinition};
use crate::log_fields;
use crate::orchestration::{
    CheckpointStore, DeliverableWriter, Orchestrator, ProjectState, ReviewGate, RunOutcome,
    StateStore, StepId, TerminalReviewGate,
};
use crate::provider::{AgentInvoker, ProviderAgentInvoker};
use crate::shared::logging::EventLog;
use crate::tool_client::{ClientInfo, ToolClient, ToolInvoker};
use std::path::{Path, PathBuf};

pub const ABORTED_MESSAGE: &str = "Project aborted by reviewer.";
const AGENT_WORK_DIR: &str = "agent_runs";

pub fn cmd_run(settings: &Settings, args: &[String]) -> Result<String, CommandError> {
    let flags = parse_flags(args, &["--plan"], &[])?;
    let plan_path = flag_value(&flags, "--plan")
        .map(PathBuf::from)
        .ok_or_else(|| CommandError::failure("usage: relaycrew run|resume --plan <path>"))?;

    let bundle = load_plan_bundle(settings, &plan_path).map_err(map_config_err)?;
    let work_dir = agent_work_dir(settings, &bundle.plan.project_name);
    let agents = ProviderAgentInvoker::from_settings(
        bundle.registry.clone(),
        &settings.provider,
        work_dir,
    );
    let log = EventLog::for_workspace(&settings.workspace_root).with_echo(true);
    execute_bundle(
        settings,
        bundle,
        Box::new(agents),
        Box::new(TerminalReviewGate::terminal()),
        log,
    )
}

pub fn agent_work_dir(settings: &Settings, project_name: &str) -> PathBuf {
    settings.state_root().join(AGENT_WORK_DIR).join(project_name)
}

/// Runs an already loaded plan with the given collaborators. Rejection at a review
/// gate is reported as a failure carrying [`ABORTED_MESSAGE`].
pub fn execute_bundle(
    settings: &Settings,
    bundle: PlanBundle,
    agents: Box<dyn AgentInvoker>,
    review: Box<dyn ReviewGate>,
    log: EventLog,
) -> Result<String, CommandError> {
    let project = bundle.plan.project_name.clone();
    let deliverables = DeliverableWriter::for_project(&settings.deliverables_root(), &project);
    let deliverables_dir = deliverables.dir().to_path_buf();
    let store = StateStore::open(
        &bundle.plan,
        CheckpointStore::for_project(&settings.state_root(), &project),
        deliverables,
        log.clone(),
    );
    let tools = connect_tools(settings, &bundle.workflow, store.state(), &log)?;

    let mut engine = Orchestrator::new(bundle.workflow, store, agents, review).with_log(log);
    if let Some(tools) = tools {
        engine = engine.with_tools(tools);
    }
    match engine.run() {
        Ok(RunOutcome::Completed) => Ok(format!(
            "Project '{project}' completed successfully!\nFinal deliverables are in: {}",
            deliverables_dir.display()
        )),
        Ok(RunOutcome::Aborted { .. }) => Err(CommandError::failure(ABORTED_MESSAGE)),
        Err(err) => Err(CommandError::failure(err.to_string())),
    }
}

pub fn execute_plan(
    settings: &Settings,
    plan_path: &Path,
    agents: Box<dyn AgentInvoker>,
    review: Box<dyn ReviewGate>,
    log: EventLog,
) -> Result<String, CommandError> {
    let bundle = load_plan_bundle(settings, plan_path).map_err(map_config_err)?;
    execute_bundle(settings, bundle, agents, review, log)
}

/// Steps that still need to run and declare at least one tool call.
fn has_pending_tool_steps(workflow: &WorkflowDefinition, state: &ProjectState) -> bool {
    workflow.phases.iter().enumerate().any(|(phase_index, phase)| {
        phase.steps.iter().enumerate().any(|(step_index, step)| {
            !step.mcp_tools.is_empty()
                && !state.is_completed(&StepId::for_step(phase_index, step_index, step))
        })
    })
}

/// Connects only when a pending step declares tools. An unconfigured endpoint is not
/// an error here. A real endpoint that fails `initialize` fails before the first step
/// runs; simulation mode replays fixtures without a handshake.
fn connect_tools(
    settings: &Settings,
    workflow: &WorkflowDefinition,
    state: &ProjectState,
    log: &EventLog,
) -> Result<Option<Box<dyn ToolInvoker>>, CommandError> {
    if !has_pending_tool_steps(workflow, state) {
        return Ok(None);
    }
    let Some(client) =
        ToolClient::from_settings(settings).map_err(|err| CommandError::failure(err.to_string()))?
    else {
        log.warn(
            "tool.error",
            "Tool endpoint not configured; tool calls will return inline errors",
            log_fields!(),
        );
        return Ok(None);
    };
    if client.mode() == ToolMode::Real {
        client
            .initialize(Some(ClientInfo::default()))
            .map_err(|err| CommandError::failure(err.to_string()))?;
    }
    Ok(Some(Box::new(client)))
}
