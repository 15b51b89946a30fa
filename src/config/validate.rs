use super::{ConfigError, WorkflowDefinition, RESERVED_STATE_KEYS};
use crate::orchestration::step_id::STEP_ID_SEPARATOR;
use crate::provider::AgentRegistry;

/// Load-time checks so a bad workflow fails before any step runs.
pub fn validate_workflow(
    workflow: &WorkflowDefinition,
    registry: &AgentRegistry,
) -> Result<(), ConfigError> {
    for (phase_index, phase) in workflow.phases.iter().enumerate() {
        if phase.name.trim().is_empty() {
            return Err(ConfigError::Workflow(format!(
                "phase {phase_index} must have a non-empty `name`"
            )));
        }
        for (step_index, step) in phase.steps.iter().enumerate() {
            let position = format!("phase `{}` step {step_index}", phase.name);
            if step.agent.trim().is_empty() {
                return Err(ConfigError::Workflow(format!(
                    "{position} must name an `agent`"
                )));
            }
            if step.agent.contains(STEP_ID_SEPARATOR) {
                return Err(ConfigError::Workflow(format!(
                    "{position}: agent `{}` must not contain `{STEP_ID_SEPARATOR}`",
                    step.agent
                )));
            }
            if let Some(output) = step.output_key() {
                if RESERVED_STATE_KEYS.contains(&output) {
                    return Err(ConfigError::Workflow(format!(
                        "{position} writes reserved state key `{output}`"
                    )));
                }
                crate::shared::ids::validate_identifier_value("output key", output)
                    .map_err(|err| ConfigError::Workflow(format!("{position}: {err}")))?;
                if output.contains(STEP_ID_SEPARATOR) {
                    return Err(ConfigError::Workflow(format!(
                        "{position}: output key `{output}` must not contain `{STEP_ID_SEPARATOR}`"
                    )));
                }
            }
            for tool in &step.mcp_tools {
                if tool.name.trim().is_empty() {
                    return Err(ConfigError::Workflow(format!(
                        "{position} declares a tool call without `name`"
                    )));
                }
            }
        }
    }

    let unknown = workflow
        .delegated_agents()
        .into_iter()
        .filter(|agent| !registry.contains(agent))
        .map(str::to_string)
        .collect::<Vec<_>>();
    if !unknown.is_empty() {
        return Err(ConfigError::UnknownAgents { agents: unknown });
    }
    Ok(())
}
